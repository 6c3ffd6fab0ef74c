//! Pipeline stages
//!
//! One module per graph node. Every stage is a thin adapter: it renders a
//! prompt (or calls the sandbox), decodes the response, and returns a
//! partial update. All prompt content lives here, next to the stage that
//! owns it.

mod analyze;
mod design;
mod execute;
mod hypothesis;
mod knowledge;
mod paper;
mod retrieve;
mod retry;
mod review;
mod synthesize;

pub use analyze::{AnalyzeStage, FAILED_ANALYSIS};
pub use design::{DesignExperimentStage, MAX_DECODE_ATTEMPTS};
pub use execute::ExecuteSandboxStage;
pub use hypothesis::GenerateHypothesisStage;
pub use knowledge::UpdateKnowledgeStage;
pub use paper::WritePaperStage;
pub use retrieve::RetrieveStage;
pub use retry::IncrementRetryStage;
pub use review::ReviewStage;
pub use synthesize::{SynthesizeCodeStage, DOCKERFILE};

/// Extract the outermost delimited region of a string
///
/// Model output routinely wraps JSON in prose or markdown fences; this
/// slices from the first `open` to the last `close`, inclusive.
pub(crate) fn extract_delimited(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Strip markdown code fences from generated source
pub(crate) fn strip_code_fences(text: &str) -> String {
    text.replace("```python", "")
        .replace("```", "")
        .trim()
        .to_string()
}
