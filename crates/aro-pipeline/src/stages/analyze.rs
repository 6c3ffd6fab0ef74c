//! Analysis stage - summarize experiment results

use crate::registry::Stage;
use crate::state_machine::StageName;
use aro_core::{PipelineError, ResearchState, StageUpdate, StateField, TextCompletion};
use std::sync::Arc;

/// Fixed analysis emitted when the experiment did not produce results
pub const FAILED_ANALYSIS: &str = "experiment failed to run, cannot analyze";

fn analysis_prompt(results: &str) -> String {
    format!(
        "You are a data analyst. Analyze the following experiment results and \
provide a brief, one-paragraph summary of their implications.\n\n\
**Experiment Results:**\n{results}\n\n\
**Analysis Summary:**"
    )
}

/// Analyzes the sandbox results
///
/// When the sandbox reported a failure the stage degrades to a fixed
/// message without invoking the completion collaborator at all.
pub struct AnalyzeStage {
    completion: Arc<dyn TextCompletion>,
}

impl AnalyzeStage {
    /// Create over a completion collaborator
    #[inline]
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }
}

#[async_trait::async_trait]
impl Stage for AnalyzeStage {
    fn name(&self) -> StageName {
        StageName::Analyze
    }

    fn required_fields(&self) -> &'static [StateField] {
        &[StateField::ExecutionResult]
    }

    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError> {
        let outcome = state.execution_result.as_ref().ok_or_else(|| {
            PipelineError::MissingInput {
                stage: self.name().to_string(),
                field: StateField::ExecutionResult.to_string(),
            }
        })?;

        if outcome.is_failure() {
            tracing::warn!("experiment failed, analysis degraded");
            return Ok(StageUpdate::new().with_analysis(FAILED_ANALYSIS));
        }

        let results = serde_json::to_string_pretty(&outcome.to_record())
            .unwrap_or_else(|_| outcome.to_record().to_string());
        let analysis = self.completion.complete(&analysis_prompt(&results)).await?;
        tracing::info!("analysis complete");
        Ok(StageUpdate::new().with_analysis(analysis))
    }
}
