//! Paper writing stage - synthesize and persist the final artifact

use crate::registry::Stage;
use crate::state_machine::StageName;
use aro_core::{PipelineError, ResearchState, StageUpdate, StateField, TextCompletion};
use std::path::PathBuf;
use std::sync::Arc;

fn paper_prompt(state: &ResearchState, methodology: &str, results: &str) -> String {
    format!(
        "You are a research assistant. Synthesize the following information into \
a well-structured research paper in Markdown format.\n\n\
**Topic:** {topic}\n\
**Hypothesis:** {hypothesis}\n\
**Methodology:** {methodology}\n\
**Results:** {results}\n\
**Analysis/Discussion:** {analysis}\n\n\
**Instructions:**\n\
Write a complete paper with the following sections:\n\
1.  **Abstract:** A brief summary of the work.\n\
2.  **Introduction:** Background on the topic and statement of the hypothesis.\n\
3.  **Methodology:** Describe the experiment based on the plan.\n\
4.  **Results:** Present the results.\n\
5.  **Discussion:** Interpret the results based on the analysis.\n\
6.  **Conclusion:** Summarize the findings and future work.\n\n\
The paper should be comprehensive and well-written.",
        topic = state.topic,
        hypothesis = state.hypothesis.as_deref().unwrap_or_default(),
        analysis = state.analysis.as_deref().unwrap_or_default(),
    )
}

/// Writes the final research paper and persists it
///
/// The paper is the run's single persisted artifact, written to a fixed,
/// well-known output location on successful completion.
pub struct WritePaperStage {
    completion: Arc<dyn TextCompletion>,
    output_path: PathBuf,
}

impl WritePaperStage {
    /// Create over a completion collaborator and an output path
    #[inline]
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            completion,
            output_path: output_path.into(),
        }
    }

    /// Path the paper is written to
    #[inline]
    #[must_use]
    pub fn output_path(&self) -> &PathBuf {
        &self.output_path
    }
}

#[async_trait::async_trait]
impl Stage for WritePaperStage {
    fn name(&self) -> StageName {
        StageName::WritePaper
    }

    fn required_fields(&self) -> &'static [StateField] {
        &[
            StateField::Hypothesis,
            StateField::ExperimentPlan,
            StateField::ExecutionResult,
            StateField::Analysis,
        ]
    }

    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError> {
        let methodology = state
            .experiment_plan
            .as_ref()
            .map(|p| p.methodology_text())
            .unwrap_or_default();
        let results = state
            .execution_result
            .as_ref()
            .map(|o| o.to_record().to_string())
            .unwrap_or_default();

        let paper = self
            .completion
            .complete(&paper_prompt(state, &methodology, &results))
            .await?;

        if let Some(parent) = self.output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.output_path, &paper)?;
        tracing::info!(path = %self.output_path.display(), "paper written");

        Ok(StageUpdate::new().with_paper(paper))
    }
}
