//! Hypothesis generation stage

use crate::registry::Stage;
use crate::state_machine::StageName;
use aro_core::{PipelineError, ResearchState, StageUpdate, TextCompletion};
use std::sync::Arc;

fn hypothesis_prompt(context: &str) -> String {
    format!(
        "You are a senior research scientist. Based on the following research \
context, identify a knowledge gap and formulate a single, clear, testable \
scientific hypothesis.\n\n\
**Research Context:**\n{context}\n\n\
**Your Output:**\nProvide only the formulated hypothesis as a single sentence.\n\
Hypothesis:"
    )
}

/// Formulates a testable hypothesis from the retrieved documents
pub struct GenerateHypothesisStage {
    completion: Arc<dyn TextCompletion>,
}

impl GenerateHypothesisStage {
    /// Create over a completion collaborator
    #[inline]
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }
}

#[async_trait::async_trait]
impl Stage for GenerateHypothesisStage {
    fn name(&self) -> StageName {
        StageName::GenerateHypothesis
    }

    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError> {
        let context = state.documents.join("\n\n---\n\n");
        let hypothesis = self.completion.complete(&hypothesis_prompt(&context)).await?;
        tracing::info!(%hypothesis, "hypothesis generated");
        Ok(StageUpdate::new().with_hypothesis(hypothesis))
    }
}
