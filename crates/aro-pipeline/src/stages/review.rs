//! Review stage - accept or redesign

use crate::registry::Stage;
use crate::state_machine::StageName;
use aro_core::{Decision, PipelineError, ResearchState, StageUpdate, StateField, TextCompletion};
use std::sync::Arc;

fn review_prompt(hypothesis: &str, analysis: &str) -> String {
    format!(
        "You are a senior scientist reviewing a research experiment.\n\
**Hypothesis:** {hypothesis}\n\
**Analysis of Results:** {analysis}\n\n\
**Your Task:**\n\
Based on the analysis, are the results sufficient and clear enough to support \
or refute the hypothesis?\n\
Respond with only ONE of the following words: 'proceed' or 'redesign'."
    )
}

/// Reviews the analysis and produces the branch decision
///
/// The raw review text goes through the fail-closed classifier: anything
/// that is not an unambiguous "proceed" becomes a redesign.
pub struct ReviewStage {
    completion: Arc<dyn TextCompletion>,
}

impl ReviewStage {
    /// Create over a completion collaborator
    #[inline]
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }
}

#[async_trait::async_trait]
impl Stage for ReviewStage {
    fn name(&self) -> StageName {
        StageName::Review
    }

    fn required_fields(&self) -> &'static [StateField] {
        &[StateField::Hypothesis, StateField::Analysis]
    }

    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError> {
        let hypothesis = state.hypothesis.as_deref().unwrap_or_default();
        let analysis = state.analysis.as_deref().unwrap_or_default();

        let raw = self
            .completion
            .complete(&review_prompt(hypothesis, analysis))
            .await?;
        let decision = Decision::classify(&raw);
        tracing::info!(%decision, "review decision");
        Ok(StageUpdate::new().with_decision(decision))
    }
}
