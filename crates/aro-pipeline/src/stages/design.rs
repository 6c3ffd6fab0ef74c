//! Experiment design stage - schema-validated plan decode

use crate::registry::Stage;
use crate::stages::extract_delimited;
use crate::state_machine::StageName;
use aro_core::{
    ExperimentPlan, PipelineError, ResearchState, StageUpdate, StateField, TextCompletion,
};
use std::sync::Arc;

/// Completion attempts before a plan decode failure aborts the run
pub const MAX_DECODE_ATTEMPTS: u32 = 2;

fn design_prompt(hypothesis: &str) -> String {
    format!(
        "You are a meticulous lab director. Design a detailed experiment to test \
the hypothesis: \"{hypothesis}\"\n\
Provide the plan in a valid JSON format with keys: \"datasets\", \"methodology\", \"metrics\".\n\
- \"datasets\": List of public dataset names.\n\
- \"methodology\": Step-by-step experimental procedure.\n\
- \"metrics\": List of specific, measurable metrics for evaluation.\n\n\
JSON Output:"
    )
}

/// Designs the experiment plan for the current hypothesis
///
/// The plan comes back as free text and goes through an explicit fallible
/// decode. A malformed response earns one bounded re-prompt; a second
/// failure aborts the run with a decode error.
pub struct DesignExperimentStage {
    completion: Arc<dyn TextCompletion>,
}

impl DesignExperimentStage {
    /// Create over a completion collaborator
    #[inline]
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }
}

#[async_trait::async_trait]
impl Stage for DesignExperimentStage {
    fn name(&self) -> StageName {
        StageName::DesignExperiment
    }

    fn required_fields(&self) -> &'static [StateField] {
        &[StateField::Hypothesis]
    }

    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError> {
        let hypothesis = state.hypothesis.as_deref().unwrap_or_default();
        let prompt = design_prompt(hypothesis);

        let mut last_error = String::new();
        for attempt in 1..=MAX_DECODE_ATTEMPTS {
            let response = self.completion.complete(&prompt).await?;
            match decode_plan(&response) {
                Ok(plan) => {
                    tracing::info!(
                        datasets = plan.datasets.len(),
                        metrics = plan.metrics.len(),
                        "experiment plan decoded"
                    );
                    return Ok(StageUpdate::new().with_experiment_plan(plan));
                }
                Err(message) => {
                    tracing::warn!(attempt, %message, "experiment plan decode failed");
                    last_error = message;
                }
            }
        }

        Err(PipelineError::GenerationParse {
            stage: StageName::DesignExperiment.to_string(),
            message: last_error,
        })
    }
}

fn decode_plan(response: &str) -> Result<ExperimentPlan, String> {
    let object = extract_delimited(response, '{', '}')
        .ok_or_else(|| "no JSON object in response".to_string())?;
    serde_json::from_str(object).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plan_accepts_wrapped_json() {
        let response = r#"Here is your experiment:
{"datasets": ["imdb"], "methodology": ["load", "train", "evaluate"], "metrics": ["accuracy"]}
"#;
        let plan = decode_plan(response).unwrap();
        assert_eq!(plan.datasets, vec!["imdb"]);
        assert_eq!(plan.metrics, vec!["accuracy"]);
    }

    #[test]
    fn decode_plan_requires_methodology() {
        let err = decode_plan(r#"{"datasets": [], "metrics": []}"#).unwrap_err();
        assert!(err.contains("methodology"));
    }

    #[test]
    fn decode_plan_rejects_prose() {
        assert!(decode_plan("I would rather not").is_err());
    }
}
