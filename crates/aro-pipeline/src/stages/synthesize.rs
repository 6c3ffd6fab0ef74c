//! Code synthesis stage - generate experiment source and build descriptor

use crate::registry::Stage;
use crate::stages::strip_code_fences;
use crate::state_machine::StageName;
use aro_core::{PipelineError, ResearchState, StageUpdate, StateField, TextCompletion};
use std::sync::Arc;

/// Build descriptor the sandbox builds every experiment image from
pub const DOCKERFILE: &str = "\
FROM python:3.9-slim
WORKDIR /app
RUN pip install pandas scikit-learn numpy
COPY experiment.py .
CMD [\"python\", \"experiment.py\"]
";

fn synthesis_prompt(plan_text: &str) -> String {
    format!(
        "You are an expert Python programmer. Based on the following experiment \
plan, write a single, complete Python script to execute the experiment.\n\n\
**Experiment Plan:**\n{plan_text}\n\n\
**Instructions for the Python Script:**\n\
1. The script must be self-contained and import necessary libraries (e.g., pandas, scikit-learn, numpy).\n\
2. Implement the methodology. Use mock data if no public dataset is easily available.\n\
3. Calculate all metrics listed in the plan.\n\
4. Save all results into a dictionary, then save this dictionary to a JSON file named exactly 'results.json'.\n\
Example JSON output: {{\"accuracy\": 0.95, \"precision\": 0.92}}\n\n\
**Python Script:**"
    )
}

/// Generates the experiment source and the fixed build descriptor
pub struct SynthesizeCodeStage {
    completion: Arc<dyn TextCompletion>,
}

impl SynthesizeCodeStage {
    /// Create over a completion collaborator
    #[inline]
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }
}

#[async_trait::async_trait]
impl Stage for SynthesizeCodeStage {
    fn name(&self) -> StageName {
        StageName::SynthesizeCode
    }

    fn required_fields(&self) -> &'static [StateField] {
        &[StateField::ExperimentPlan]
    }

    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError> {
        let plan = state.experiment_plan.as_ref().ok_or_else(|| {
            PipelineError::MissingInput {
                stage: self.name().to_string(),
                field: StateField::ExperimentPlan.to_string(),
            }
        })?;
        let plan_text =
            serde_json::to_string_pretty(plan).unwrap_or_else(|_| plan.methodology_text());

        let response = self.completion.complete(&synthesis_prompt(&plan_text)).await?;
        let source = strip_code_fences(&response);
        tracing::info!(bytes = source.len(), "experiment source generated");

        Ok(StageUpdate::new()
            .with_generated_source(source)
            .with_build_descriptor(DOCKERFILE))
    }
}
