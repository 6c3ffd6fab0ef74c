//! Pipeline orchestrator
//!
//! Owns the stage graph and the shared state. Drives execution from
//! `retrieve` to the terminal stage, invoking one stage at a time, merging
//! each partial update, and evaluating the single conditional edge at
//! `review`. Stages never receive a mutable reference; the merge here is
//! the only mutation path.

use crate::registry::{Stage, StageRegistry};
use crate::stages::{
    AnalyzeStage, DesignExperimentStage, ExecuteSandboxStage, GenerateHypothesisStage,
    IncrementRetryStage, RetrieveStage, ReviewStage, SynthesizeCodeStage, UpdateKnowledgeStage,
    WritePaperStage,
};
use crate::state_machine::{next_stage, StageName};
use aro_core::{
    DocumentSearch, PipelineError, RelationStore, ResearchState, RunId, StageUpdate,
    TextCompletion,
};
use aro_sandbox::SandboxExecutor;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Boundary collaborators the standard stages consume
#[derive(Clone)]
pub struct Collaborators {
    /// Semantic document search
    pub search: Arc<dyn DocumentSearch>,
    /// Hosted text completion
    pub completion: Arc<dyn TextCompletion>,
    /// Optional best-effort relation store
    pub relations: Option<Arc<dyn RelationStore>>,
}

/// One completed stage and the update it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageEvent {
    /// Stage that completed
    pub stage: StageName,
    /// Partial update it returned
    pub update: StageUpdate,
}

/// How a run terminated
///
/// Both variants are successful terminations of the orchestrator,
/// distinguished only by state content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// A paper was produced
    PaperCompleted,
    /// The retry ceiling was reached while still redesigning; no paper
    RetriesExhausted,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PaperCompleted => write!(f, "paper completed"),
            Self::RetriesExhausted => write!(f, "maximum iterations reached"),
        }
    }
}

/// Final report of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier
    pub run_id: RunId,
    /// Terminal outcome
    pub outcome: RunOutcome,
    /// Final accumulated state
    pub state: ResearchState,
    /// Ordered stage events
    pub events: Vec<StageEvent>,
}

impl RunReport {
    /// The produced paper, when the run completed one
    #[inline]
    #[must_use]
    pub fn paper(&self) -> Option<&str> {
        self.state.paper.as_deref()
    }
}

/// The research pipeline
pub struct ResearchPipeline {
    registry: StageRegistry,
}

impl ResearchPipeline {
    /// Build a pipeline from a custom registry
    #[inline]
    #[must_use]
    pub fn new(registry: StageRegistry) -> Self {
        Self { registry }
    }

    /// Build the standard pipeline over the given collaborators
    #[must_use]
    pub fn standard(
        collaborators: Collaborators,
        executor: Arc<SandboxExecutor>,
        paper_path: impl Into<PathBuf>,
    ) -> Self {
        let Collaborators {
            search,
            completion,
            relations,
        } = collaborators;

        let mut registry = StageRegistry::new();
        registry.register(Arc::new(RetrieveStage::new(search)));
        registry.register(Arc::new(UpdateKnowledgeStage::new(
            Arc::clone(&completion),
            relations,
        )));
        registry.register(Arc::new(GenerateHypothesisStage::new(Arc::clone(
            &completion,
        ))));
        registry.register(Arc::new(DesignExperimentStage::new(Arc::clone(
            &completion,
        ))));
        registry.register(Arc::new(SynthesizeCodeStage::new(Arc::clone(&completion))));
        registry.register(Arc::new(ExecuteSandboxStage::new(executor)));
        registry.register(Arc::new(AnalyzeStage::new(Arc::clone(&completion))));
        registry.register(Arc::new(ReviewStage::new(Arc::clone(&completion))));
        registry.register(Arc::new(IncrementRetryStage::new()));
        registry.register(Arc::new(WritePaperStage::new(completion, paper_path)));

        Self::new(registry)
    }

    /// Stage registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Run the pipeline to its terminal stage
    ///
    /// # Errors
    /// Any collaborator or decode failure aborts the run; retry exhaustion
    /// does not - it is reported as [`RunOutcome::RetriesExhausted`].
    pub async fn run(&self, topic: impl Into<String>) -> Result<RunReport, PipelineError> {
        self.run_with_sink(topic, |_| {}).await
    }

    /// Run the pipeline, invoking `sink` once per completed stage
    pub async fn run_with_sink<F>(
        &self,
        topic: impl Into<String>,
        mut sink: F,
    ) -> Result<RunReport, PipelineError>
    where
        F: FnMut(&StageEvent) + Send,
    {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "research topic must not be empty".to_string(),
            ));
        }

        let run_id = RunId::new();
        let mut state = ResearchState::new(topic);
        let mut events: Vec<StageEvent> = Vec::new();
        let mut current = StageName::Retrieve;

        tracing::info!(run = %run_id, topic = %state.topic, "starting research run");

        while !current.is_terminal() {
            let stage = self
                .registry
                .get(current)
                .ok_or_else(|| PipelineError::UnknownStage(current.to_string()))?;

            for field in stage.required_fields() {
                if !state.has(*field) {
                    return Err(PipelineError::MissingInput {
                        stage: current.to_string(),
                        field: field.to_string(),
                    });
                }
            }

            tracing::info!(run = %run_id, stage = %current, "running stage");
            let update = stage.run(&state).await?;
            validate_ownership(current, &update)?;
            state.apply(&update);

            let event = StageEvent {
                stage: current,
                update,
            };
            sink(&event);
            events.push(event);

            current = next_stage(current, &state).ok_or_else(|| PipelineError::NoTransition {
                from: current.to_string(),
            })?;
        }

        let outcome = if state.paper.is_some() {
            RunOutcome::PaperCompleted
        } else {
            RunOutcome::RetriesExhausted
        };
        tracing::info!(run = %run_id, %outcome, loop_count = state.loop_count, "research run finished");

        Ok(RunReport {
            run_id,
            outcome,
            state,
            events,
        })
    }
}

/// Reject updates that write fields a stage does not own
///
/// `loop_count` belongs exclusively to the retry-increment stage.
fn validate_ownership(stage: StageName, update: &StageUpdate) -> Result<(), PipelineError> {
    if update.loop_count.is_some() && stage != StageName::IncrementRetry {
        return Err(PipelineError::ForbiddenField {
            stage: stage.to_string(),
            field: "loop_count".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_allows_increment_retry() {
        let update = StageUpdate::new().with_loop_count(1);
        assert!(validate_ownership(StageName::IncrementRetry, &update).is_ok());
    }

    #[test]
    fn ownership_rejects_other_writers() {
        let update = StageUpdate::new().with_loop_count(7);
        let err = validate_ownership(StageName::Analyze, &update).unwrap_err();
        assert!(matches!(err, PipelineError::ForbiddenField { .. }));
    }

    #[test]
    fn ownership_ignores_untouched_counter() {
        let update = StageUpdate::new().with_analysis("fine");
        assert!(validate_ownership(StageName::Analyze, &update).is_ok());
    }

    #[tokio::test]
    async fn empty_topic_is_a_configuration_error() {
        let pipeline = ResearchPipeline::new(StageRegistry::new());
        let err = pipeline.run("   ").await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn missing_stage_is_reported() {
        let pipeline = ResearchPipeline::new(StageRegistry::new());
        let err = pipeline.run("topic").await.unwrap_err();
        assert!(matches!(err, PipelineError::UnknownStage(name) if name == "retrieve"));
    }
}
