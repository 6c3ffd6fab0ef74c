//! Sandbox execution stage
//!
//! The one stage that never aborts the run: every sandbox failure mode
//! arrives back as an [`ExecutionOutcome::Failed`] value, letting the
//! analyze stage run in degraded mode.
//!
//! [`ExecutionOutcome::Failed`]: aro_core::ExecutionOutcome

use crate::registry::Stage;
use crate::state_machine::StageName;
use aro_core::{PipelineError, ResearchState, StageUpdate, StateField};
use aro_sandbox::SandboxExecutor;
use std::sync::Arc;

/// Runs the generated experiment in the isolated sandbox
pub struct ExecuteSandboxStage {
    executor: Arc<SandboxExecutor>,
}

impl ExecuteSandboxStage {
    /// Create over a sandbox executor
    #[inline]
    #[must_use]
    pub fn new(executor: Arc<SandboxExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait::async_trait]
impl Stage for ExecuteSandboxStage {
    fn name(&self) -> StageName {
        StageName::ExecuteSandbox
    }

    fn required_fields(&self) -> &'static [StateField] {
        &[StateField::GeneratedSource, StateField::BuildDescriptor]
    }

    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError> {
        let source = state.generated_source.as_deref().ok_or_else(|| {
            PipelineError::MissingInput {
                stage: self.name().to_string(),
                field: StateField::GeneratedSource.to_string(),
            }
        })?;
        let descriptor = state.build_descriptor.as_deref().ok_or_else(|| {
            PipelineError::MissingInput {
                stage: self.name().to_string(),
                field: StateField::BuildDescriptor.to_string(),
            }
        })?;

        let outcome = self.executor.execute(source, descriptor).await;
        Ok(StageUpdate::new().with_execution_result(outcome))
    }
}
