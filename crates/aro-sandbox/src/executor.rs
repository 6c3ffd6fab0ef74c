//! Sandbox executor
//!
//! Takes generated program text plus a build descriptor, builds a disposable
//! execution image, runs it to completion, and extracts the results
//! artifact. Every failure mode - build failure, crash, missing output,
//! malformed output - is converted into an [`ExecutionOutcome::Failed`]
//! value; `execute` has no error path at all.

use crate::runtime::ContainerRuntime;
use crate::workspace::{Workspace, WorkspaceManager};
use aro_core::{AttemptId, ExecutionOutcome, SandboxErrorKind};
use std::sync::Arc;

/// Well-known source filename inside the workspace
pub const SOURCE_FILENAME: &str = "experiment.py";

/// Well-known build descriptor filename inside the workspace
pub const BUILD_DESCRIPTOR_FILENAME: &str = "Dockerfile";

/// Well-known results artifact filename the experiment must write
pub const RESULTS_FILENAME: &str = "results.json";

/// One disposable execution attempt
///
/// Created at the start of a sandbox invocation and torn down at the end
/// regardless of outcome. Never shared across attempts: no cached images,
/// no warm containers.
#[derive(Debug)]
struct RunAttempt {
    id: AttemptId,
    workspace: Workspace,
    image_tag: String,
}

impl RunAttempt {
    fn new(workspace: Workspace) -> Self {
        let id = AttemptId::new();
        let image_tag = format!("aro-run-{id}");
        Self {
            id,
            workspace,
            image_tag,
        }
    }
}

/// Builds and runs generated experiment code in isolation
pub struct SandboxExecutor {
    workspaces: WorkspaceManager,
    runtime: Arc<dyn ContainerRuntime>,
}

impl SandboxExecutor {
    /// Create an executor over a workspace manager and container runtime
    #[must_use]
    pub fn new(workspaces: WorkspaceManager, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self {
            workspaces,
            runtime,
        }
    }

    /// Execute generated source in an ephemeral sandbox
    ///
    /// Never fails outward: all failure modes come back as
    /// [`ExecutionOutcome::Failed`] so the pipeline can continue to the
    /// analysis stage in degraded mode. The workspace and image are
    /// released on every path.
    pub async fn execute(&self, source: &str, build_descriptor: &str) -> ExecutionOutcome {
        let workspace = match self.workspaces.allocate() {
            Ok(ws) => ws,
            Err(e) => {
                return ExecutionOutcome::failed(
                    SandboxErrorKind::Build,
                    format!("failed to allocate workspace: {e}"),
                );
            }
        };
        let attempt = RunAttempt::new(workspace);
        tracing::info!(attempt = %attempt.id, "starting sandbox attempt");

        let outcome = self.run_attempt(&attempt, source, build_descriptor).await;

        // Teardown on every path: image first, then the workspace.
        self.runtime.remove_image(&attempt.image_tag).await;
        if let Err(e) = self.workspaces.release(&attempt.workspace) {
            tracing::warn!(attempt = %attempt.id, error = %e, "failed to release workspace");
        }

        match &outcome {
            ExecutionOutcome::Completed { .. } => {
                tracing::info!(attempt = %attempt.id, "sandbox attempt completed");
            }
            ExecutionOutcome::Failed { kind, message } => {
                tracing::warn!(attempt = %attempt.id, %kind, %message, "sandbox attempt failed");
            }
        }
        outcome
    }

    async fn run_attempt(
        &self,
        attempt: &RunAttempt,
        source: &str,
        build_descriptor: &str,
    ) -> ExecutionOutcome {
        let ws = attempt.workspace.path();

        if let Err(e) = std::fs::write(ws.join(SOURCE_FILENAME), source) {
            return ExecutionOutcome::failed(
                SandboxErrorKind::Build,
                format!("failed to materialize source: {e}"),
            );
        }
        if let Err(e) = std::fs::write(ws.join(BUILD_DESCRIPTOR_FILENAME), build_descriptor) {
            return ExecutionOutcome::failed(
                SandboxErrorKind::Build,
                format!("failed to materialize build descriptor: {e}"),
            );
        }

        if let Err(e) = self.runtime.build(ws, &attempt.image_tag).await {
            return ExecutionOutcome::failed(SandboxErrorKind::Build, e.message);
        }

        if let Err(e) = self.runtime.run(ws, &attempt.image_tag).await {
            return ExecutionOutcome::failed(SandboxErrorKind::Runtime, e.message);
        }

        self.read_results(&attempt.workspace)
    }

    /// Read and classify the results artifact after a successful run
    fn read_results(&self, workspace: &Workspace) -> ExecutionOutcome {
        let path = workspace.path().join(RESULTS_FILENAME);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return ExecutionOutcome::failed(
                    SandboxErrorKind::MissingArtifact,
                    "results artifact not found",
                );
            }
            Err(e) => {
                return ExecutionOutcome::failed(
                    SandboxErrorKind::MissingArtifact,
                    format!("results artifact unreadable: {e}"),
                );
            }
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Object(results)) => ExecutionOutcome::completed(results),
            Ok(_) => ExecutionOutcome::failed(
                SandboxErrorKind::MalformedArtifact,
                "results artifact is not a JSON object",
            ),
            Err(e) => ExecutionOutcome::failed(
                SandboxErrorKind::MalformedArtifact,
                format!("results artifact is not valid JSON: {e}"),
            ),
        }
    }
}
