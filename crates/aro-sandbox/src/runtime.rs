//! Container runtime abstraction
//!
//! [`ContainerRuntime`] is the seam between the sandbox executor and the
//! actual build/run machinery. [`DockerRuntime`] shells out to the docker
//! CLI via `tokio::process`; tests inject scripted runtimes instead.

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Failure of a build or run phase
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct RuntimeFailure {
    /// Human-readable failure message
    pub message: String,
}

impl RuntimeFailure {
    /// Create a failure from a message
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build-and-run environment for one workspace
///
/// Both phases must run to completion with no interactive input. A phase
/// exceeding its deadline is reported the same way as a phase failure.
#[async_trait::async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Build an execution image from the workspace contents
    async fn build(&self, workspace: &Path, image_tag: &str) -> Result<(), RuntimeFailure>;

    /// Run the built image to completion, with the workspace mounted
    async fn run(&self, workspace: &Path, image_tag: &str) -> Result<(), RuntimeFailure>;

    /// Discard the built image; best-effort
    async fn remove_image(&self, image_tag: &str);
}

/// Docker-CLI backed runtime
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    build_timeout: Duration,
    run_timeout: Duration,
}

impl DockerRuntime {
    /// Create a runtime with phase deadlines
    #[inline]
    #[must_use]
    pub fn new(build_timeout: Duration, run_timeout: Duration) -> Self {
        Self {
            build_timeout,
            run_timeout,
        }
    }

    async fn run_command(
        mut cmd: Command,
        deadline: Duration,
        phase: &str,
    ) -> Result<(), RuntimeFailure> {
        cmd.stdin(std::process::Stdio::null());
        // A timed-out phase must not leave the subprocess running
        cmd.kill_on_drop(true);
        let output = tokio::time::timeout(deadline, cmd.output())
            .await
            .map_err(|_| {
                RuntimeFailure::new(format!(
                    "{phase} timed out after {}s",
                    deadline.as_secs()
                ))
            })?
            .map_err(|e| RuntimeFailure::new(format!("failed to spawn {phase}: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            Err(RuntimeFailure::new(format!(
                "{phase} exited with {}: {detail}",
                output.status
            )))
        }
    }
}

impl Default for DockerRuntime {
    fn default() -> Self {
        Self::new(Duration::from_secs(300), Duration::from_secs(120))
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn build(&self, workspace: &Path, image_tag: &str) -> Result<(), RuntimeFailure> {
        let mut cmd = Command::new("docker");
        cmd.arg("build")
            .arg("--rm")
            .arg("-t")
            .arg(image_tag)
            .arg(workspace);
        tracing::debug!(%image_tag, "building sandbox image");
        Self::run_command(cmd, self.build_timeout, "image build").await
    }

    async fn run(&self, workspace: &Path, image_tag: &str) -> Result<(), RuntimeFailure> {
        // The workspace is the only volume; the container writes its
        // results artifact there and keeps nothing else.
        let mut cmd = Command::new("docker");
        cmd.arg("run")
            .arg("--rm")
            .arg("--network=none")
            .arg("-v")
            .arg(format!("{}:/app", workspace.display()))
            .arg(image_tag);
        tracing::debug!(%image_tag, "running sandbox container");
        Self::run_command(cmd, self.run_timeout, "container run").await
    }

    async fn remove_image(&self, image_tag: &str) {
        let mut cmd = Command::new("docker");
        cmd.arg("rmi").arg("-f").arg(image_tag);
        cmd.stdin(std::process::Stdio::null());
        if let Err(e) = cmd.output().await {
            tracing::warn!(%image_tag, error = %e, "failed to remove sandbox image");
        }
    }
}
