//! ARO Sandbox - isolated execution of generated experiment code
//!
//! The sandbox takes arbitrary machine-generated program text, builds an
//! ephemeral execution image for it, runs it to completion, and extracts a
//! structured results artifact - containing every class of failure instead
//! of letting it abort the pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use aro_sandbox::{DockerRuntime, SandboxExecutor, WorkspaceManager};
//! use std::sync::Arc;
//!
//! let executor = SandboxExecutor::new(
//!     WorkspaceManager::new("/tmp/aro-sandbox"),
//!     Arc::new(DockerRuntime::default()),
//! );
//! let outcome = executor.execute(source, dockerfile).await;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod executor;
pub mod runtime;
pub mod workspace;

// Re-exports for convenience
pub use executor::{
    SandboxExecutor, BUILD_DESCRIPTOR_FILENAME, RESULTS_FILENAME, SOURCE_FILENAME,
};
pub use runtime::{ContainerRuntime, DockerRuntime, RuntimeFailure};
pub use workspace::{Workspace, WorkspaceManager};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
