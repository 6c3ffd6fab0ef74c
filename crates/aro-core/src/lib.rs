//! ARO Core - shared types for the autonomous research orchestrator
//!
//! Provides the pieces every other crate builds on:
//! - The shared research state and stage partial updates
//! - Experiment plans, execution outcomes, and reviewer decisions
//! - Collaborator traits for search, completion, and relation storage
//! - The pipeline error taxonomy and runtime configuration
//!
//! # Example
//!
//! ```rust
//! use aro_core::{Decision, ResearchState, StageUpdate};
//!
//! let mut state = ResearchState::new("attention mechanisms");
//! state.apply(&StageUpdate::new().with_hypothesis("sparse attention scales better"));
//!
//! assert_eq!(Decision::classify("let's proceed"), Decision::Proceed);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod collab;
pub mod config;
pub mod error;
pub mod state;
pub mod types;

// Re-exports for convenience
pub use collab::{DocumentSearch, Relation, RelationStore, TextCompletion};
pub use config::{AroConfig, API_TOKEN_ENV, DEFAULT_MODEL};
pub use error::{CompletionError, PipelineError, SearchError, StoreError};
pub use state::{ResearchState, StageUpdate, StateField};
pub use types::{AttemptId, Decision, ExecutionOutcome, ExperimentPlan, RunId, SandboxErrorKind};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with ARO Core
    pub use crate::{
        AroConfig, Decision, DocumentSearch, ExecutionOutcome, ExperimentPlan, PipelineError,
        Relation, RelationStore, ResearchState, SandboxErrorKind, StageUpdate, StateField,
        TextCompletion,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
