//! ARO Pipeline - the research stage graph and its orchestrator
//!
//! Provides the moving parts of a research run:
//! - The stage transition table and its guards
//! - The `Stage` trait, stage registry, and the nine standard stages
//! - The orchestrator that drives a run from retrieval to termination
//!
//! A run walks `retrieve -> update_knowledge -> generate_hypothesis ->
//! design_experiment -> synthesize_code -> execute_sandbox -> analyze ->
//! review`, then either writes the paper, loops back to redesign, or gives
//! up after [`state_machine::MAX_LOOPS`] redesign cycles.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod orchestrator;
pub mod registry;
pub mod stages;
pub mod state_machine;

// Re-exports for convenience
pub use orchestrator::{Collaborators, ResearchPipeline, RunOutcome, RunReport, StageEvent};
pub use registry::{Stage, StageRegistry};
pub use state_machine::{next_stage, StageName, MAX_LOOPS};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving research runs
    pub use crate::{
        Collaborators, ResearchPipeline, RunOutcome, RunReport, Stage, StageEvent, StageName,
        StageRegistry,
    };
    pub use aro_core::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
