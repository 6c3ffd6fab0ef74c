//! Stage registry
//!
//! Maps [`StageName`]s to [`Stage`] trait objects. Stages are stateless:
//! each receives a read-only snapshot of the research state and returns a
//! partial update for the orchestrator to merge.

use crate::state_machine::StageName;
use aro_core::{PipelineError, ResearchState, StageUpdate, StateField};
use std::collections::HashMap;
use std::sync::Arc;

/// One named unit of work in the pipeline
#[async_trait::async_trait]
pub trait Stage: Send + Sync {
    /// Name of the graph node this stage implements
    fn name(&self) -> StageName;

    /// Input fields that must be populated before this stage runs
    ///
    /// Validated by the orchestrator before invocation; not enforced at
    /// compile time.
    fn required_fields(&self) -> &'static [StateField] {
        &[]
    }

    /// Run the stage over a state snapshot, producing a partial update
    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError>;
}

/// Registry of available stages
#[derive(Default)]
pub struct StageRegistry {
    stages: HashMap<StageName, Arc<dyn Stage>>,
}

impl StageRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: HashMap::new(),
        }
    }

    /// Register a stage under its own name, replacing any previous entry
    pub fn register(&mut self, stage: Arc<dyn Stage>) {
        self.stages.insert(stage.name(), stage);
    }

    /// Look up a stage by name
    #[must_use]
    pub fn get(&self, name: StageName) -> Option<&Arc<dyn Stage>> {
        self.stages.get(&name)
    }

    /// Whether a stage exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: StageName) -> bool {
        self.stages.contains_key(&name)
    }

    /// Number of registered stages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Registered stage names
    #[must_use]
    pub fn names(&self) -> Vec<StageName> {
        self.stages.keys().copied().collect()
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.names())
            .finish()
    }
}
