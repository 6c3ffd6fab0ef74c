//! Retrieval stage - fetch document chunks for the topic

use crate::registry::Stage;
use crate::state_machine::StageName;
use aro_core::{DocumentSearch, PipelineError, ResearchState, StageUpdate};
use std::sync::Arc;

/// Retrieves the most relevant corpus chunks for the research topic
///
/// A missing search index is fatal: the rest of the pipeline has nothing
/// to reason over without retrieved context.
pub struct RetrieveStage {
    search: Arc<dyn DocumentSearch>,
}

impl RetrieveStage {
    /// Create over a document search collaborator
    #[inline]
    #[must_use]
    pub fn new(search: Arc<dyn DocumentSearch>) -> Self {
        Self { search }
    }
}

#[async_trait::async_trait]
impl Stage for RetrieveStage {
    fn name(&self) -> StageName {
        StageName::Retrieve
    }

    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError> {
        let documents = self.search.search(&state.topic).await?;
        tracing::info!(count = documents.len(), "retrieved documents");
        Ok(StageUpdate::new().with_documents(documents))
    }
}
