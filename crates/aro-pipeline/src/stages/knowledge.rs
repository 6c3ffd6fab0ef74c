//! Knowledge graph update stage - extract and store relations

use crate::registry::Stage;
use crate::stages::extract_delimited;
use crate::state_machine::StageName;
use aro_core::{
    PipelineError, Relation, RelationStore, ResearchState, StageUpdate, TextCompletion,
};
use std::sync::Arc;

fn extraction_prompt(document: &str) -> String {
    format!(
        "From the research document text below, extract key entities and their \
relationships. Extract entity types: 'concept', 'method', 'metric'.\n\
Format the output as a valid JSON list of objects. Each object must have \
'source_entity', 'relation', and 'target_entity' keys.\n\
Example: [{{\"source_entity\": \"BERT\", \"relation\": \"uses\", \"target_entity\": \"attention mechanism\"}}]\n\n\
Document text:\n---\n{document}\n---\nJSON Output:"
    )
}

/// Extracts entity relations from the retrieved documents and stores them
///
/// The relation store is an optional, best-effort collaborator: when it is
/// absent the stage skips entirely, and a store failure is logged and
/// ignored. Per-document decode failures are likewise skipped - one bad
/// extraction never costs the run. Completion transport failures still
/// abort, as everywhere else.
pub struct UpdateKnowledgeStage {
    completion: Arc<dyn TextCompletion>,
    store: Option<Arc<dyn RelationStore>>,
}

impl UpdateKnowledgeStage {
    /// Create over a completion collaborator and an optional relation store
    #[inline]
    #[must_use]
    pub fn new(
        completion: Arc<dyn TextCompletion>,
        store: Option<Arc<dyn RelationStore>>,
    ) -> Self {
        Self { completion, store }
    }
}

#[async_trait::async_trait]
impl Stage for UpdateKnowledgeStage {
    fn name(&self) -> StageName {
        StageName::UpdateKnowledge
    }

    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError> {
        if state.documents.is_empty() {
            return Ok(StageUpdate::new());
        }
        let Some(store) = &self.store else {
            tracing::debug!("no relation store configured, skipping knowledge update");
            return Ok(StageUpdate::new());
        };

        let mut relations: Vec<Relation> = Vec::new();
        for document in &state.documents {
            let response = self.completion.complete(&extraction_prompt(document)).await?;
            match decode_relations(&response) {
                Some(extracted) => relations.extend(extracted),
                None => {
                    tracing::warn!("failed to decode relations from a document, skipping");
                }
            }
        }

        if relations.is_empty() {
            tracing::info!("no new relations extracted");
            return Ok(StageUpdate::new());
        }

        match store.store(&relations).await {
            Ok(()) => tracing::info!(count = relations.len(), "knowledge graph updated"),
            Err(e) => tracing::warn!(error = %e, "relation store failed, continuing"),
        }

        Ok(StageUpdate::new())
    }
}

fn decode_relations(response: &str) -> Option<Vec<Relation>> {
    let list = extract_delimited(response, '[', ']')?;
    serde_json::from_str(list).ok()
}
