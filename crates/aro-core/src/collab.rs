//! Boundary collaborator traits
//!
//! The pipeline treats its external capabilities as trait objects:
//! - [`DocumentSearch`] - semantic search over an ingested corpus
//! - [`TextCompletion`] - a hosted text-generation capability
//! - [`RelationStore`] - best-effort storage for extracted relations
//!
//! All calls are blocking (async) and fallible with no internal retry;
//! search and completion failures abort the run, while the relation store
//! is an optional collaborator whose failure is logged and skipped.

use crate::error::{CompletionError, SearchError, StoreError};
use serde::{Deserialize, Serialize};

/// Semantic document search over a corpus
#[async_trait::async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Return the most relevant text chunks for a query, best first
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError>;
}

/// Hosted text-generation capability
#[async_trait::async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete a prompt, returning generated text
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Extracted knowledge-graph relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Source entity
    #[serde(rename = "source_entity")]
    pub source: String,
    /// Relation label
    pub relation: String,
    /// Target entity
    #[serde(rename = "target_entity")]
    pub target: String,
}

/// Best-effort relation storage for the auxiliary knowledge graph
#[async_trait::async_trait]
pub trait RelationStore: Send + Sync {
    /// Persist a batch of relations
    async fn store(&self, relations: &[Relation]) -> Result<(), StoreError>;
}
