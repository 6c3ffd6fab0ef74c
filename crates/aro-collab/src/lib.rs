//! ARO Collaborators - concrete boundary implementations
//!
//! The pipeline core only knows the collaborator traits in `aro-core`; this
//! crate supplies the real implementations:
//! - [`HfCompletionClient`] - hosted text completion over HTTP
//! - [`ChunkIndexSearch`] - term-overlap search over an ingested corpus
//! - [`JsonlRelationStore`] - best-effort knowledge-graph storage
//! - [`ingest`] - corpus chunking that builds the search index

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod completion;
pub mod ingest;
pub mod relations;
pub mod search;

// Re-exports for convenience
pub use completion::HfCompletionClient;
pub use ingest::{ingest_corpus, split_text, CHUNK_OVERLAP, CHUNK_SIZE};
pub use relations::JsonlRelationStore;
pub use search::ChunkIndexSearch;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
