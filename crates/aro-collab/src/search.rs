//! Chunk-corpus search
//!
//! Ranks pre-chunked corpus files (see [`crate::ingest`]) by query term
//! overlap and returns the top-k chunk texts. A missing index directory is
//! [`SearchError::NotAvailable`] - fatal to the run, since retrieval is the
//! first stage.

use aro_core::{DocumentSearch, SearchError};
use std::path::{Path, PathBuf};

/// Search over an on-disk chunk index
#[derive(Debug, Clone)]
pub struct ChunkIndexSearch {
    index_dir: PathBuf,
    k: usize,
}

impl ChunkIndexSearch {
    /// Create a search over an index directory, returning `k` chunks per query
    #[inline]
    #[must_use]
    pub fn new(index_dir: impl Into<PathBuf>, k: usize) -> Self {
        Self {
            index_dir: index_dir.into(),
            k,
        }
    }

    fn load_chunks(&self) -> Result<Vec<String>, SearchError> {
        let mut chunks = Vec::new();
        let mut entries: Vec<_> = std::fs::read_dir(&self.index_dir)
            .map_err(|e| SearchError::Backend(format!("cannot read index: {e}")))?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        entries.sort();

        for path in entries {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| SearchError::Backend(format!("cannot read chunk {path:?}: {e}")))?;
            chunks.push(text);
        }
        Ok(chunks)
    }
}

/// Score a chunk by case-insensitive query term overlap
fn overlap_score(query_terms: &[String], chunk: &str) -> usize {
    let haystack = chunk.to_lowercase();
    query_terms
        .iter()
        .filter(|term| haystack.contains(term.as_str()))
        .count()
}

#[async_trait::async_trait]
impl DocumentSearch for ChunkIndexSearch {
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        if !Path::is_dir(&self.index_dir) {
            return Err(SearchError::NotAvailable(format!(
                "chunk index not found at {}; run ingest first",
                self.index_dir.display()
            )));
        }

        let chunks = self.load_chunks()?;
        let query_terms: Vec<String> = query
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|t| t.len() > 2)
            .collect();

        let mut scored: Vec<(usize, String)> = chunks
            .into_iter()
            .map(|chunk| (overlap_score(&query_terms, &chunk), chunk))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(self.k);

        tracing::debug!(hits = scored.len(), "chunk index query");
        Ok(scored.into_iter().map(|(_, chunk)| chunk).collect())
    }
}
