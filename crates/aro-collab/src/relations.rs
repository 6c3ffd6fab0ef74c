//! Append-only relation store
//!
//! Persists extracted knowledge-graph relations as JSON lines. The store is
//! a best-effort collaborator: callers log and skip on failure rather than
//! aborting the run.

use aro_core::{Relation, RelationStore, StoreError};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Relation store backed by a JSONL file
#[derive(Debug)]
pub struct JsonlRelationStore {
    path: PathBuf,
    // Serializes appends; store calls may interleave across retry cycles.
    lock: Mutex<()>,
}

impl JsonlRelationStore {
    /// Create a store appending to the given file
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait::async_trait]
impl RelationStore for JsonlRelationStore {
    async fn store(&self, relations: &[Relation]) -> Result<(), StoreError> {
        if relations.is_empty() {
            return Ok(());
        }

        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        }

        let mut lines = String::new();
        for relation in relations {
            let line = serde_json::to_string(relation)
                .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
            lines.push_str(&line);
            lines.push('\n');
        }

        use std::io::Write as _;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        file.write_all(lines.as_bytes())
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        tracing::debug!(count = relations.len(), "stored relations");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(source: &str, target: &str) -> Relation {
        Relation {
            source: source.to_string(),
            relation: "uses".to_string(),
            target: target.to_string(),
        }
    }

    #[tokio::test]
    async fn appends_json_lines() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("kg.jsonl");
        let store = JsonlRelationStore::new(&path);

        store
            .store(&[relation("BERT", "attention"), relation("GPT", "attention")])
            .await
            .unwrap();
        store.store(&[relation("T5", "attention")]).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: Relation = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.source, "BERT");
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("kg.jsonl");
        let store = JsonlRelationStore::new(&path);

        store.store(&[]).await.unwrap();
        assert!(!path.exists());
    }
}
