//! Corpus ingestion
//!
//! Splits plain-text corpus files into overlapping chunks and writes them to
//! the index directory consumed by [`ChunkIndexSearch`].
//!
//! [`ChunkIndexSearch`]: crate::search::ChunkIndexSearch

use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Characters per chunk
pub const CHUNK_SIZE: usize = 1000;

/// Overlap between consecutive chunks
pub const CHUNK_OVERLAP: usize = 150;

/// Split text into overlapping character chunks
///
/// Degenerate parameters (`overlap >= chunk_size`, which would never make
/// forward progress) yield no chunks rather than panicking.
#[must_use]
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if overlap >= chunk_size {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Ingest a corpus directory into a chunk index
///
/// Walks `corpus_dir` for `.txt` and `.md` files, splits each into
/// overlapping chunks, and writes one `chunk-NNNN.txt` per chunk into
/// `index_dir`. Returns the number of chunks written.
///
/// # Errors
/// Returns an error if the corpus cannot be read or the index cannot be
/// written.
pub fn ingest_corpus(corpus_dir: &Path, index_dir: &Path) -> io::Result<usize> {
    std::fs::create_dir_all(index_dir)?;

    let mut written = 0usize;
    for entry in WalkDir::new(corpus_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let is_text = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == "txt" || ext == "md");
        if !is_text {
            continue;
        }

        let text = std::fs::read_to_string(entry.path())?;
        for chunk in split_text(&text, CHUNK_SIZE, CHUNK_OVERLAP) {
            let name = format!("chunk-{written:04}.txt");
            std::fs::write(index_dir.join(name), chunk)?;
            written += 1;
        }
    }

    tracing::info!(chunks = written, "corpus ingestion complete");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_respects_size_and_overlap() {
        let text = "a".repeat(2500);
        let chunks = split_text(&text, 1000, 150);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[1].len(), 1000);
        // Last chunk carries the remainder
        assert_eq!(chunks[2].len(), 2500 - 2 * (1000 - 150));
    }

    #[test]
    fn split_short_text_is_single_chunk() {
        let chunks = split_text("short", 1000, 150);
        assert_eq!(chunks, vec!["short".to_string()]);
    }

    #[test]
    fn split_empty_text_is_empty() {
        assert!(split_text("", 1000, 150).is_empty());
    }

    #[test]
    fn split_degenerate_overlap_yields_nothing() {
        assert!(split_text("some text", 100, 100).is_empty());
        assert!(split_text("some text", 100, 250).is_empty());
        assert!(split_text("some text", 0, 0).is_empty());
    }

    #[test]
    fn ingest_writes_chunk_files() {
        let corpus = tempfile::tempdir().unwrap();
        let index = tempfile::tempdir().unwrap();
        std::fs::write(corpus.path().join("paper.txt"), "x".repeat(1800)).unwrap();
        std::fs::write(corpus.path().join("ignored.pdf"), b"binary").unwrap();

        let written = ingest_corpus(corpus.path(), index.path()).unwrap();

        assert_eq!(written, 2);
        assert!(index.path().join("chunk-0000.txt").is_file());
        assert!(index.path().join("chunk-0001.txt").is_file());
    }
}
