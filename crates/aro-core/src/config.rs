//! Runtime configuration
//!
//! [`AroConfig`] gathers the knobs for a run: completion endpoint and
//! credential, corpus index location, sandbox root and timeouts, and the
//! final artifact path. A missing credential is a configuration error
//! raised before any stage runs.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the completion API token
pub const API_TOKEN_ENV: &str = "HUGGING_FACE_HUB_TOKEN";

/// Default completion model
pub const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct";

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AroConfig {
    /// Completion API base endpoint
    pub api_endpoint: String,
    /// Completion model identifier
    pub model: String,
    /// Completion API token
    pub api_token: String,
    /// Directory holding the ingested chunk index
    pub index_dir: PathBuf,
    /// Path the completed paper is written to
    pub paper_path: PathBuf,
    /// File the relation store appends to
    pub relations_path: PathBuf,
    /// Root directory for sandbox workspaces
    pub sandbox_root: PathBuf,
    /// Maximum seconds for the image build phase
    pub build_timeout_secs: u64,
    /// Maximum seconds for the container run phase
    pub run_timeout_secs: u64,
    /// Number of chunks retrieved per query
    pub retrieval_k: usize,
}

impl AroConfig {
    /// Create a configuration with the given API token and defaults
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_endpoint: "https://router.huggingface.co/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_token: api_token.into(),
            index_dir: PathBuf::from("chunk_index"),
            paper_path: PathBuf::from("outputs/research_paper.md"),
            relations_path: PathBuf::from("outputs/knowledge_graph.jsonl"),
            sandbox_root: std::env::temp_dir().join("aro-sandbox"),
            build_timeout_secs: 300,
            run_timeout_secs: 120,
            retrieval_k: 5,
        }
    }

    /// Load configuration from the environment
    ///
    /// # Errors
    /// `PipelineError::Configuration` if the API token variable is unset.
    pub fn from_env() -> Result<Self, PipelineError> {
        let token = std::env::var(API_TOKEN_ENV).map_err(|_| {
            PipelineError::Configuration(format!("{API_TOKEN_ENV} environment variable not set"))
        })?;
        Ok(Self::new(token))
    }

    /// With completion model
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With chunk index directory
    #[inline]
    #[must_use]
    pub fn with_index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = dir.into();
        self
    }

    /// With paper output path
    #[inline]
    #[must_use]
    pub fn with_paper_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paper_path = path.into();
        self
    }

    /// With sandbox workspace root
    #[inline]
    #[must_use]
    pub fn with_sandbox_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sandbox_root = root.into();
        self
    }

    /// With build/run timeouts in seconds
    #[inline]
    #[must_use]
    pub fn with_timeouts(mut self, build_secs: u64, run_secs: u64) -> Self {
        self.build_timeout_secs = build_secs;
        self.run_timeout_secs = run_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = AroConfig::new("token");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.retrieval_k, 5);
        assert_eq!(config.build_timeout_secs, 300);
        assert_eq!(config.run_timeout_secs, 120);
    }

    #[test]
    fn config_builders() {
        let config = AroConfig::new("token")
            .with_model("small-model")
            .with_timeouts(10, 5)
            .with_paper_path("out/paper.md");
        assert_eq!(config.model, "small-model");
        assert_eq!(config.build_timeout_secs, 10);
        assert_eq!(config.run_timeout_secs, 5);
        assert_eq!(config.paper_path, PathBuf::from("out/paper.md"));
    }
}
