//! Error types for the research pipeline
//!
//! Propagation policy: collaborator failures and decode failures abort the
//! run; sandbox failures never appear here - the sandbox executor converts
//! every failure mode into an [`ExecutionOutcome::Failed`] value instead.
//!
//! [`ExecutionOutcome::Failed`]: crate::types::ExecutionOutcome

/// Main pipeline error type
///
/// Any of these terminates the run immediately. Retry exhaustion is *not*
/// an error - it is a controlled terminal outcome reported by the
/// orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Missing or invalid configuration, detected before any stage runs
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Document search failed
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] SearchError),

    /// Text completion collaborator failed
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),

    /// A stage expected structured model output it could not decode
    #[error("stage `{stage}` could not decode model output: {message}")]
    GenerationParse {
        /// Stage that performed the decode
        stage: String,
        /// Decode failure detail
        message: String,
    },

    /// A stage was invoked without a required upstream input
    #[error("stage `{stage}` missing required input `{field}`")]
    MissingInput {
        /// Stage that was about to run
        stage: String,
        /// The absent field
        field: String,
    },

    /// A stage tried to write a field it does not own
    #[error("stage `{stage}` attempted to write reserved field `{field}`")]
    ForbiddenField {
        /// Offending stage
        stage: String,
        /// Reserved field
        field: String,
    },

    /// No stage registered under a name the graph routed to
    #[error("no stage registered for `{0}`")]
    UnknownStage(String),

    /// The transition table defines no edge out of a non-terminal stage
    #[error("no transition defined from stage `{from}`")]
    NoTransition {
        /// Stage the graph stalled at
        from: String,
    },

    /// Filesystem failure persisting the final artifact
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether the error was raised before the first stage ran
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Document search errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The index has not been built; fatal to the run
    #[error("search index not available: {0}")]
    NotAvailable(String),

    /// The backing store failed mid-query
    #[error("search backend failed: {0}")]
    Backend(String),
}

/// Text completion errors
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Transport, auth, or model failure
    #[error("api error: {0}")]
    Api(String),

    /// The response carried no usable text
    #[error("empty completion response")]
    EmptyResponse,
}

/// Relation store errors (best-effort; never abort the run)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Write to the backing store failed
    #[error("relation store write failed: {0}")]
    WriteFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_display() {
        let err = PipelineError::Configuration("missing token".to_string());
        assert!(err.to_string().contains("configuration error"));
        assert!(err.is_configuration());
    }

    #[test]
    fn search_error_converts() {
        let err: PipelineError = SearchError::NotAvailable("run ingest first".to_string()).into();
        assert!(matches!(err, PipelineError::Retrieval(_)));
        assert!(!err.is_configuration());
    }

    #[test]
    fn missing_input_names_stage_and_field() {
        let err = PipelineError::MissingInput {
            stage: "analyze".to_string(),
            field: "execution_result".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("analyze"));
        assert!(text.contains("execution_result"));
    }
}
