//! Core types for ARO
//!
//! Defines the fundamental value types shared across the workspace:
//! - Run and attempt identifiers
//! - Experiment plans decoded from model output
//! - Execution outcomes produced by the sandbox
//! - Reviewer decisions

use serde::{Deserialize, Serialize};
use ulid::Ulid;
use uuid::Uuid;

/// Unique pipeline run identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique sandbox attempt identifier (never reused across attempts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(pub Uuid);

impl AttemptId {
    /// Generate new attempt ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Experiment plan decoded from model output
///
/// The methodology may come back as structured JSON or plain text, so it is
/// kept as a raw value rather than forced into a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    /// Public dataset names to use
    #[serde(default)]
    pub datasets: Vec<String>,
    /// Step-by-step experimental procedure (structured or text)
    pub methodology: serde_json::Value,
    /// Measurable evaluation metrics
    #[serde(default)]
    pub metrics: Vec<String>,
}

impl ExperimentPlan {
    /// Methodology rendered as display text for prompts
    #[must_use]
    pub fn methodology_text(&self) -> String {
        match &self.methodology {
            serde_json::Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_default(),
        }
    }
}

/// Kinds of sandbox failure
///
/// Every integration point of the sandbox is a potential failure point;
/// each degrades to one of these instead of propagating an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SandboxErrorKind {
    /// Image build failed
    Build,
    /// Container exited abnormally or timed out
    Runtime,
    /// No results artifact was written
    MissingArtifact,
    /// Results artifact was not valid structured output
    MalformedArtifact,
}

impl std::fmt::Display for SandboxErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Build => "build error",
            Self::Runtime => "runtime error",
            Self::MissingArtifact => "missing artifact",
            Self::MalformedArtifact => "malformed artifact",
        };
        write!(f, "{name}")
    }
}

/// Outcome of a sandbox execution attempt
///
/// `Completed` carries the parsed results artifact verbatim - no key
/// filtering, no transformation. `Failed` carries a classified error that
/// the analyze stage consumes in degraded mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionOutcome {
    /// The experiment ran and produced a parseable results artifact
    Completed {
        /// Parsed results record, returned unchanged
        results: serde_json::Map<String, serde_json::Value>,
    },
    /// Some phase of the attempt failed
    Failed {
        /// Failure classification
        kind: SandboxErrorKind,
        /// Human-readable failure message
        message: String,
    },
}

impl ExecutionOutcome {
    /// Build a completed outcome from a parsed results object
    #[inline]
    #[must_use]
    pub fn completed(results: serde_json::Map<String, serde_json::Value>) -> Self {
        Self::Completed { results }
    }

    /// Build a failed outcome
    #[inline]
    #[must_use]
    pub fn failed(kind: SandboxErrorKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }

    /// Whether this outcome is a failure
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Render as the JSON record the rest of the pipeline consumes
    ///
    /// Completed outcomes render as the results record itself; failures
    /// render as `{"error": <message>}`.
    #[must_use]
    pub fn to_record(&self) -> serde_json::Value {
        match self {
            Self::Completed { results } => serde_json::Value::Object(results.clone()),
            Self::Failed { message, .. } => {
                let mut map = serde_json::Map::new();
                map.insert(
                    "error".to_string(),
                    serde_json::Value::String(message.clone()),
                );
                serde_json::Value::Object(map)
            }
        }
    }
}

/// Reviewer decision for the conditional edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Results are sufficient; write the paper
    Proceed,
    /// Results are insufficient; redesign the experiment
    Redesign,
}

impl Decision {
    /// Classify free-form reviewer output into a decision
    ///
    /// Case-insensitive substring match. Text containing "proceed" (and not
    /// "redesign") maps to `Proceed`; anything else - "redesign", both
    /// substrings, or neither - maps to `Redesign`. Ambiguous review output
    /// never auto-accepts a result.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let proceed = lowered.contains("proceed");
        let redesign = lowered.contains("redesign");
        if proceed && !redesign {
            Self::Proceed
        } else {
            Self::Redesign
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proceed => write!(f, "proceed"),
            Self::Redesign => write!(f, "redesign"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_proceed() {
        assert_eq!(
            Decision::classify("I think we should proceed now"),
            Decision::Proceed
        );
        assert_eq!(Decision::classify("PROCEED"), Decision::Proceed);
    }

    #[test]
    fn classify_redesign() {
        assert_eq!(
            Decision::classify("needs more data, let's redesign"),
            Decision::Redesign
        );
    }

    #[test]
    fn classify_defaults_to_redesign() {
        assert_eq!(Decision::classify("unclear"), Decision::Redesign);
        assert_eq!(Decision::classify(""), Decision::Redesign);
    }

    #[test]
    fn classify_both_substrings_fails_closed() {
        assert_eq!(
            Decision::classify("proceed, or maybe redesign"),
            Decision::Redesign
        );
    }

    #[test]
    fn outcome_failure_renders_error_record() {
        let outcome = ExecutionOutcome::failed(SandboxErrorKind::Build, "no compiler");
        let record = outcome.to_record();
        assert_eq!(record["error"], "no compiler");
    }

    #[test]
    fn outcome_completed_renders_results_unchanged() {
        let mut results = serde_json::Map::new();
        results.insert("accuracy".to_string(), serde_json::json!(0.95));
        let outcome = ExecutionOutcome::completed(results.clone());
        assert_eq!(
            outcome.to_record(),
            serde_json::Value::Object(results)
        );
        assert!(!outcome.is_failure());
    }

    #[test]
    fn experiment_plan_accepts_text_methodology() {
        let plan: ExperimentPlan = serde_json::from_value(serde_json::json!({
            "datasets": ["imdb"],
            "methodology": "train a classifier",
            "metrics": ["accuracy"]
        }))
        .unwrap();
        assert_eq!(plan.methodology_text(), "train a classifier");
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
        assert_ne!(AttemptId::new(), AttemptId::new());
    }
}
