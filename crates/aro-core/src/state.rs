//! Shared research state and partial updates
//!
//! The pipeline threads a single [`ResearchState`] record through every
//! stage. Stages never mutate the state directly; each returns a
//! [`StageUpdate`] and the orchestrator performs the merge. This keeps
//! replay and testing of individual stages trivial.

use crate::types::{Decision, ExecutionOutcome, ExperimentPlan};
use serde::{Deserialize, Serialize};

/// State fields a stage can declare as required inputs
///
/// Used for pre-invocation validation only; not enforced at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateField {
    /// Retrieved document chunks
    Documents,
    /// Formulated hypothesis
    Hypothesis,
    /// Decoded experiment plan
    ExperimentPlan,
    /// Generated experiment source
    GeneratedSource,
    /// Generated build descriptor
    BuildDescriptor,
    /// Sandbox execution outcome
    ExecutionResult,
    /// Analysis of the results
    Analysis,
    /// Reviewer decision
    Decision,
}

impl std::fmt::Display for StateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Documents => "documents",
            Self::Hypothesis => "hypothesis",
            Self::ExperimentPlan => "experiment_plan",
            Self::GeneratedSource => "generated_source",
            Self::BuildDescriptor => "build_descriptor",
            Self::ExecutionResult => "execution_result",
            Self::Analysis => "analysis",
            Self::Decision => "decision",
        };
        write!(f, "{name}")
    }
}

/// The single record threaded through the whole run
///
/// Every field except `topic` and `loop_count` starts absent and is
/// populated by stage updates. `decision` and `loop_count` are rewritten
/// each retry cycle; `loop_count` is owned exclusively by the
/// retry-increment stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    /// Research topic driving the run
    pub topic: String,
    /// Retrieved document chunks (ordered)
    pub documents: Vec<String>,
    /// Formulated hypothesis
    pub hypothesis: Option<String>,
    /// Decoded experiment plan
    pub experiment_plan: Option<ExperimentPlan>,
    /// Generated experiment source text
    pub generated_source: Option<String>,
    /// Generated build descriptor text
    pub build_descriptor: Option<String>,
    /// Outcome of the sandbox execution
    pub execution_result: Option<ExecutionOutcome>,
    /// Analysis of the results
    pub analysis: Option<String>,
    /// Reviewer decision
    pub decision: Option<Decision>,
    /// Completed paper text
    pub paper: Option<String>,
    /// Number of redesign cycles taken so far
    pub loop_count: u32,
}

impl ResearchState {
    /// Create the initial state for a topic
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            documents: Vec::new(),
            hypothesis: None,
            experiment_plan: None,
            generated_source: None,
            build_descriptor: None,
            execution_result: None,
            analysis: None,
            decision: None,
            paper: None,
            loop_count: 0,
        }
    }

    /// Whether a declared input field is populated
    #[must_use]
    pub fn has(&self, field: StateField) -> bool {
        match field {
            StateField::Documents => !self.documents.is_empty(),
            StateField::Hypothesis => self.hypothesis.is_some(),
            StateField::ExperimentPlan => self.experiment_plan.is_some(),
            StateField::GeneratedSource => self.generated_source.is_some(),
            StateField::BuildDescriptor => self.build_descriptor.is_some(),
            StateField::ExecutionResult => self.execution_result.is_some(),
            StateField::Analysis => self.analysis.is_some(),
            StateField::Decision => self.decision.is_some(),
        }
    }

    /// Apply a partial update, last-write-wins per field
    ///
    /// Fields the update does not mention are left untouched. This is the
    /// only mutation path for the state.
    pub fn apply(&mut self, update: &StageUpdate) {
        if let Some(documents) = &update.documents {
            self.documents = documents.clone();
        }
        if let Some(hypothesis) = &update.hypothesis {
            self.hypothesis = Some(hypothesis.clone());
        }
        if let Some(plan) = &update.experiment_plan {
            self.experiment_plan = Some(plan.clone());
        }
        if let Some(source) = &update.generated_source {
            self.generated_source = Some(source.clone());
        }
        if let Some(descriptor) = &update.build_descriptor {
            self.build_descriptor = Some(descriptor.clone());
        }
        if let Some(outcome) = &update.execution_result {
            self.execution_result = Some(outcome.clone());
        }
        if let Some(analysis) = &update.analysis {
            self.analysis = Some(analysis.clone());
        }
        if let Some(decision) = update.decision {
            self.decision = Some(decision);
        }
        if let Some(paper) = &update.paper {
            self.paper = Some(paper.clone());
        }
        if let Some(loop_count) = update.loop_count {
            self.loop_count = loop_count;
        }
    }
}

/// Partial update returned by a stage
///
/// A set of field assignments; unmentioned fields stay `None` and are left
/// untouched by the merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageUpdate {
    /// Replace the document set
    pub documents: Option<Vec<String>>,
    /// Set the hypothesis
    pub hypothesis: Option<String>,
    /// Set the experiment plan
    pub experiment_plan: Option<ExperimentPlan>,
    /// Set the generated source
    pub generated_source: Option<String>,
    /// Set the build descriptor
    pub build_descriptor: Option<String>,
    /// Set the execution outcome
    pub execution_result: Option<ExecutionOutcome>,
    /// Set the analysis
    pub analysis: Option<String>,
    /// Set the decision
    pub decision: Option<Decision>,
    /// Set the paper
    pub paper: Option<String>,
    /// Set the loop counter (retry-increment stage only)
    pub loop_count: Option<u32>,
}

impl StageUpdate {
    /// Create an empty update
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the update assigns no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// With documents
    #[inline]
    #[must_use]
    pub fn with_documents(mut self, documents: Vec<String>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// With hypothesis
    #[inline]
    #[must_use]
    pub fn with_hypothesis(mut self, hypothesis: impl Into<String>) -> Self {
        self.hypothesis = Some(hypothesis.into());
        self
    }

    /// With experiment plan
    #[inline]
    #[must_use]
    pub fn with_experiment_plan(mut self, plan: ExperimentPlan) -> Self {
        self.experiment_plan = Some(plan);
        self
    }

    /// With generated source
    #[inline]
    #[must_use]
    pub fn with_generated_source(mut self, source: impl Into<String>) -> Self {
        self.generated_source = Some(source.into());
        self
    }

    /// With build descriptor
    #[inline]
    #[must_use]
    pub fn with_build_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.build_descriptor = Some(descriptor.into());
        self
    }

    /// With execution outcome
    #[inline]
    #[must_use]
    pub fn with_execution_result(mut self, outcome: ExecutionOutcome) -> Self {
        self.execution_result = Some(outcome);
        self
    }

    /// With analysis
    #[inline]
    #[must_use]
    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.analysis = Some(analysis.into());
        self
    }

    /// With decision
    #[inline]
    #[must_use]
    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = Some(decision);
        self
    }

    /// With paper
    #[inline]
    #[must_use]
    pub fn with_paper(mut self, paper: impl Into<String>) -> Self {
        self.paper = Some(paper.into());
        self
    }

    /// With loop counter
    #[inline]
    #[must_use]
    pub fn with_loop_count(mut self, loop_count: u32) -> Self {
        self.loop_count = Some(loop_count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SandboxErrorKind;

    #[test]
    fn new_state_starts_empty() {
        let state = ResearchState::new("attention mechanisms");
        assert_eq!(state.topic, "attention mechanisms");
        assert_eq!(state.loop_count, 0);
        assert!(!state.has(StateField::Documents));
        assert!(!state.has(StateField::Hypothesis));
        assert!(!state.has(StateField::Decision));
    }

    #[test]
    fn apply_merges_mentioned_fields_only() {
        let mut state = ResearchState::new("topic");
        state.apply(&StageUpdate::new().with_hypothesis("h1"));

        let update = StageUpdate::new().with_analysis("looks fine");
        state.apply(&update);

        assert_eq!(state.hypothesis.as_deref(), Some("h1"));
        assert_eq!(state.analysis.as_deref(), Some("looks fine"));
    }

    #[test]
    fn apply_is_last_write_wins() {
        let mut state = ResearchState::new("topic");
        state.apply(&StageUpdate::new().with_hypothesis("first"));
        state.apply(&StageUpdate::new().with_hypothesis("second"));
        assert_eq!(state.hypothesis.as_deref(), Some("second"));
    }

    #[test]
    fn apply_sets_execution_result() {
        let mut state = ResearchState::new("topic");
        let outcome = ExecutionOutcome::failed(SandboxErrorKind::Runtime, "exit 1");
        state.apply(&StageUpdate::new().with_execution_result(outcome.clone()));
        assert_eq!(state.execution_result, Some(outcome));
        assert!(state.has(StateField::ExecutionResult));
    }

    #[test]
    fn empty_update_is_empty() {
        assert!(StageUpdate::new().is_empty());
        assert!(!StageUpdate::new().with_loop_count(1).is_empty());
    }
}
