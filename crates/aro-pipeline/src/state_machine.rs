//! Stage graph as data
//!
//! The pipeline is a fixed, linear stage chain with a single conditional
//! back-edge at `review`, bounded by a retry ceiling. The transitions are
//! enumerated as a table of `(from, guard, to)` rows so the ceiling and the
//! terminal conditions are independently testable, rather than buried in
//! inline branching code.

use aro_core::{Decision, ResearchState};
use serde::{Deserialize, Serialize};

/// Maximum number of redesign cycles before forced termination
pub const MAX_LOOPS: u32 = 3;

/// Stage names of the research pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageName {
    /// Retrieve documents for the topic
    Retrieve,
    /// Extract relations and update the knowledge graph
    UpdateKnowledge,
    /// Formulate a testable hypothesis
    GenerateHypothesis,
    /// Design the experiment plan
    DesignExperiment,
    /// Generate experiment code and build descriptor
    SynthesizeCode,
    /// Run the experiment in the sandbox
    ExecuteSandbox,
    /// Analyze execution results
    Analyze,
    /// Review the analysis and decide
    Review,
    /// Increment the retry counter
    IncrementRetry,
    /// Write the final paper
    WritePaper,
    /// Terminal state; no further transitions
    Terminated,
}

impl StageName {
    /// Canonical display name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::UpdateKnowledge => "update_knowledge",
            Self::GenerateHypothesis => "generate_hypothesis",
            Self::DesignExperiment => "design_experiment",
            Self::SynthesizeCode => "synthesize_code",
            Self::ExecuteSandbox => "execute_sandbox",
            Self::Analyze => "analyze",
            Self::Review => "review",
            Self::IncrementRetry => "increment_retry",
            Self::WritePaper => "write_paper",
            Self::Terminated => "TERMINATED",
        }
    }

    /// Whether the orchestrator stops here
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Predicate guarding a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Unconditional edge
    Always,
    /// Reviewer decided to proceed
    DecisionProceed,
    /// Reviewer decided to redesign and the retry budget remains
    RedesignUnderBudget,
    /// Reviewer decided to redesign and the retry budget is spent
    RedesignExhausted,
}

impl Guard {
    /// Evaluate the guard against the current state
    #[must_use]
    pub fn holds(&self, state: &ResearchState) -> bool {
        match self {
            Self::Always => true,
            Self::DecisionProceed => state.decision == Some(Decision::Proceed),
            Self::RedesignUnderBudget => {
                state.decision == Some(Decision::Redesign) && state.loop_count < MAX_LOOPS
            }
            Self::RedesignExhausted => {
                state.decision == Some(Decision::Redesign) && state.loop_count >= MAX_LOOPS
            }
        }
    }
}

/// The stage graph: every legal transition, in evaluation order
///
/// Guards on the same `from` stage are tried top to bottom; the first that
/// holds selects the next stage.
pub const TRANSITIONS: &[(StageName, Guard, StageName)] = &[
    (StageName::Retrieve, Guard::Always, StageName::UpdateKnowledge),
    (
        StageName::UpdateKnowledge,
        Guard::Always,
        StageName::GenerateHypothesis,
    ),
    (
        StageName::GenerateHypothesis,
        Guard::Always,
        StageName::DesignExperiment,
    ),
    (
        StageName::DesignExperiment,
        Guard::Always,
        StageName::SynthesizeCode,
    ),
    (
        StageName::SynthesizeCode,
        Guard::Always,
        StageName::ExecuteSandbox,
    ),
    (StageName::ExecuteSandbox, Guard::Always, StageName::Analyze),
    (StageName::Analyze, Guard::Always, StageName::Review),
    (StageName::Review, Guard::DecisionProceed, StageName::WritePaper),
    (
        StageName::Review,
        Guard::RedesignUnderBudget,
        StageName::IncrementRetry,
    ),
    (
        StageName::Review,
        Guard::RedesignExhausted,
        StageName::Terminated,
    ),
    (
        StageName::IncrementRetry,
        Guard::Always,
        StageName::DesignExperiment,
    ),
    (StageName::WritePaper, Guard::Always, StageName::Terminated),
];

/// Select the next stage from the transition table
///
/// Returns `None` when no guard holds (a stage stalled without a decision)
/// or when `from` is terminal.
#[must_use]
pub fn next_stage(from: StageName, state: &ResearchState) -> Option<StageName> {
    TRANSITIONS
        .iter()
        .find(|(stage, guard, _)| *stage == from && guard.holds(state))
        .map(|(_, _, to)| *to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_core::StageUpdate;

    fn state_with(decision: Option<Decision>, loop_count: u32) -> ResearchState {
        let mut state = ResearchState::new("topic");
        let mut update = StageUpdate::new().with_loop_count(loop_count);
        update.decision = decision;
        state.apply(&update);
        state
    }

    #[test]
    fn linear_chain_is_unconditional() {
        let state = ResearchState::new("topic");
        assert_eq!(
            next_stage(StageName::Retrieve, &state),
            Some(StageName::UpdateKnowledge)
        );
        assert_eq!(
            next_stage(StageName::UpdateKnowledge, &state),
            Some(StageName::GenerateHypothesis)
        );
        assert_eq!(
            next_stage(StageName::SynthesizeCode, &state),
            Some(StageName::ExecuteSandbox)
        );
        assert_eq!(
            next_stage(StageName::Analyze, &state),
            Some(StageName::Review)
        );
    }

    #[test]
    fn review_proceed_goes_to_write_paper() {
        let state = state_with(Some(Decision::Proceed), 0);
        assert_eq!(
            next_stage(StageName::Review, &state),
            Some(StageName::WritePaper)
        );
        // Proceed wins at any budget
        let state = state_with(Some(Decision::Proceed), MAX_LOOPS);
        assert_eq!(
            next_stage(StageName::Review, &state),
            Some(StageName::WritePaper)
        );
    }

    #[test]
    fn review_redesign_under_budget_loops_back() {
        for loop_count in 0..MAX_LOOPS {
            let state = state_with(Some(Decision::Redesign), loop_count);
            assert_eq!(
                next_stage(StageName::Review, &state),
                Some(StageName::IncrementRetry)
            );
        }
        assert_eq!(
            next_stage(StageName::IncrementRetry, &state_with(None, 1)),
            Some(StageName::DesignExperiment)
        );
    }

    #[test]
    fn review_redesign_at_ceiling_terminates() {
        let state = state_with(Some(Decision::Redesign), MAX_LOOPS);
        assert_eq!(
            next_stage(StageName::Review, &state),
            Some(StageName::Terminated)
        );
        let state = state_with(Some(Decision::Redesign), MAX_LOOPS + 1);
        assert_eq!(
            next_stage(StageName::Review, &state),
            Some(StageName::Terminated)
        );
    }

    #[test]
    fn review_without_decision_stalls() {
        let state = ResearchState::new("topic");
        assert_eq!(next_stage(StageName::Review, &state), None);
    }

    #[test]
    fn write_paper_terminates() {
        let state = ResearchState::new("topic");
        assert_eq!(
            next_stage(StageName::WritePaper, &state),
            Some(StageName::Terminated)
        );
    }

    #[test]
    fn terminal_has_no_outgoing_edges() {
        let state = state_with(Some(Decision::Proceed), 0);
        assert_eq!(next_stage(StageName::Terminated, &state), None);
        assert!(StageName::Terminated.is_terminal());
    }

    #[test]
    fn display_names_match_graph_vocabulary() {
        assert_eq!(StageName::Retrieve.to_string(), "retrieve");
        assert_eq!(StageName::UpdateKnowledge.to_string(), "update_knowledge");
        assert_eq!(StageName::IncrementRetry.to_string(), "increment_retry");
        assert_eq!(StageName::Terminated.to_string(), "TERMINATED");
    }
}
