//! Retry increment stage
//!
//! The only writer of `loop_count`. Strictly increments by one and touches
//! nothing else; it never resets or decrements.

use crate::registry::Stage;
use crate::state_machine::StageName;
use aro_core::{PipelineError, ResearchState, StageUpdate};

/// Increments the redesign cycle counter
#[derive(Debug, Default, Clone, Copy)]
pub struct IncrementRetryStage;

impl IncrementRetryStage {
    /// Create the stage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Stage for IncrementRetryStage {
    fn name(&self) -> StageName {
        StageName::IncrementRetry
    }

    async fn run(&self, state: &ResearchState) -> Result<StageUpdate, PipelineError> {
        let next = state.loop_count + 1;
        tracing::info!(loop_count = next, "entering redesign cycle");
        Ok(StageUpdate::new().with_loop_count(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn increments_by_exactly_one() {
        let stage = IncrementRetryStage::new();
        let mut state = ResearchState::new("topic");

        for expected in 1..=3 {
            let update = stage.run(&state).await.unwrap();
            assert_eq!(update.loop_count, Some(expected));
            // Nothing else is touched
            assert_eq!(
                update,
                StageUpdate::new().with_loop_count(expected)
            );
            state.apply(&update);
        }
        assert_eq!(state.loop_count, 3);
    }
}
