//! Batch state machine.
//!
//! Aggregating → LookingUp → Classifying → Finalizing → Done, with a direct
//! Aggregating → Done exit when there is nothing to classify.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Aggregating,
    LookingUp,
    Classifying,
    Finalizing,
    Done,
}

impl BatchPhase {
    /// Stable lowercase name, used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aggregating => "aggregating",
            Self::LookingUp => "looking_up",
            Self::Classifying => "classifying",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
        }
    }

    /// Whether `next` is a legal successor of this phase.
    pub fn can_advance_to(self, next: BatchPhase) -> bool {
        matches!(
            (self, next),
            (Self::Aggregating, Self::LookingUp)
                | (Self::Aggregating, Self::Done)
                | (Self::LookingUp, Self::Classifying)
                | (Self::Classifying, Self::Finalizing)
                | (Self::Finalizing, Self::Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Done
    }
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: BatchPhase,
    pub to: BatchPhase,
    pub at: DateTime<Utc>,
}

/// Phase tracking for one batch.
#[derive(Debug, Clone)]
pub struct BatchState {
    batch_id: String,
    phase: BatchPhase,
    transitions: Vec<PhaseTransition>,
}

impl BatchState {
    pub fn new(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            phase: BatchPhase::Aggregating,
            transitions: Vec::new(),
        }
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn transitions(&self) -> &[PhaseTransition] {
        &self.transitions
    }

    /// Move to `next`. An illegal move is logged and ignored.
    pub fn advance(&mut self, next: BatchPhase) -> bool {
        if !self.phase.can_advance_to(next) {
            warn!(
                batch_id = %self.batch_id,
                from = %self.phase,
                to = %next,
                "ignoring illegal batch phase transition"
            );
            return false;
        }
        debug!(batch_id = %self.batch_id, from = %self.phase, to = %next, "batch phase");
        self.transitions.push(PhaseTransition {
            from: self.phase,
            to: next,
            at: Utc::now(),
        });
        self.phase = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_reaches_done() {
        let mut state = BatchState::new("b1");
        for next in [
            BatchPhase::LookingUp,
            BatchPhase::Classifying,
            BatchPhase::Finalizing,
            BatchPhase::Done,
        ] {
            assert!(state.advance(next));
        }
        assert!(state.phase().is_terminal());
        assert_eq!(state.transitions().len(), 4);
    }

    #[test]
    fn early_exit_from_aggregating() {
        let mut state = BatchState::new("b1");
        assert!(state.advance(BatchPhase::Done));
        assert_eq!(state.transitions()[0].from, BatchPhase::Aggregating);
    }

    #[test]
    fn skipping_phases_is_rejected() {
        let mut state = BatchState::new("b1");
        assert!(!state.advance(BatchPhase::Classifying));
        assert_eq!(state.phase(), BatchPhase::Aggregating);

        state.advance(BatchPhase::Done);
        assert!(!state.advance(BatchPhase::LookingUp));
        assert_eq!(state.phase(), BatchPhase::Done);
    }
}
