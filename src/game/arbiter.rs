//! Termination Arbiter
//!
//! Decides whether a running match must end. Evaluated synchronously
//! after every tick and every progress update; the state machine's
//! idempotent `end` makes the Ended transition happen once no matter
//! how many triggers agree.

use serde::{Serialize, Deserialize};

use crate::core::progress::{ProgressSnapshot, Side};
use crate::game::state::MatchState;

/// Why a match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "side", rename_all = "snake_case")]
pub enum EndReason {
    /// A side's current count reached its total.
    AllTestsPassed(Side),
    /// Countdown hit zero.
    TimeExpired,
    /// The match server declared the match over.
    ServerEnded,
}

/// Everything the arbiter looks at.
#[derive(Clone, Copy, Debug)]
pub struct ArbiterInput {
    /// Lifecycle state.
    pub state: MatchState,
    /// Both sides' progress.
    pub progress: ProgressSnapshot,
    /// Seconds left.
    pub time_remaining: u32,
}

/// Stateless end-condition check.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminationArbiter;

impl TerminationArbiter {
    /// Create an arbiter.
    pub fn new() -> Self {
        Self
    }

    /// Return the reason the match must end now, if any.
    ///
    /// Completion is checked before the clock, and the local side before
    /// the opponent.
    pub fn evaluate(&self, input: &ArbiterInput) -> Option<EndReason> {
        if input.state != MatchState::InGame {
            return None;
        }

        for side in [Side::Me, Side::Opponent] {
            if input.progress.side(side).current.is_complete() {
                return Some(EndReason::AllTestsPassed(side));
            }
        }

        if input.time_remaining == 0 {
            return Some(EndReason::TimeExpired);
        }

        None
    }
}
