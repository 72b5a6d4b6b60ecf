//! Session Events
//!
//! What the session tells its UI after processing each input. Every
//! handler returns the events it produced, in the order they happened.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::core::progress::ProgressUpdate;
use crate::game::outcome::MatchResult;
use crate::game::state::{MatchState, Player};
use crate::network::protocol::CodeResults;

/// Source of a transient error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Channel could not be established or was lost.
    Connection,
    /// Code execution failed or timed out.
    Execution,
    /// Server sent an `error` event.
    Server,
    /// User intent not valid right now.
    Rejected,
}

/// Transient, user-visible error. Never changes match state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSignal {
    /// Where the error came from.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// When it was raised.
    pub at: DateTime<Utc>,
}

impl ErrorSignal {
    /// Create a signal stamped now.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Notification from the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Lifecycle transition.
    StateChanged {
        /// Previous state.
        from: MatchState,
        /// New state.
        to: MatchState,
    },

    /// Match record installed.
    MatchStarted {
        /// Match identifier.
        match_id: String,
        /// Opponent.
        opponent: Player,
        /// Tests per side.
        total_tests: u32,
        /// Countdown start.
        time_remaining: u32,
    },

    /// One side's progress changed.
    Progress(ProgressUpdate),

    /// Countdown decremented.
    TimerTicked {
        /// Seconds left.
        remaining: u32,
    },

    /// Own execution finished; per-test detail for the results panel.
    ExecutionFinished(CodeResults),

    /// Match over with a frozen result.
    MatchEnded(MatchResult),

    /// Transient error.
    Error(ErrorSignal),
}
