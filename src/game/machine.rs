//! Match State Machine
//!
//! Owns the lifecycle state and the current match record. Every
//! transition goes through one method here; nothing else writes
//! `MatchState`.
//!
//! ```text
//!   Idle ──join──▶ Queuing ──match_found──▶ InGame ──end──▶ Ended
//!    ▲               │                                        │
//!    └────cancel─────┘                                        │
//!    └───────────────────────new_session──────────────────────┘
//! ```

use tracing::{debug, info};

use crate::game::state::{Match, MatchState};

/// What asked for a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// User asked to join the queue.
    JoinQueue,
    /// User cancelled queuing.
    CancelQueue,
    /// Server paired us.
    MatchFound,
    /// Termination arbiter or server ended the match.
    End,
    /// User asked for a fresh session.
    NewSession,
}

/// Transition errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Trigger not valid from the current state.
    #[error("cannot {trigger:?} while {from}")]
    Invalid {
        /// State the machine was in.
        from: MatchState,
        /// Rejected trigger.
        trigger: Trigger,
    },
}

/// A state change that happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Previous state.
    pub from: MatchState,
    /// New state.
    pub to: MatchState,
}

/// Lifecycle state plus the current match.
#[derive(Clone, Debug, Default)]
pub struct MatchStateMachine {
    state: MatchState,
    current: Option<Match>,
}

impl MatchStateMachine {
    /// Start in Idle with no match.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Current match, if one has been found.
    pub fn current_match(&self) -> Option<&Match> {
        self.current.as_ref()
    }

    /// Check a user trigger without moving.
    pub fn permits(&self, trigger: Trigger) -> Result<(), TransitionError> {
        let from = match trigger {
            Trigger::JoinQueue => MatchState::Idle,
            Trigger::CancelQueue | Trigger::MatchFound => MatchState::Queuing,
            Trigger::End => MatchState::InGame,
            Trigger::NewSession => MatchState::Ended,
        };
        self.require(from, trigger)
    }

    /// Idle → Queuing.
    pub fn join_queue(&mut self) -> Result<Transition, TransitionError> {
        self.require(MatchState::Idle, Trigger::JoinQueue)?;
        Ok(self.move_to(MatchState::Queuing))
    }

    /// Queuing → Idle.
    pub fn cancel_queue(&mut self) -> Result<Transition, TransitionError> {
        self.require(MatchState::Queuing, Trigger::CancelQueue)?;
        Ok(self.move_to(MatchState::Idle))
    }

    /// Queuing → InGame, installing the match record atomically.
    pub fn match_found(&mut self, found: Match) -> Result<Transition, TransitionError> {
        self.require(MatchState::Queuing, Trigger::MatchFound)?;
        info!(
            "Match {} against {} ({} tests, {}s)",
            found.match_id, found.opponent.name, found.total_tests, found.time_remaining
        );
        self.current = Some(found);
        Ok(self.move_to(MatchState::InGame))
    }

    /// InGame → Ended.
    ///
    /// Returns `None` when the match is not running, which makes repeated
    /// end triggers no-ops.
    pub fn end(&mut self) -> Option<Transition> {
        if self.state != MatchState::InGame {
            debug!("End trigger ignored while {}", self.state);
            return None;
        }
        Some(self.move_to(MatchState::Ended))
    }

    /// Ended → Idle, dropping the match record.
    pub fn new_session(&mut self) -> Result<Transition, TransitionError> {
        self.require(MatchState::Ended, Trigger::NewSession)?;
        self.current = None;
        Ok(self.move_to(MatchState::Idle))
    }

    /// Store the countdown value on the match record.
    pub fn set_time_remaining(&mut self, seconds: u32) {
        if let Some(current) = self.current.as_mut() {
            current.time_remaining = seconds;
        }
    }

    fn require(&self, from: MatchState, trigger: Trigger) -> Result<(), TransitionError> {
        if self.state == from {
            Ok(())
        } else {
            Err(TransitionError::Invalid { from: self.state, trigger })
        }
    }

    fn move_to(&mut self, to: MatchState) -> Transition {
        let from = self.state;
        self.state = to;
        info!("Match state {} -> {}", from, to);
        Transition { from, to }
    }
}
