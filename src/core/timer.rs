//! Match Countdown
//!
//! One wall-clock countdown per session, advanced once per second by the
//! driver. The countdown only counts; deciding what expiry means is left
//! to the termination arbiter.

use serde::{Serialize, Deserialize};

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Countdown is not running (no match, or frozen).
    Idle,
    /// Decremented, time remains.
    Ticked {
        /// Seconds left after this tick.
        remaining: u32,
    },
    /// This tick brought the countdown to zero.
    Expired,
}

/// Seconds-resolution countdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    initial: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    /// Create a stopped countdown showing `initial_secs`.
    pub fn new(initial_secs: u32) -> Self {
        Self {
            initial: initial_secs,
            remaining: initial_secs,
            running: false,
        }
    }

    /// Restart from the initial value.
    pub fn start(&mut self) {
        self.remaining = self.initial;
        self.running = self.remaining > 0;
    }

    /// Stop counting, keeping the current value.
    pub fn freeze(&mut self) {
        self.running = false;
    }

    /// Stop and show the initial value again.
    pub fn clear(&mut self) {
        self.remaining = self.initial;
        self.running = false;
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Ticked { remaining: self.remaining }
        }
    }

    /// Seconds left.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Seconds the countdown restarts from.
    #[inline]
    pub fn initial(&self) -> u32 {
        self.initial
    }

    /// Whether ticks currently decrement.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Format seconds as `MM:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
