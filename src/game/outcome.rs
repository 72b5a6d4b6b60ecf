//! Match Outcome
//!
//! Win/tie/loss from the progress frozen at the Ended transition.

use std::cmp::Ordering;

use serde::{Serialize, Deserialize};

use crate::core::progress::Progress;
use crate::game::arbiter::EndReason;

/// Result from the local player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Higher pass ratio.
    Win,
    /// Equal pass ratio.
    Tie,
    /// Lower pass ratio.
    Loss,
}

impl Outcome {
    /// Compare pass ratios. A side with no tests scores 0%.
    ///
    /// Ratios are compared by cross-multiplying, no floating point.
    pub fn decide(mine: Progress, theirs: Progress) -> Self {
        match compare_ratio(mine, theirs) {
            Ordering::Greater => Outcome::Win,
            Ordering::Equal => Outcome::Tie,
            Ordering::Less => Outcome::Loss,
        }
    }

    /// Banner text.
    pub fn headline(self) -> &'static str {
        match self {
            Outcome::Win => "Victory!",
            Outcome::Tie => "It's a Tie!",
            Outcome::Loss => "Defeated!",
        }
    }
}

fn compare_ratio(a: Progress, b: Progress) -> Ordering {
    // (passed, total) with total 0 scored as 0/1
    let (a_num, a_den) = ratio_terms(a);
    let (b_num, b_den) = ratio_terms(b);
    (a_num * b_den).cmp(&(b_num * a_den))
}

fn ratio_terms(p: Progress) -> (u64, u64) {
    if p.total_tests == 0 {
        (0, 1)
    } else {
        (u64::from(p.tests_passed), u64::from(p.total_tests))
    }
}

/// Frozen result of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Win, tie or loss.
    pub outcome: Outcome,
    /// Which trigger ended the match.
    pub reason: EndReason,
    /// Local progress at the transition.
    pub my_progress: Progress,
    /// Opponent progress at the transition.
    pub opponent_progress: Progress,
    /// Seconds left at the transition.
    pub time_remaining: u32,
}
