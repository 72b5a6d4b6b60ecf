//! Progress Reconciliation
//!
//! Merges locally-produced and remotely-reported test counts into a
//! per-side display value that never moves backwards within a match.
//!
//! Raw counts are kept alongside the display mark: termination reasons
//! about the *current* count, the UI about the best count seen so far.

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

// =============================================================================
// PROGRESS
// =============================================================================

/// A side's passed-test count against the question's total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Progress {
    /// Tests passing in the latest report.
    pub tests_passed: u32,
    /// Tests in the active question.
    pub total_tests: u32,
}

impl Progress {
    /// Create a progress value.
    pub const fn new(tests_passed: u32, total_tests: u32) -> Self {
        Self { tests_passed, total_tests }
    }

    /// Fresh progress for a question with `total_tests` cases.
    pub const fn empty(total_tests: u32) -> Self {
        Self::new(0, total_tests)
    }

    /// Rounded percentage of passing tests (0 when there are no tests).
    ///
    /// Rounds half up using integer arithmetic only.
    pub fn percentage(&self) -> u8 {
        if self.total_tests == 0 {
            return 0;
        }
        let passed = u64::from(self.tests_passed.min(self.total_tests));
        let total = u64::from(self.total_tests);
        ((passed * 200 + total) / (total * 2)) as u8
    }

    /// Every test passes and there is at least one test.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.total_tests > 0 && self.tests_passed == self.total_tests
    }

    /// Pull `tests_passed` back within `total_tests`.
    ///
    /// Returns `true` if the report had to be clamped.
    fn clamp(&mut self) -> bool {
        if self.total_tests > 0 && self.tests_passed > self.total_tests {
            self.tests_passed = self.total_tests;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.tests_passed, self.total_tests)
    }
}

/// Which competitor a progress report belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The local player.
    Me,
    /// The remote opponent.
    Opponent,
}

// =============================================================================
// PER-SIDE TRACKING
// =============================================================================

/// Raw progress plus the display high-water mark for one side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideProgress {
    /// Latest report, as delivered.
    pub current: Progress,
    /// Highest percentage shown so far.
    pub high_water: u8,
}

impl SideProgress {
    fn reset(total_tests: u32) -> Self {
        Self {
            current: Progress::empty(total_tests),
            high_water: 0,
        }
    }

    /// Percentage to surface to the player.
    #[inline]
    pub fn displayed(&self) -> u8 {
        self.high_water
    }
}

/// Result of applying one report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Side the report was applied to.
    pub side: Side,
    /// Raw progress after the update.
    pub current: Progress,
    /// Percentage of this report alone.
    pub percentage: u8,
    /// Display value after max-merge.
    pub displayed: u8,
    /// The report was below the display mark (late or partial re-run).
    pub regressed: bool,
}

/// Both sides at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Local player.
    pub me: SideProgress,
    /// Opponent.
    pub opponent: SideProgress,
}

impl ProgressSnapshot {
    /// Progress for one side.
    pub fn side(&self, side: Side) -> &SideProgress {
        match side {
            Side::Me => &self.me,
            Side::Opponent => &self.opponent,
        }
    }
}

// =============================================================================
// RECONCILER
// =============================================================================

/// Owns both sides' progress and high-water marks.
#[derive(Clone, Debug, Default)]
pub struct ProgressReconciler {
    me: SideProgress,
    opponent: SideProgress,
}

impl ProgressReconciler {
    /// Create an empty reconciler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a match: both sides at `{0, total_tests}`, marks at zero.
    pub fn reset(&mut self, total_tests: u32) {
        self.me = SideProgress::reset(total_tests);
        self.opponent = SideProgress::reset(total_tests);
    }

    /// Forget everything (session reset).
    pub fn clear(&mut self) {
        self.reset(0);
    }

    /// Apply a report to one side, max-merging its display mark.
    pub fn apply(&mut self, side: Side, mut report: Progress) -> ProgressUpdate {
        if report.clamp() {
            warn!("{:?} reported more passed tests than exist, clamped to {}", side, report);
        }

        let slot = self.side_mut(side);
        let percentage = report.percentage();
        let regressed = percentage < slot.high_water;

        slot.current = report;
        slot.high_water = slot.high_water.max(percentage);

        if regressed {
            debug!(
                "{:?} progress {} ({}%) below display mark {}%",
                side, report, percentage, slot.high_water
            );
        }

        ProgressUpdate {
            side,
            current: slot.current,
            percentage,
            displayed: slot.high_water,
            regressed,
        }
    }

    /// Latest raw progress for a side.
    pub fn current(&self, side: Side) -> Progress {
        self.side_ref(side).current
    }

    /// Display percentage for a side.
    pub fn displayed(&self, side: Side) -> u8 {
        self.side_ref(side).high_water
    }

    /// Copy of both sides.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            me: self.me,
            opponent: self.opponent,
        }
    }

    fn side_ref(&self, side: Side) -> &SideProgress {
        match side {
            Side::Me => &self.me,
            Side::Opponent => &self.opponent,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideProgress {
        match side {
            Side::Me => &mut self.me,
            Side::Opponent => &mut self.opponent,
        }
    }
}
