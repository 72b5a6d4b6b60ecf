//! Core primitives.
//!
//! Plain data and pure logic with no I/O: the countdown and the
//! progress reconciler. Everything here is synchronous and testable
//! without a runtime.

pub mod progress;
pub mod timer;

// Re-export core types
pub use progress::{Progress, ProgressReconciler, ProgressSnapshot, ProgressUpdate, Side, SideProgress};
pub use timer::{Countdown, TickOutcome, format_clock};
