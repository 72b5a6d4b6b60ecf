//! Match Logic Module
//!
//! Lifecycle, termination and outcome. Synchronous, no I/O.
//!
//! ## Module Structure
//!
//! - `state`: Lifecycle enum, match, player and question records
//! - `machine`: The four-state lifecycle and its transitions
//! - `arbiter`: End-of-match conditions
//! - `outcome`: Win/tie/loss from frozen progress
//! - `events`: Notifications published by the session

pub mod state;
pub mod machine;
pub mod arbiter;
pub mod outcome;
pub mod events;

// Re-export key types
pub use state::{MatchState, Match, Player, Question, QuestionType, AlgorithmType, TestCase};
pub use machine::{MatchStateMachine, Transition, TransitionError, Trigger};
pub use arbiter::{ArbiterInput, EndReason, TerminationArbiter};
pub use outcome::{MatchResult, Outcome};
pub use events::{ErrorKind, ErrorSignal, SessionEvent};
