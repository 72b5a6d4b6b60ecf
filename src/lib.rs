//! # Code Duel Client
//!
//! Match lifecycle and progress reconciliation for head-to-head coding
//! duels: two players solve the same problem while the client merges
//! both sides' test results, runs the countdown and decides when and
//! how the match ends.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CODE DUEL CLIENT                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Pure primitives                        │
//! │  ├── timer.rs      - Match countdown                        │
//! │  └── progress.rs   - Per-side progress, high-water marks    │
//! │                                                             │
//! │  game/             - Match rules (synchronous)              │
//! │  ├── state.rs      - Lifecycle, match and question records  │
//! │  ├── machine.rs    - Idle/Queuing/InGame/Ended transitions  │
//! │  ├── arbiter.rs    - End conditions                         │
//! │  ├── outcome.rs    - Win/tie/loss                           │
//! │  └── events.rs     - Session notifications                  │
//! │                                                             │
//! │  network/          - I/O                                    │
//! │  ├── protocol.rs   - Wire messages                          │
//! │  ├── transport.rs  - Duplex channel seam, WebSocket          │
//! │  ├── connection.rs - Connection manager, reconnection       │
//! │  ├── session.rs    - Per-player session context             │
//! │  ├── driver.rs     - Event loop                             │
//! │  └── judge.rs      - Code-execution polling                 │
//! │                                                             │
//! │  config.rs         - Environment configuration              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Displayed progress never decreases within a match, whatever order
//!   reports arrive in.
//! - A match enters Ended exactly once, whichever trigger fires first
//!   (all tests passed, countdown at zero, or the server).
//! - Errors are transient signals; they never change match state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;
pub mod config;

// Re-export commonly used types
pub use core::progress::{Progress, ProgressReconciler, Side};
pub use core::timer::Countdown;
pub use game::state::{AlgorithmType, Match, MatchState, Player, Question};
pub use game::outcome::{MatchResult, Outcome};
pub use game::events::SessionEvent;
pub use network::session::{MatchSession, SessionError};
pub use network::driver::{Command, SessionDriver};
pub use config::{ClientConfig, ConfigError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
