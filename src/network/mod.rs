//! Network Layer
//!
//! Channel to the match server, the per-player session and the event
//! loop that drives it. All match rules live in `game/`; this layer
//! feeds them inputs and forwards what they produce.

pub mod protocol;
pub mod transport;
pub mod connection;
pub mod session;
pub mod driver;
pub mod judge;

pub use protocol::{
    ClientMessage, ServerMessage, CodeResults, TestResult, MatchFoundInfo, MatchEndInfo, ProgressReport,
};
pub use transport::{Connector, Transport, ConnectionError, WebSocketConnector, WebSocketTransport};
pub use connection::{
    ConnectionManager, ConnectionConfig, ConnectionStatus, ChannelEvent, Outbound, ReconnectPolicy,
};
pub use session::{MatchSession, SessionConfig, SessionError, SessionSnapshot};
pub use driver::{Command, SessionDriver, TICK};
pub use judge::{JudgeService, JudgeError, PollPolicy, SubmissionStatus, run_submission, spawn_submission};
