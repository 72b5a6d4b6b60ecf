//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Every frame is a JSON text message `{"event": <name>, "data": <payload>}`.
//! Both directions are closed enums: an unknown event name fails to parse.

use serde::{Serialize, Deserialize};

use crate::core::progress::Progress;
use crate::game::state::{AlgorithmType, Player, Question};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Intents sent from client to server. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the matchmaking queue.
    JoinQueue(JoinQueueRequest),

    /// Leave the matchmaking queue.
    LeaveQueue(LeaveQueueRequest),

    /// Run code against the match question.
    SubmitCode(CodeSubmission),
}

/// Join-queue request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinQueueRequest {
    /// Player's account identifier.
    #[serde(rename = "clerkId")]
    pub player_id: String,
    /// Display name shown to the opponent.
    pub player_name: String,
    /// Preferred problem category.
    pub algorithm_type: AlgorithmType,
}

/// Leave-queue request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveQueueRequest {
    /// Player's account identifier.
    #[serde(rename = "clerkId")]
    pub player_id: String,
}

/// Code submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSubmission {
    /// Source text.
    pub code: String,
    /// Match the submission belongs to.
    pub match_id: String,
    /// Submitting player.
    #[serde(rename = "clerkId")]
    pub player_id: String,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Events sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Socket accepted.
    ConnectionEstablished {
        /// Server-side socket id.
        #[serde(default)]
        sid: String,
    },

    /// Paired with an opponent; the match starts now.
    MatchFound(MatchFoundInfo),

    /// Opponent's latest test counts.
    OpponentProgress(ProgressReport),

    /// Authoritative end of match.
    MatchEnded(MatchEndInfo),

    /// Own execution results.
    CodeResults(CodeResults),

    /// Queue exit acknowledged.
    QueueLeft {
        /// Server note.
        #[serde(default)]
        message: String,
    },

    /// Transient error.
    Error(ServerError),
}

/// Information about a found match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFoundInfo {
    /// Unique match identifier.
    pub match_id: String,
    /// Opponent record.
    pub opponent: Player,
    /// Shared question.
    pub question: Question,
    /// Tests per side.
    pub total_tests: u32,
}

/// Progress counts as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Tests passing.
    pub tests_passed: u32,
    /// Tests in the question.
    pub total_tests: u32,
}

impl From<ProgressReport> for Progress {
    fn from(report: ProgressReport) -> Self {
        Progress::new(report.tests_passed, report.total_tests)
    }
}

/// Match end information. All fields optional; the event alone is enough.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchEndInfo {
    /// Winner's account id (None on a draw).
    #[serde(default)]
    pub winner_id: Option<String>,
    /// Server-side scores.
    #[serde(default)]
    pub final_scores: Option<FinalScores>,
}

/// Server-side scores for both players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScores {
    /// First player in the server's record.
    pub player1: PlayerScore,
    /// Second player in the server's record.
    pub player2: PlayerScore,
}

/// One player's server-side score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    /// Account id.
    pub id: String,
    /// Tests passing.
    #[serde(default)]
    pub tests_passed: u32,
    /// Tests in the question.
    #[serde(default)]
    pub total_tests: u32,
    /// Whether the player finished.
    #[serde(default)]
    pub completed: bool,
}

/// Results of one code execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeResults {
    /// Passing tests.
    pub passed: u32,
    /// Tests run.
    pub total: u32,
    /// Error messages collected during the run.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Per-test detail.
    #[serde(default)]
    pub test_results: Vec<TestResult>,
}

impl CodeResults {
    /// Counts as progress.
    pub fn progress(&self) -> Progress {
        Progress::new(self.passed, self.total)
    }
}

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test case identifier.
    #[serde(alias = "testId")]
    pub test_id: String,
    /// Whether the output matched.
    pub passed: bool,
    /// Runtime error or timeout message.
    #[serde(default)]
    pub error: Option<String>,
    /// Produced output, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

/// Server error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Human-readable message.
    pub message: String,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Wire event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::JoinQueue(_) => "join_queue",
            ClientMessage::LeaveQueue(_) => "leave_queue",
            ClientMessage::SubmitCode(_) => "submit_code",
        }
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Wire event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::ConnectionEstablished { .. } => "connection_established",
            ServerMessage::MatchFound(_) => "match_found",
            ServerMessage::OpponentProgress(_) => "opponent_progress",
            ServerMessage::MatchEnded(_) => "match_ended",
            ServerMessage::CodeResults(_) => "code_results",
            ServerMessage::QueueLeft { .. } => "queue_left",
            ServerMessage::Error(_) => "error",
        }
    }
}
