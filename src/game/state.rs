//! Match State Definitions
//!
//! Lifecycle state and the per-match records it carries.
//! Question and player records are read-only value data.

use serde::{Serialize, Deserialize};

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Lifecycle of one client session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    /// Not queued, no match.
    #[default]
    Idle,
    /// Waiting for the server to pair us.
    Queuing,
    /// Match running: timer ticks and progress is accepted.
    InGame,
    /// Match over, results frozen.
    Ended,
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchState::Idle => "idle",
            MatchState::Queuing => "queuing",
            MatchState::InGame => "in_game",
            MatchState::Ended => "ended",
        };
        f.write_str(name)
    }
}

// =============================================================================
// PLAYER
// =============================================================================

/// A competitor's identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Account identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Player {
    /// Create a player record.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// QUESTION
// =============================================================================

/// Problem category tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Graph traversal problems.
    Graph,
    /// Tree problems.
    Tree,
    /// Array problems.
    Array,
    /// Untagged.
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

/// Queue preference sent when joining.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmType {
    /// Graph problems only.
    Graph,
    /// Tree problems only.
    Tree,
    /// Array problems only.
    Array,
    /// Any category.
    #[default]
    Random,
}

impl std::str::FromStr for AlgorithmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graph" => Ok(AlgorithmType::Graph),
            "tree" => Ok(AlgorithmType::Tree),
            "array" => Ok(AlgorithmType::Array),
            "random" | "" => Ok(AlgorithmType::Random),
            other => Err(format!("unknown algorithm type: {other}")),
        }
    }
}

/// One test case. Input and output are opaque to this client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Identifier within the question.
    #[serde(rename = "testId")]
    pub test_id: String,
    /// Opaque input payload.
    #[serde(default)]
    pub input: serde_json::Value,
    /// Opaque expected output.
    #[serde(default)]
    pub output: serde_json::Value,
}

/// Question record from the question store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Store identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Title.
    pub title: String,
    /// Problem statement.
    #[serde(default)]
    pub description: String,
    /// Ordered test cases.
    #[serde(rename = "testCases", default)]
    pub test_cases: Vec<TestCase>,
    /// Category tag.
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
}

impl Question {
    /// Number of test cases.
    pub fn test_count(&self) -> u32 {
        u32::try_from(self.test_cases.len()).unwrap_or(u32::MAX)
    }
}

// =============================================================================
// MATCH
// =============================================================================

/// A running or finished head-to-head match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Server-assigned match identifier.
    pub match_id: String,
    /// Shared question.
    pub question: Question,
    /// Opponent, fixed for the match.
    pub opponent: Player,
    /// Tests per side as announced at match start.
    pub total_tests: u32,
    /// Seconds left on the countdown.
    pub time_remaining: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_wire_names() {
        let json = r#"{
            "_id": "q1",
            "title": "BFS",
            "description": "Traverse",
            "testCases": [
                {"testId": "1", "input": {"graph": {}, "startNode": 0}, "output": [0]},
                {"testId": "2", "input": "[1,2]", "output": "3"}
            ],
            "type": "graph"
        }"#;

        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.id.as_deref(), Some("q1"));
        assert_eq!(question.test_count(), 2);
        assert_eq!(question.question_type, QuestionType::Graph);
        assert_eq!(question.test_cases[0].test_id, "1");
    }

    #[test]
    fn test_empty_type_tag_is_unspecified() {
        let json = r#"{"title": "t", "testCases": [], "type": ""}"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.question_type, QuestionType::Unspecified);
        assert!(question.id.is_none());
    }

    #[test]
    fn test_algorithm_type_parse() {
        assert_eq!("Graph".parse::<AlgorithmType>(), Ok(AlgorithmType::Graph));
        assert_eq!("random".parse::<AlgorithmType>(), Ok(AlgorithmType::Random));
        assert!("heap".parse::<AlgorithmType>().is_err());
        assert_eq!(serde_json::to_string(&AlgorithmType::Array).unwrap(), "\"array\"");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(MatchState::Idle.to_string(), "idle");
        assert_eq!(MatchState::InGame.to_string(), "in_game");
    }
}
