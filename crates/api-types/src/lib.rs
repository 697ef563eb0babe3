//! Shared request/response types used by API-facing crates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
}

impl HealthCheckResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: i32,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub contestant_id: String,
    pub question_id: i32,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub submission_id: String,
    pub accepted: bool,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub query: String,
}

/// Rows of a previewed query, each an object keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub question_id: i32,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub contestant_id: String,
    pub answered: Vec<ProgressEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub contestant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub contestant_id: String,
    pub total_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub contestant_id: String,
    pub total_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_ok_payload() {
        let response = HealthCheckResponse::ok();
        assert_eq!(response.status, "ok");
    }

    #[test]
    fn submit_request_uses_snake_case_fields() {
        let request: SubmitRequest = serde_json::from_str(
            r#"{"contestant_id":"alice","question_id":7,"query":"SELECT 1"}"#,
        )
        .expect("deserialize submit request");

        assert_eq!(request.contestant_id, "alice");
        assert_eq!(request.question_id, 7);
        assert_eq!(request.query, "SELECT 1");
    }

    #[test]
    fn leaderboard_serializes_entries_in_order() {
        let response = LeaderboardResponse {
            entries: vec![
                LeaderboardEntry {
                    rank: 1,
                    contestant_id: "a".to_string(),
                    total_score: 10,
                },
                LeaderboardEntry {
                    rank: 2,
                    contestant_id: "b".to_string(),
                    total_score: 10,
                },
            ],
        };

        let json = serde_json::to_value(&response).expect("serialize leaderboard");
        assert_eq!(json["entries"][0]["contestant_id"], "a");
        assert_eq!(json["entries"][1]["rank"], 2);
    }
}
