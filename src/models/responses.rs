use serde::{Deserialize, Serialize};
use crate::models::domain::{ConversationMode, StoredRecord};

/// Reply to an inbound chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub reply: String,
    pub mode: ConversationMode,
}

/// Insert succeeded (201)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertResponse {
    pub message: String,
    pub inserted_id: String,
}

/// Insert skipped because the `game_id` is already stored (200)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateResponse {
    pub message: String,
    pub data: StoredRecord,
}

/// Records sharing the requested rank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<StoredRecord>,
}

/// Completion passthrough result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub response: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code,
        }
    }
}
