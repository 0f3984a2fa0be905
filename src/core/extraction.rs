use crate::models::CandidateRecord;
use crate::services::{CompletionBackend, CompletionError};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while extracting slots from a message
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction request failed: {0}")]
    Upstream(#[from] CompletionError),

    #[error("malformed extraction output: {0}")]
    Malformed(String),
}

/// Exact shape the model must answer with
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractionPayload {
    #[serde(alias = "gameId")]
    game_id: String,
    rank: String,
    contact: String,
}

/// Prompts the model for the three slots as JSON
pub struct ExtractionService {
    completion: Arc<dyn CompletionBackend>,
}

impl ExtractionService {
    pub fn new(completion: Arc<dyn CompletionBackend>) -> Self {
        Self { completion }
    }

    /// First pass over a message when nothing is known yet
    pub async fn extract_first(&self, text: &str) -> Result<String, ExtractionError> {
        let raw = self.completion.submit(&first_prompt(text)).await?;
        Ok(raw)
    }

    /// Follow-up pass that keeps what the user already provided
    pub async fn extract_update(
        &self,
        existing: &CandidateRecord,
        text: &str,
    ) -> Result<String, ExtractionError> {
        let raw = self.completion.submit(&update_prompt(existing, text)).await?;
        Ok(raw)
    }
}

/// Accept model output only if it is a JSON object with exactly the three
/// string-typed keys. Values are trimmed.
pub fn parse_extraction(raw: &str) -> Result<CandidateRecord, ExtractionError> {
    let payload: ExtractionPayload =
        serde_json::from_str(raw).map_err(|e| ExtractionError::Malformed(e.to_string()))?;

    Ok(CandidateRecord {
        game_id: payload.game_id.trim().to_string(),
        rank: payload.rank.trim().to_string(),
        contact: payload.contact.trim().to_string(),
    })
}

pub fn first_prompt(text: &str) -> String {
    format!(
        r#"
You are an information extraction assistant. Please extract the following information from the user input and output ONLY JSON with no extra text:
{{
    "game_id": "<Game ID>",
    "rank": "<Rank>",
    "contact": "<Contact Information>"
}}
If the user input is insufficient, leave the corresponding field as an empty string.
User input: {text}
Output ONLY JSON with no explanations or extra text.
"#
    )
}

pub fn update_prompt(existing: &CandidateRecord, text: &str) -> String {
    let known = json!({
        "game_id": existing.game_id,
        "rank": existing.rank,
        "contact": existing.contact,
    });

    format!(
        r#"
You are an information extraction assistant. The user has already provided the following partial information (in JSON):
{known}

User new input: {text}

Please update and complete the missing fields using the following JSON format, and output ONLY JSON with no extra explanation or text:
{{
    "game_id": "<Game ID>",
    "rank": "<Rank>",
    "contact": "<Contact Information>"
}}
If no new information is provided for a field, retain the original value.
Output ONLY JSON with no additional content.
"#
    )
}
