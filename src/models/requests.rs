use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Inbound chat message delivered by the messaging transport
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessageRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
}

/// Body of the record service's insert endpoint
///
/// Fields default to empty so that a missing key is reported by validation
/// alongside blank values instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InsertRecordRequest {
    #[validate(custom(function = "not_blank"))]
    #[serde(default, alias = "gameId")]
    pub game_id: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub rank: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub contact: String,
}

/// Query string of the record service's lookup endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankQuery {
    pub rank: Option<String>,
}

/// Single-turn prompt for the completion passthrough
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub prompt: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_request_reports_blank_fields() {
        let req: InsertRecordRequest =
            serde_json::from_str(r#"{"game_id":"A1","rank":"   "}"#).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("rank"));
        assert!(fields.contains_key("contact"));
        assert!(!fields.contains_key("game_id"));
    }

    #[test]
    fn test_message_request_accepts_both_spellings() {
        let a: MessageRequest = serde_json::from_str(r#"{"userId":"u1","text":"hi"}"#).unwrap();
        let b: MessageRequest = serde_json::from_str(r#"{"user_id":"u1","text":"hi"}"#).unwrap();
        assert_eq!(a.user_id, b.user_id);
    }
}
