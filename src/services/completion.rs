use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when asking a language model for a completion
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("completion service error: status code {0}")]
    ApiError(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Anything that turns a single-turn prompt into model text
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn submit(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Client for the completion service
///
/// Speaks the `{prompt}` -> `{response}` contract. Non-200 statuses are
/// returned as `CompletionError::ApiError` rather than panicking, so callers
/// can fold them into their own fallback.
pub struct CompletionClient {
    service_url: String,
    client: Client,
}

impl CompletionClient {
    pub fn new(service_url: String, timeout: Duration) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { service_url, client })
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    async fn submit(&self, prompt: &str) -> Result<String, CompletionError> {
        tracing::debug!("Submitting prompt ({} chars) to {}", prompt.len(), self.service_url);

        let response = self
            .client
            .post(&self.service_url)
            .json(&json!({ "prompt": prompt }))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            tracing::warn!("Completion service returned {}", status);
            return Err(CompletionError::ApiError(status.as_u16()));
        }

        let json: Value = response.json().await?;

        // A missing field counts as an empty completion
        Ok(json
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or_default()
            .to_string())
    }
}
