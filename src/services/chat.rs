use crate::services::completion::{CompletionBackend, CompletionError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Chat-completion vendor client (Azure-style deployments API)
///
/// Sends every prompt as a one-message conversation and returns the
/// content of the first choice.
pub struct ChatCompletionClient {
    base_url: String,
    model_name: String,
    api_version: String,
    access_token: String,
    client: Client,
}

impl ChatCompletionClient {
    pub fn new(
        base_url: String,
        model_name: String,
        api_version: String,
        access_token: String,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            model_name,
            api_version,
            access_token,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/deployments/{}/chat/completions/?api-version={}",
            self.base_url.trim_end_matches('/'),
            self.model_name,
            urlencoding::encode(&self.api_version)
        )
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionClient {
    async fn submit(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = self.endpoint();

        tracing::debug!("Calling chat deployment {} ({} chars)", self.model_name, prompt.len());

        let payload = json!({
            "messages": [{ "role": "user", "content": prompt }]
        });

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.access_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Chat deployment {} returned {}: {}", self.model_name, status, body);
            return Err(CompletionError::ApiError(status.as_u16()));
        }

        let json: Value = response.json().await?;

        json.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(str::to_string)
            .ok_or_else(|| CompletionError::InvalidResponse("Missing choices[0].message.content".into()))
    }
}
