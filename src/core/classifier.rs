use crate::models::Intent;
use crate::services::CompletionBackend;
use std::sync::Arc;

/// Decides whether a message asks to find teammates
///
/// Only an exact first token of `yes` counts. Empty output, upstream
/// failures and anything else all resolve to `Intent::No`.
pub struct IntentClassifier {
    completion: Arc<dyn CompletionBackend>,
    game: String,
}

impl IntentClassifier {
    pub fn new(completion: Arc<dyn CompletionBackend>, game: impl Into<String>) -> Self {
        Self {
            completion,
            game: game.into(),
        }
    }

    pub async fn classify(&self, text: &str) -> Intent {
        let prompt = intent_prompt(&self.game, text);

        match self.completion.submit(&prompt).await {
            Ok(raw) => {
                let intent = interpret(&raw);
                tracing::debug!("Intent classifier answered {:?} -> {:?}", raw.trim(), intent);
                intent
            }
            Err(e) => {
                tracing::warn!("Intent classification failed, treating as no: {}", e);
                Intent::No
            }
        }
    }
}

/// Map raw model output to an intent
pub fn interpret(raw: &str) -> Intent {
    let normalized = raw.trim().to_lowercase();

    match normalized.split_whitespace().next() {
        Some("yes") => Intent::Yes,
        _ => Intent::No,
    }
}

pub fn intent_prompt(game: &str, text: &str) -> String {
    format!(
        r#"
You are an intent analysis assistant. Determine whether the following user input expresses the intent to play {game} or to find {game} teammates.
Reply with exactly "yes" or "no" (without quotes, no additional text or punctuation).
User input: {text}
"#
    )
}
