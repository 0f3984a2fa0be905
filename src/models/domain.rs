use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three slots collected from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    GameId,
    Rank,
    Contact,
}

impl Field {
    /// Canonical order used for prompts and missing-field replies
    pub const ALL: [Field; 3] = [Field::GameId, Field::Rank, Field::Contact];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::GameId => "game_id",
            Field::Rank => "rank",
            Field::Contact => "contact",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured payload assembled over one or more conversation turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(alias = "gameId")]
    pub game_id: String,
    pub rank: String,
    pub contact: String,
}

impl CandidateRecord {
    pub fn new(
        game_id: impl Into<String>,
        rank: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            rank: rank.into(),
            contact: contact.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::GameId => &self.game_id,
            Field::Rank => &self.rank,
            Field::Contact => &self.contact,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::GameId => &mut self.game_id,
            Field::Rank => &mut self.rank,
            Field::Contact => &mut self.contact,
        }
    }
}

/// A candidate record as held by the record store
///
/// Internal identifiers never leave the store, so this is the same
/// three-field shape as the candidate.
pub type StoredRecord = CandidateRecord;

/// Result of a conditional insert keyed on `game_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(String),
    AlreadyExists,
}

/// Binary decision produced by the intent classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Yes,
    No,
}

/// Conversation mode, mostly for logging and API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    Idle,
    CollectingInfo,
}

/// Per-user conversation state
///
/// The partial record only exists while collecting. It stays `None` between
/// entering collection and the first extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    Collecting { partial: Option<CandidateRecord> },
}

impl ConversationState {
    pub fn mode(&self) -> ConversationMode {
        match self {
            ConversationState::Idle => ConversationMode::Idle,
            ConversationState::Collecting { .. } => ConversationMode::CollectingInfo,
        }
    }

    pub fn partial(&self) -> Option<&CandidateRecord> {
        match self {
            ConversationState::Idle => None,
            ConversationState::Collecting { partial } => partial.as_ref(),
        }
    }
}
