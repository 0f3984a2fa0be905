use crate::core::classifier::IntentClassifier;
use crate::core::extraction::{parse_extraction, ExtractionError, ExtractionService};
use crate::core::slots::{merge, missing_fields};
use crate::models::{CandidateRecord, ConversationState, Field, InsertOutcome, Intent, StoredRecord};
use crate::services::{CompletionBackend, RecordStore, StoreError};
use std::sync::Arc;

pub const PARSE_FAILURE_REPLY: &str =
    "Unable to parse your information. Please ensure the format is correct and try again.";
pub const UNAVAILABLE_REPLY: &str =
    "Sorry, the assistant is temporarily unavailable. Please try again in a moment.";
pub const NO_MATCHES_REPLY: &str = "No users with the same rank were found.";
pub const LOOKUP_FAILED_REPLY: &str =
    "Your information was saved, but looking up players with the same rank failed. Please try again later.";

/// Which transition produced a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyKind {
    /// Idle -> Collecting
    CollectionStarted,
    /// Idle self-loop, model answered freely
    FreeForm,
    /// Collecting self-loop, some slots still empty
    MissingFields(Vec<Field>),
    /// Record stored, players with the same rank found
    Matches(Vec<StoredRecord>),
    /// Record stored, nobody else at that rank
    NoMatches,
    /// Record stored, lookup failed
    LookupFailed,
    /// Insert failed
    PersistenceFailed(String),
    /// Extraction output was not the expected JSON
    ParseFailure,
    /// Completion backend unreachable
    Unavailable,
}

/// Text sent back to the user plus what produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

impl Reply {
    fn collection_started(game: &str) -> Self {
        Self {
            kind: ReplyKind::CollectionStarted,
            text: format!(
                "I can help you find other {} players. Please provide your Game ID, Rank, and Contact Information.",
                game
            ),
        }
    }

    fn free_form(text: String) -> Self {
        Self {
            kind: ReplyKind::FreeForm,
            text,
        }
    }

    fn missing(fields: Vec<Field>, first_pass: bool) -> Self {
        let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
        let text = if first_pass {
            format!(
                "The following fields are missing from your input, please provide them: {}",
                names.join(", ")
            )
        } else {
            format!(
                "The following fields are still missing, please continue to provide: {}",
                names.join(", ")
            )
        };

        Self {
            kind: ReplyKind::MissingFields(fields),
            text,
        }
    }

    fn matches(records: Vec<StoredRecord>) -> Self {
        if records.is_empty() {
            return Self {
                kind: ReplyKind::NoMatches,
                text: NO_MATCHES_REPLY.to_string(),
            };
        }

        let mut text = String::from("Found the following users with the same rank:\n");
        for r in &records {
            text.push_str(&format!(
                "Game ID: {}, Rank: {}, Contact: {}\n",
                r.game_id, r.rank, r.contact
            ));
        }

        Self {
            kind: ReplyKind::Matches(records),
            text,
        }
    }

    fn persistence_failed(error: &StoreError) -> Self {
        Self {
            kind: ReplyKind::PersistenceFailed(error.to_string()),
            text: format!("Error inserting data into the database: {}", error),
        }
    }

    fn fixed(kind: ReplyKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

/// Behavior switches for the state machine
#[derive(Debug, Clone)]
pub struct MachineOptions {
    /// Game named in the intent prompt
    pub game: String,
    /// Keep the collected record and stay collecting when the insert fails
    pub retain_partial_on_failure: bool,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            game: "csgo".to_string(),
            retain_partial_on_failure: false,
        }
    }
}

/// Multi-turn slot-filling state machine
///
/// # Transitions
/// 1. Idle + intent yes -> Collecting (no partial record yet)
/// 2. Idle + intent no -> Idle, message answered by the model
/// 3. Collecting + extraction with gaps -> Collecting, merged partial kept
/// 4. Collecting + complete record -> Idle after insert and rank lookup
/// 5. Collecting + unparseable extraction -> Collecting, partial untouched
///
/// The state is passed in per turn; the machine itself holds none.
pub struct SlotFillingMachine {
    completion: Arc<dyn CompletionBackend>,
    classifier: IntentClassifier,
    extraction: ExtractionService,
    records: Arc<dyn RecordStore>,
    options: MachineOptions,
}

impl SlotFillingMachine {
    pub fn new(
        completion: Arc<dyn CompletionBackend>,
        records: Arc<dyn RecordStore>,
        options: MachineOptions,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(completion.clone(), options.game.clone()),
            extraction: ExtractionService::new(completion.clone()),
            completion,
            records,
            options,
        }
    }

    /// Process one inbound message and produce exactly one reply
    pub async fn handle(&self, state: &mut ConversationState, text: &str) -> Reply {
        let text = text.trim();

        if matches!(state, ConversationState::Idle) {
            self.handle_idle(state, text).await
        } else {
            self.handle_collecting(state, text).await
        }
    }

    async fn handle_idle(&self, state: &mut ConversationState, text: &str) -> Reply {
        match self.classifier.classify(text).await {
            Intent::Yes => {
                tracing::info!("Intent detected, collecting player info");
                *state = ConversationState::Collecting { partial: None };
                Reply::collection_started(&self.options.game)
            }
            Intent::No => match self.completion.submit(text).await {
                Ok(answer) => Reply::free_form(answer),
                Err(e) => {
                    tracing::warn!("Free-form completion failed: {}", e);
                    Reply::fixed(ReplyKind::Unavailable, UNAVAILABLE_REPLY)
                }
            },
        }
    }

    async fn handle_collecting(&self, state: &mut ConversationState, text: &str) -> Reply {
        let existing = state.partial().cloned();

        let raw = match &existing {
            None => self.extraction.extract_first(text).await,
            Some(partial) => self.extraction.extract_update(partial, text).await,
        };

        let extracted = match raw.and_then(|raw| parse_extraction(&raw)) {
            Ok(record) => record,
            Err(ExtractionError::Malformed(reason)) => {
                tracing::warn!("Discarding extraction output: {}", reason);
                return Reply::fixed(ReplyKind::ParseFailure, PARSE_FAILURE_REPLY);
            }
            Err(ExtractionError::Upstream(e)) => {
                tracing::warn!("Extraction request failed: {}", e);
                return Reply::fixed(ReplyKind::Unavailable, UNAVAILABLE_REPLY);
            }
        };

        let first_pass = existing.is_none();
        let mut merged = existing.unwrap_or_default();
        merge(&mut merged, &extracted);

        let missing = missing_fields(&merged);
        if !missing.is_empty() {
            tracing::debug!("Still missing {:?}", missing);
            *state = ConversationState::Collecting {
                partial: Some(merged),
            };
            return Reply::missing(missing, first_pass);
        }

        self.finalize(state, merged).await
    }

    async fn finalize(&self, state: &mut ConversationState, record: CandidateRecord) -> Reply {
        match self.records.insert(&record).await {
            Ok(outcome) => {
                match &outcome {
                    InsertOutcome::Inserted(id) => {
                        tracing::info!("Stored record for {} ({})", record.game_id, id)
                    }
                    InsertOutcome::AlreadyExists => {
                        tracing::info!("Record for {} already stored", record.game_id)
                    }
                }
                *state = ConversationState::Idle;

                match self.records.query_by_rank(&record.rank).await {
                    Ok(found) => Reply::matches(found),
                    Err(e) => {
                        tracing::error!("Rank lookup for {} failed: {}", record.rank, e);
                        Reply::fixed(ReplyKind::LookupFailed, LOOKUP_FAILED_REPLY)
                    }
                }
            }
            Err(e) => {
                tracing::error!("Failed to store record for {}: {}", record.game_id, e);
                *state = if self.options.retain_partial_on_failure {
                    ConversationState::Collecting {
                        partial: Some(record),
                    }
                } else {
                    ConversationState::Idle
                };
                Reply::persistence_failed(&e)
            }
        }
    }
}
