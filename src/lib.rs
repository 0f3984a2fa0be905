//! Squad Finder - conversational teammate matchmaking
//!
//! Collects a player's game id, rank and contact over one or more chat turns
//! with the help of a language model, stores the finished record and answers
//! with other players of the same rank.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MachineOptions, Reply, ReplyKind, SessionStore, SlotFillingMachine};
pub use models::{CandidateRecord, ConversationState, Field, InsertOutcome, Intent, StoredRecord};
pub use services::{CompletionBackend, RecordStore};
