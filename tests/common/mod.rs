// Shared test doubles for the conversation tests
#![allow(dead_code)]

use async_trait::async_trait;
use squad_finder::models::{CandidateRecord, InsertOutcome, StoredRecord};
use squad_finder::services::{CompletionBackend, CompletionError, RecordStore, StoreError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Completion backend that plays back canned answers in order
///
/// `Err(status)` entries simulate an upstream failure with that status.
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, u16>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn then(self, reply: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
        self
    }

    pub fn then_fail(self, status: u16) -> Self {
        self.replies.lock().unwrap().push_back(Err(status));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedCompletion {
    async fn submit(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(status)) => Err(CompletionError::ApiError(status)),
            None => panic!("no scripted completion left for prompt: {}", prompt),
        }
    }
}

/// Record store whose inserts always fail
pub struct BrokenStore;

#[async_trait]
impl RecordStore for BrokenStore {
    async fn insert(&self, _record: &CandidateRecord) -> Result<InsertOutcome, StoreError> {
        Err(StoreError::ApiError("DB insert error, status code 500".to_string()))
    }

    async fn query_by_rank(&self, _rank: &str) -> Result<Vec<StoredRecord>, StoreError> {
        Err(StoreError::ApiError("DB query error, status code 500".to_string()))
    }
}

/// Record store that accepts inserts but cannot be queried
pub struct WriteOnlyStore;

#[async_trait]
impl RecordStore for WriteOnlyStore {
    async fn insert(&self, _record: &CandidateRecord) -> Result<InsertOutcome, StoreError> {
        Ok(InsertOutcome::Inserted("1".to_string()))
    }

    async fn query_by_rank(&self, _rank: &str) -> Result<Vec<StoredRecord>, StoreError> {
        Err(StoreError::ApiError("DB query error, status code 503".to_string()))
    }
}

pub fn extraction(game_id: &str, rank: &str, contact: &str) -> String {
    serde_json::json!({ "game_id": game_id, "rank": rank, "contact": contact }).to_string()
}
