use crate::core::slots::missing_fields;
use crate::models::{CandidateRecord, InsertOutcome, StoredRecord};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when talking to the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{0}")]
    ApiError(String),

    #[error("{0}")]
    Validation(String),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Insert-if-absent and lookup-by-rank over stored candidate records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store the record unless its `game_id` is already present.
    ///
    /// An existing record is never overwritten.
    async fn insert(&self, record: &CandidateRecord) -> Result<InsertOutcome, StoreError>;

    /// All records whose rank equals `rank` exactly, oldest first
    async fn query_by_rank(&self, rank: &str) -> Result<Vec<StoredRecord>, StoreError>;

    async fn health_check(&self) -> bool {
        true
    }
}

/// Reject records with blank fields before they reach storage
pub fn validate_record(record: &CandidateRecord) -> Result<(), StoreError> {
    let missing = missing_fields(record);
    if missing.is_empty() {
        return Ok(());
    }

    let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
    Err(StoreError::Validation(format!("Missing fields: {}", names.join(", "))))
}

/// Client for a remote record service
///
/// Status signaling: 201 created, 200 duplicate, 400 validation, anything
/// else is an upstream failure.
pub struct HttpRecordGateway {
    base_url: String,
    client: Client,
}

impl HttpRecordGateway {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl RecordStore for HttpRecordGateway {
    async fn insert(&self, record: &CandidateRecord) -> Result<InsertOutcome, StoreError> {
        let url = self.url("insert");

        tracing::debug!("Inserting record {} via {}", record.game_id, url);

        let response = self.client.post(&url).json(record).send().await?;
        let status = response.status().as_u16();

        match status {
            201 => {
                let json: Value = response.json().await?;
                let id = json
                    .get("inserted_id")
                    .and_then(|id| id.as_str())
                    .ok_or_else(|| StoreError::InvalidResponse("Missing inserted_id".into()))?;
                Ok(InsertOutcome::Inserted(id.to_string()))
            }
            200 => Ok(InsertOutcome::AlreadyExists),
            400 => {
                let json: Value = response.json().await.unwrap_or(Value::Null);
                let message = json
                    .get("error")
                    .and_then(|e| e.as_str())
                    .unwrap_or("Invalid record")
                    .to_string();
                Err(StoreError::Validation(message))
            }
            _ => Err(StoreError::ApiError(format!(
                "DB insert error, status code {}",
                status
            ))),
        }
    }

    async fn query_by_rank(&self, rank: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let url = format!("{}?rank={}", self.url("query"), urlencoding::encode(rank));

        let response = self.client.get(&url).send().await?;

        if response.status().as_u16() != 200 {
            return Err(StoreError::ApiError(format!(
                "DB query error, status code {}",
                response.status().as_u16()
            )));
        }

        let json: Value = response.json().await?;

        let results = json
            .get("results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| StoreError::InvalidResponse("Missing results array".into()))?;

        let records = results
            .iter()
            .map(|doc| {
                serde_json::from_value::<StoredRecord>(doc.clone()).map_err(|e| {
                    tracing::warn!("Malformed record in rank {} results: {}", rank, e);
                    StoreError::InvalidResponse(format!("Malformed record: {}", e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Rank {} matched {} records", rank, records.len());

        Ok(records)
    }

    async fn health_check(&self) -> bool {
        // The record service has no health route; reachability is enough
        self.client.get(self.url("query")).send().await.is_ok()
    }
}

/// Process-local record store
pub struct MemoryRecordStore {
    records: RwLock<Vec<(String, StoredRecord)>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get(&self, game_id: &str) -> Option<StoredRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|(_, r)| r.game_id == game_id)
            .map(|(_, r)| r.clone())
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: &CandidateRecord) -> Result<InsertOutcome, StoreError> {
        validate_record(record)?;

        let mut records = self.records.write().await;
        if records.iter().any(|(_, r)| r.game_id == record.game_id) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        let id = uuid::Uuid::new_v4().to_string();
        records.push((id.clone(), record.clone()));

        Ok(InsertOutcome::Inserted(id))
    }

    async fn query_by_rank(&self, rank: &str) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|(_, r)| r.rank == rank)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_insert_keeps_original() {
        let store = MemoryRecordStore::new();

        let first = store.insert(&CandidateRecord::new("A1", "Gold", "tg:@a")).await.unwrap();
        assert!(matches!(first, InsertOutcome::Inserted(_)));

        let second = store.insert(&CandidateRecord::new("A1", "Silver", "tg:@b")).await.unwrap();
        assert_eq!(second, InsertOutcome::AlreadyExists);

        assert_eq!(store.len().await, 1);
        let stored = store.get("A1").await.unwrap();
        assert_eq!(stored.rank, "Gold");
        assert_eq!(stored.contact, "tg:@a");
    }

    #[tokio::test]
    async fn test_query_by_rank_is_exact() {
        let store = MemoryRecordStore::new();
        store.insert(&CandidateRecord::new("A1", "Gold", "a")).await.unwrap();
        store.insert(&CandidateRecord::new("A2", "gold", "b")).await.unwrap();
        store.insert(&CandidateRecord::new("A3", "Gold", "c")).await.unwrap();

        let gold = store.query_by_rank("Gold").await.unwrap();
        let ids: Vec<&str> = gold.iter().map(|r| r.game_id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "A3"]);

        assert!(store.query_by_rank("Diamond").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_fields_are_rejected() {
        let store = MemoryRecordStore::new();
        let err = store
            .insert(&CandidateRecord::new("A1", " ", ""))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Missing fields: rank, contact");
        assert!(store.is_empty().await);
    }
}
