use crate::models::{CandidateRecord, InsertOutcome, StoredRecord};
use crate::services::records::{validate_record, RecordStore, StoreError};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

/// PostgreSQL-backed record store
///
/// Uniqueness of `game_id` is enforced by the table itself, so concurrent
/// inserts of the same id resolve to exactly one stored row.
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL record store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(30)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn insert(&self, record: &CandidateRecord) -> Result<InsertOutcome, StoreError> {
        validate_record(record)?;

        let query = r#"
            INSERT INTO candidate_records (id, game_id, rank, contact, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (game_id) DO NOTHING
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(uuid::Uuid::new_v4())
            .bind(&record.game_id)
            .bind(&record.rank)
            .bind(&record.contact)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let id: uuid::Uuid = row.get("id");
                tracing::debug!("Stored record {} as {}", record.game_id, id);
                Ok(InsertOutcome::Inserted(id.to_string()))
            }
            None => {
                tracing::debug!("Record {} already stored, skipping", record.game_id);
                Ok(InsertOutcome::AlreadyExists)
            }
        }
    }

    async fn query_by_rank(&self, rank: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let query = r#"
            SELECT game_id, rank, contact
            FROM candidate_records
            WHERE rank = $1
            ORDER BY created_at ASC
        "#;

        let rows = sqlx::query(query).bind(rank).fetch_all(&self.pool).await?;

        let records: Vec<StoredRecord> = rows
            .iter()
            .map(|row| CandidateRecord {
                game_id: row.get("game_id"),
                rank: row.get("rank"),
                contact: row.get("contact"),
            })
            .collect();

        tracing::debug!("Rank {} matched {} records", rank, records.len());

        Ok(records)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}
