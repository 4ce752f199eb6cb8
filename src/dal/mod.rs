pub mod api_key_db;
pub mod memory_db;
pub mod result_db;

pub use api_key_db::PgApiKeyStore;
pub use memory_db::{MemoryApiKeyStore, MemoryResultStore};
pub use result_db::PgResultStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ApiKey, RecordError, ResultStats, ScrapeResult};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt stored record: {0}")]
    Corrupt(#[from] RecordError),
}

/// Append-only log of scrape results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn append(&self, result: &ScrapeResult) -> Result<(), StoreError>;

    /// Most recent first. Aggregates computed over this slice are a windowed
    /// view of the log; use [`ResultStore::all`] or [`ResultStore::stats`] for
    /// global totals.
    async fn list(&self, limit: usize, skip: usize) -> Result<Vec<ScrapeResult>, StoreError>;

    /// The full log, most recent first.
    async fn all(&self) -> Result<Vec<ScrapeResult>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<ScrapeResult>, StoreError>;

    async fn stats(&self) -> Result<ResultStats, StoreError>;
}

#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    async fn insert(&self, key: &ApiKey) -> Result<(), StoreError>;

    /// Newest first, inactive keys included.
    async fn list(&self) -> Result<Vec<ApiKey>, StoreError>;

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<ApiKey>, StoreError>;

    /// Marks the key inactive and returns it, or `None` for an unknown id.
    /// Deactivating an inactive key returns it unchanged.
    async fn deactivate(&self, id: Uuid) -> Result<Option<ApiKey>, StoreError>;

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;
}
