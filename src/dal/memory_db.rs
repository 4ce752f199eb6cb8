use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::{ApiKey, ResultStats, ScrapeResult};

use super::{ApiKeyStore, ResultStore, StoreError};

/// Process-local result log, kept in append order.
#[derive(Default)]
pub struct MemoryResultStore {
    results: RwLock<Vec<ScrapeResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn append(&self, result: &ScrapeResult) -> Result<(), StoreError> {
        self.results.write().push(result.clone());
        Ok(())
    }

    async fn list(&self, limit: usize, skip: usize) -> Result<Vec<ScrapeResult>, StoreError> {
        Ok(self
            .results
            .read()
            .iter()
            .rev()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<ScrapeResult>, StoreError> {
        Ok(self.results.read().iter().rev().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ScrapeResult>, StoreError> {
        Ok(self.results.read().iter().find(|r| r.id == id).cloned())
    }

    async fn stats(&self) -> Result<ResultStats, StoreError> {
        Ok(ResultStats::from_results(self.results.read().iter()))
    }
}

#[derive(Default)]
pub struct MemoryApiKeyStore {
    keys: RwLock<Vec<ApiKey>>,
}

impl MemoryApiKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyStore for MemoryApiKeyStore {
    async fn insert(&self, key: &ApiKey) -> Result<(), StoreError> {
        self.keys.write().push(key.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ApiKey>, StoreError> {
        Ok(self.keys.read().iter().rev().cloned().collect())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<ApiKey>, StoreError> {
        Ok(self
            .keys
            .read()
            .iter()
            .find(|k| k.token_hash == token_hash)
            .cloned())
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<ApiKey>, StoreError> {
        let mut keys = self.keys.write();
        Ok(keys.iter_mut().find(|k| k.id == id).map(|key| {
            key.is_active = false;
            key.clone()
        }))
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(key) = self.keys.write().iter_mut().find(|k| k.id == id) {
            key.last_used = Some(at);
        }
        Ok(())
    }
}
