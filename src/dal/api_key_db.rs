use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::ApiKey;

use super::{ApiKeyStore, StoreError};

const API_KEY_COLUMNS: &str = "id, name, key_prefix, token_hash, created_at, last_used, is_active";

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    id: Uuid,
    name: String,
    key_prefix: String,
    token_hash: String,
    created_at: DateTime<Utc>,
    last_used: Option<DateTime<Utc>>,
    is_active: bool,
}

impl From<ApiKeyRow> for ApiKey {
    fn from(row: ApiKeyRow) -> Self {
        ApiKey {
            id: row.id,
            name: row.name,
            key_prefix: row.key_prefix,
            token_hash: row.token_hash,
            created_at: row.created_at,
            last_used: row.last_used,
            is_active: row.is_active,
        }
    }
}

pub struct PgApiKeyStore {
    pool: PgPool,
}

impl PgApiKeyStore {
    pub fn new(pool: PgPool) -> Self {
        PgApiKeyStore { pool }
    }
}

#[async_trait]
impl ApiKeyStore for PgApiKeyStore {
    async fn insert(&self, key: &ApiKey) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "insert into api_key ({}) values ($1, $2, $3, $4, $5, $6, $7)",
            API_KEY_COLUMNS
        ))
        .bind(key.id)
        .bind(&key.name)
        .bind(&key.key_prefix)
        .bind(&key.token_hash)
        .bind(key.created_at)
        .bind(key.last_used)
        .bind(key.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<ApiKey>, StoreError> {
        let rows = sqlx::query_as::<_, ApiKeyRow>(&format!(
            "select {} from api_key order by created_at desc",
            API_KEY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ApiKey::from).collect())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<ApiKey>, StoreError> {
        let row = sqlx::query_as::<_, ApiKeyRow>(&format!(
            "select {} from api_key where token_hash = $1",
            API_KEY_COLUMNS
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ApiKey::from))
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<ApiKey>, StoreError> {
        let row = sqlx::query_as::<_, ApiKeyRow>(&format!(
            "update api_key set is_active = false where id = $1 returning {}",
            API_KEY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ApiKey::from))
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query(
            r"
            update api_key set
                last_used = $2
            where
                id = $1
            ",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
