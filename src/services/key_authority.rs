use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    dal::{ApiKeyStore, StoreError},
    domain::{generate_token, hash_token, ApiKey, IssuedApiKey},
};

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("API key name must not be blank")]
    InvalidName,
    #[error("API key not found")]
    NotFound,
    #[error("Invalid or inactive API key")]
    Unauthorized,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Issues, lists, revokes and checks API keys.
#[derive(Clone)]
pub struct ApiKeyAuthority {
    store: Arc<dyn ApiKeyStore>,
}

impl ApiKeyAuthority {
    pub fn new(store: Arc<dyn ApiKeyStore>) -> Self {
        ApiKeyAuthority { store }
    }

    /// The returned token is the only time the plaintext secret is available.
    pub async fn create(&self, name: &str) -> Result<IssuedApiKey, KeyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(KeyError::InvalidName);
        }

        let token = generate_token();
        let api_key = ApiKey::new(name, &token);
        self.store.insert(&api_key).await?;
        log::info!("Created API key {} ({})", api_key.id, api_key.name);

        Ok(IssuedApiKey {
            api_key,
            key: token,
        })
    }

    pub async fn list(&self) -> Result<Vec<ApiKey>, KeyError> {
        Ok(self.store.list().await?)
    }

    /// One-way and idempotent: an already inactive key stays inactive.
    pub async fn deactivate(&self, id: Uuid) -> Result<ApiKey, KeyError> {
        let api_key = self.store.deactivate(id).await?.ok_or(KeyError::NotFound)?;
        log::info!("Deactivated API key {} ({})", api_key.id, api_key.name);
        Ok(api_key)
    }

    pub async fn authorize(&self, token: &str) -> Result<ApiKey, KeyError> {
        let mut api_key = self
            .store
            .find_by_token_hash(&hash_token(token.trim()))
            .await?
            .filter(|k| k.is_active)
            .ok_or(KeyError::Unauthorized)?;

        let now = Utc::now();
        match self.store.touch(api_key.id, now).await {
            Ok(()) => api_key.last_used = Some(now),
            Err(e) => log::error!("Failed to record use of API key {}: {:?}", api_key.id, e),
        }

        Ok(api_key)
    }
}
