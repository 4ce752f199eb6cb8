use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const TOKEN_PREFIX: &str = "sk_";
const TOKEN_RANDOM_LEN: usize = 43;
const DISPLAY_PREFIX_LEN: usize = TOKEN_PREFIX.len() + 4;

/// Full length of an issued token, `sk_` included.
pub const TOKEN_LEN: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LEN;

/// A programmatic access credential. Only a SHA-256 verifier of the secret is
/// kept; the plaintext leaves the process once, in the creation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub name: String,
    pub key_prefix: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl ApiKey {
    pub fn new(name: &str, token: &str) -> Self {
        ApiKey {
            id: Uuid::new_v4(),
            name: name.to_string(),
            key_prefix: display_prefix(token),
            token_hash: hash_token(token),
            created_at: Utc::now(),
            last_used: None,
            is_active: true,
        }
    }
}

/// Creation response: the stored key plus its plaintext token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedApiKey {
    #[serde(flatten)]
    pub api_key: ApiKey,
    pub key: String,
}

pub fn generate_token() -> String {
    let random: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", TOKEN_PREFIX, random)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn display_prefix(token: &str) -> String {
    token.chars().take(DISPLAY_PREFIX_LEN).collect()
}
