//! API key generation
//!
//! Keys are `<prefix><64 hex chars>` drawn from the OS random source. Only
//! the hex SHA-256 of the full key is stored.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of secret characters kept in the displayable prefix
const VISIBLE_CHARS: usize = 8;

/// Result of generating a new API key
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// The full API key (only shown once at creation)
    pub key: String,
    /// Type prefix plus the first secret characters, safe to display
    pub prefix: String,
    /// Hex SHA-256 of the full key
    pub hash: String,
}

#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    prefix: String,
    key_bytes: usize,
}

impl ApiKeyGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            key_bytes: 32,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a new API key
    pub fn generate(&self) -> GeneratedApiKey {
        let mut random_bytes = vec![0u8; self.key_bytes];
        OsRng.fill_bytes(&mut random_bytes);

        self.from_key(format!("{}{}", self.prefix, hex::encode(random_bytes)))
    }

    /// Describe an operator-chosen key, used to seed the bootstrap admin key
    pub fn from_key(&self, key: impl Into<String>) -> GeneratedApiKey {
        let key = key.into();
        let visible = key
            .char_indices()
            .nth(self.prefix.chars().count() + VISIBLE_CHARS)
            .map(|(idx, _)| idx)
            .unwrap_or(key.len());

        GeneratedApiKey {
            prefix: key[..visible].to_string(),
            hash: hash_key(&key),
            key,
        }
    }

    /// The prefix followed by at least one lowercase hex digit
    pub fn is_well_formed(&self, key: &str) -> bool {
        key.strip_prefix(self.prefix.as_str()).is_some_and(|rest| {
            !rest.is_empty() && rest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        })
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new("mai_")
    }
}

/// Hex SHA-256 of a key
pub fn hash_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}
