//! API key record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_api_key_id, ApiKeyValidationError};
use crate::domain::client::{rate_limit_key, ClientId, ClientType, PermissionSet};

/// API key identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKeyId(String);

impl ApiKeyId {
    pub fn new(id: impl Into<String>) -> Result<Self, ApiKeyValidationError> {
        let id = id.into();
        validate_api_key_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ApiKeyId {
    type Error = ApiKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApiKeyId> for String {
    fn from(id: ApiKeyId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored API key
///
/// Immutable after issuance except for revocation and the last-used timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    id: ApiKeyId,
    /// Hex SHA-256 of the full secret
    secret_hash: String,
    /// Leading characters of the secret, safe to display
    key_prefix: String,
    client_id: ClientId,
    client_type: ClientType,
    permissions: PermissionSet,
    description: Option<String>,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl ApiKeyRecord {
    pub fn new(
        id: ApiKeyId,
        secret_hash: impl Into<String>,
        key_prefix: impl Into<String>,
        client_id: ClientId,
        client_type: ClientType,
        permissions: PermissionSet,
    ) -> Self {
        Self {
            id,
            secret_hash: secret_hash.into(),
            key_prefix: key_prefix.into(),
            client_id,
            client_type,
            permissions,
            description: None,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn secret_hash(&self) -> &str {
        &self.secret_hash
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn client_type(&self) -> ClientType {
        self.client_type
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Soft-revoke the key. Returns false if it was already revoked, in which
    /// case the original revocation time is kept.
    pub fn revoke(&mut self) -> bool {
        if self.is_revoked() {
            return false;
        }
        self.revoked_at = Some(Utc::now());
        true
    }

    pub fn rate_limit_key(&self) -> String {
        rate_limit_key(self.client_type, &self.client_id)
    }

    pub fn record_usage(&mut self) {
        self.last_used_at = Some(Utc::now());
    }
}
