//! Auth management request and response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::api_key::{ApiKeyId, ApiKeyRecord};
use crate::domain::auth::AuthenticatedClient;
use crate::domain::client::{ClientId, ClientType};
use crate::domain::rate_limit::RateLimitStatus;

/// Optional body of `POST /auth/token`. Omitted fields keep the caller's identity.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    pub client_id: Option<String>,
    pub client_type: Option<ClientType>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub client_id: ClientId,
    pub client_type: ClientType,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKeyRequest {
    pub client_id: String,
    pub client_type: ClientType,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Public view of a key record. The hash never leaves the service.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeySummary {
    pub key_id: ApiKeyId,
    pub key_prefix: String,
    pub client_id: ClientId,
    pub client_type: ClientType,
    pub permissions: Vec<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<&ApiKeyRecord> for ApiKeySummary {
    fn from(record: &ApiKeyRecord) -> Self {
        Self {
            key_id: record.id().clone(),
            key_prefix: record.key_prefix().to_string(),
            client_id: record.client_id().clone(),
            client_type: record.client_type(),
            permissions: record.permissions().names(),
            description: record.description().map(str::to_string),
            is_active: !record.is_revoked(),
            created_at: record.created_at(),
            last_used_at: record.last_used_at(),
            revoked_at: record.revoked_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedApiKeyResponse {
    /// Plaintext key, shown only in this response
    pub api_key: String,
    #[serde(flatten)]
    pub key: ApiKeySummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyListResponse {
    pub keys: Vec<ApiKeySummary>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub client: AuthenticatedClient,
    pub rate_limit: Option<RateLimitStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthHealthResponse {
    pub status: &'static str,
    pub rate_limit_backend: &'static str,
}
