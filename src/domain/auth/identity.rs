use chrono::{DateTime, Utc};
use serde::Serialize;

use super::claims::TokenClaims;
use crate::domain::api_key::{ApiKeyId, ApiKeyRecord};
use crate::domain::client::{rate_limit_key, ClientId, ClientType, PermissionSet};

/// How a caller proved its identity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey { key_id: ApiKeyId },
    Jwt { expires_at: DateTime<Utc> },
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey { .. } => "api_key",
            Self::Jwt { .. } => "jwt",
        }
    }
}

/// Identity established by the credential validator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticatedClient {
    pub client_id: ClientId,
    pub client_type: ClientType,
    pub permissions: PermissionSet,
    #[serde(flatten)]
    pub method: AuthMethod,
}

impl AuthenticatedClient {
    pub fn from_api_key(record: &ApiKeyRecord) -> Self {
        Self {
            client_id: record.client_id().clone(),
            client_type: record.client_type(),
            permissions: record.permissions().clone(),
            method: AuthMethod::ApiKey {
                key_id: record.id().clone(),
            },
        }
    }

    pub fn from_claims(claims: TokenClaims) -> Self {
        let expires_at = claims.expires_at();

        Self {
            client_id: claims.client_id,
            client_type: claims.client_type,
            permissions: claims.permissions,
            method: AuthMethod::Jwt { expires_at },
        }
    }

    /// Admins hold the wildcard permission
    pub fn is_admin(&self) -> bool {
        self.permissions.has_wildcard()
    }

    /// Counter key: one window per client identity and client type
    pub fn rate_limit_key(&self) -> String {
        rate_limit_key(self.client_type, &self.client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(permissions: PermissionSet) -> TokenClaims {
        TokenClaims::new(
            ClientId::new("ops").unwrap(),
            ClientType::Admin,
            permissions,
            "iss",
            "aud",
            Duration::hours(1),
        )
    }

    #[test]
    fn test_from_claims() {
        let client = AuthenticatedClient::from_claims(claims(PermissionSet::wildcard()));

        assert!(client.is_admin());
        assert_eq!(client.method.as_str(), "jwt");
        assert_eq!(client.rate_limit_key(), "admin:ops");
    }

    #[test]
    fn test_from_api_key() {
        let record = ApiKeyRecord::new(
            ApiKeyId::generate(),
            "00",
            "mai_00",
            ClientId::new("ext").unwrap(),
            ClientType::WebExtension,
            PermissionSet::new(),
        );
        let client = AuthenticatedClient::from_api_key(&record);

        assert!(!client.is_admin());
        assert_eq!(
            client.method,
            AuthMethod::ApiKey {
                key_id: record.id().clone()
            }
        );
        assert_eq!(client.rate_limit_key(), "web_extension:ext");
    }

    #[test]
    fn test_serialized_identity() {
        let json = serde_json::to_value(AuthenticatedClient::from_claims(claims(
            PermissionSet::new(),
        )))
        .unwrap();

        assert_eq!(json["client_id"], "ops");
        assert_eq!(json["method"], "jwt");
        assert!(json["expires_at"].is_string());
    }
}
