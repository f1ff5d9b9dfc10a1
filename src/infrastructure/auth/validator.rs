//! Resolves a presented credential to an authenticated client

use std::sync::Arc;

use crate::domain::auth::{AuthError, AuthenticatedClient, Credential};
use crate::infrastructure::api_key::ApiKeyService;

use super::jwt::TokenService;

#[derive(Debug, Clone)]
pub struct CredentialValidator {
    api_keys: Arc<ApiKeyService>,
    tokens: Arc<dyn TokenService>,
}

impl CredentialValidator {
    pub fn new(api_keys: Arc<ApiKeyService>, tokens: Arc<dyn TokenService>) -> Self {
        Self { api_keys, tokens }
    }

    pub async fn validate(&self, credential: &Credential) -> Result<AuthenticatedClient, AuthError> {
        match credential {
            Credential::ApiKey(secret) => {
                let record = self.api_keys.validate(secret).await?;
                Ok(AuthenticatedClient::from_api_key(&record))
            }
            Credential::Bearer(token) => {
                let claims = self.tokens.verify(token)?;
                Ok(AuthenticatedClient::from_claims(claims))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::AuthMethod;
    use crate::domain::client::{ClientId, ClientType, PermissionSet};
    use crate::infrastructure::api_key::{ApiKeyGenerator, InMemoryApiKeyRepository};
    use crate::infrastructure::auth::{JwtConfig, JwtTokenService};
    use crate::infrastructure::rate_limit::InMemoryRateLimitStore;

    fn validator() -> (CredentialValidator, Arc<ApiKeyService>, Arc<JwtTokenService>) {
        let api_keys = Arc::new(ApiKeyService::new(
            Arc::new(InMemoryApiKeyRepository::new()),
            Arc::new(InMemoryRateLimitStore::new()),
            ApiKeyGenerator::default(),
        ));
        let tokens = Arc::new(
            JwtTokenService::new(JwtConfig::new("validator-test-secret-32-bytes-long")).unwrap(),
        );
        (
            CredentialValidator::new(api_keys.clone(), tokens.clone()),
            api_keys,
            tokens,
        )
    }

    #[tokio::test]
    async fn test_api_key_credential() {
        let (validator, api_keys, _) = validator();
        let issued = api_keys
            .issue(
                ClientId::new("ext").unwrap(),
                ClientType::WebExtension,
                PermissionSet::from_names(["website_analysis"]).unwrap(),
                None,
            )
            .await
            .unwrap();

        let client = validator
            .validate(&Credential::ApiKey(issued.secret))
            .await
            .unwrap();

        assert_eq!(client.client_type, ClientType::WebExtension);
        assert!(matches!(client.method, AuthMethod::ApiKey { .. }));
    }

    #[tokio::test]
    async fn test_bearer_credential() {
        let (validator, _, tokens) = validator();
        let issued = tokens
            .issue(
                ClientId::new("app").unwrap(),
                ClientType::MobileApp,
                PermissionSet::new(),
            )
            .unwrap();

        let client = validator
            .validate(&Credential::Bearer(issued.token))
            .await
            .unwrap();

        assert_eq!(client.client_id.as_str(), "app");
        assert!(matches!(client.method, AuthMethod::Jwt { .. }));
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let (validator, _, _) = validator();

        assert!(matches!(
            validator.validate(&Credential::ApiKey("mai_nope".into())).await,
            Err(AuthError::Unauthorized(_))
        ));
        assert!(matches!(
            validator.validate(&Credential::Bearer("nope".into())).await,
            Err(AuthError::Unauthorized(_))
        ));
    }
}
