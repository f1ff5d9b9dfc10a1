//! Request authorization gate
//!
//! Every request passes here before its handler. The gate resolves the route's
//! protection level, validates the credential, checks permissions and finally
//! counts the request against the client type's rate limit.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::auth::{AuthError, AuthenticatedClient, Credential, PolicyTable};
use crate::domain::client::ClientProfiles;
use crate::domain::rate_limit::{RateLimitDecision, RateLimitStatus, RateLimitStore};
use crate::infrastructure::observability::record_gate_decision;

use super::validator::CredentialValidator;

/// Result of a request that passed the gate
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// Route needs no credential; nothing was validated or counted
    Public,
    Authorized {
        client: AuthenticatedClient,
        rate_limit: RateLimitStatus,
    },
}

#[derive(Debug, Clone)]
pub struct AuthGate {
    policies: Arc<PolicyTable>,
    profiles: Arc<ClientProfiles>,
    validator: CredentialValidator,
    rate_limits: Arc<dyn RateLimitStore>,
}

impl AuthGate {
    pub fn new(
        policies: Arc<PolicyTable>,
        profiles: Arc<ClientProfiles>,
        validator: CredentialValidator,
        rate_limits: Arc<dyn RateLimitStore>,
    ) -> Self {
        Self {
            policies,
            profiles,
            validator,
            rate_limits,
        }
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    pub fn rate_limits(&self) -> &Arc<dyn RateLimitStore> {
        &self.rate_limits
    }

    pub async fn authorize(
        &self,
        path: &str,
        credential: Option<Credential>,
    ) -> Result<GateOutcome, AuthError> {
        let level = self.policies.level_for(path);

        if level.is_public() {
            record_gate_decision("public", None);
            return Ok(GateOutcome::Public);
        }

        let result = self.check(path, credential).await;

        match &result {
            Ok(GateOutcome::Authorized { client, rate_limit }) => {
                record_gate_decision("allowed", Some(client.client_type.as_str()));
                debug!(
                    path,
                    client_id = %client.client_id,
                    client_type = %client.client_type,
                    method = client.method.as_str(),
                    remaining = rate_limit.remaining,
                    "Request authorized"
                );
            }
            Ok(GateOutcome::Public) => {}
            Err(e) => {
                record_gate_decision(e.outcome(), None);
                warn!(path, outcome = e.outcome(), reason = %e, "Request denied");
            }
        }

        result
    }

    async fn check(
        &self,
        path: &str,
        credential: Option<Credential>,
    ) -> Result<GateOutcome, AuthError> {
        let credential = credential.ok_or_else(|| {
            AuthError::unauthorized(
                "Authentication required. Provide an X-API-Key header or an Authorization: Bearer token",
            )
        })?;

        let client = self.validator.validate(&credential).await?;
        self.policies.level_for(path).authorize(&client)?;

        let rule = self.profiles.rate_limit(client.client_type);
        let decision = self
            .rate_limits
            .hit(&client.rate_limit_key(), &rule)
            .await
            .map_err(|e| AuthError::unavailable(e.to_string()))?;

        match decision {
            RateLimitDecision::Allowed(rate_limit) => {
                Ok(GateOutcome::Authorized { client, rate_limit })
            }
            RateLimitDecision::Limited {
                limit,
                retry_after_secs,
            } => Err(AuthError::RateLimited {
                limit,
                retry_after_secs,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::{
        ClientId, ClientProfile, ClientType, Permission, PermissionSet, RateLimitRule,
    };
    use crate::domain::rate_limit::mock::ManualClock;
    use crate::infrastructure::api_key::{
        ApiKeyGenerator, ApiKeyService, InMemoryApiKeyRepository,
    };
    use crate::infrastructure::auth::{JwtConfig, JwtTokenService, TokenService};
    use crate::infrastructure::rate_limit::InMemoryRateLimitStore;
    use chrono::TimeDelta;

    struct Fixture {
        gate: AuthGate,
        api_keys: Arc<ApiKeyService>,
        tokens: Arc<JwtTokenService>,
        clock: ManualClock,
    }

    fn fixture_with(profiles: ClientProfiles) -> Fixture {
        let clock = ManualClock::default();
        let store: Arc<dyn RateLimitStore> =
            Arc::new(InMemoryRateLimitStore::with_clock(Arc::new(clock.clone())));
        let api_keys = Arc::new(ApiKeyService::new(
            Arc::new(InMemoryApiKeyRepository::new()),
            store.clone(),
            ApiKeyGenerator::default(),
        ));
        let tokens = Arc::new(
            JwtTokenService::new(JwtConfig::new("gate-test-secret-of-32-bytes-min")).unwrap(),
        );
        let validator = CredentialValidator::new(api_keys.clone(), tokens.clone());
        let gate = AuthGate::new(
            Arc::new(PolicyTable::builtin().unwrap()),
            Arc::new(profiles),
            validator,
            store,
        );

        Fixture {
            gate,
            api_keys,
            tokens,
            clock,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(ClientProfiles::builtin())
    }

    fn bearer(fixture: &Fixture, client_type: ClientType, permissions: PermissionSet) -> Credential {
        let issued = fixture
            .tokens
            .issue(ClientId::new("client-1").unwrap(), client_type, permissions)
            .unwrap();
        Credential::Bearer(issued.token)
    }

    fn protected_paths() -> Vec<&'static str> {
        vec![
            "/auth/token",
            "/auth/verify",
            "/auth/api-key",
            "/auth/keys",
            "/auth/keys/abc123",
            "/email/v1/analyze",
            "/email/v1/translate",
            "/email/v2/analyze",
            "/socialmedia/v1/analyze",
            "/socialmedia/v1/translate",
            "/website/v1/analyze",
            "/website/v1/translate",
            "/website/v2/analyze",
            "/not/in/table",
        ]
    }

    #[tokio::test]
    async fn test_public_routes_need_no_credential() {
        let fixture = fixture();

        for path in ["/", "/health", "/auth/health", "/email/", "/website/", "/metrics"] {
            assert_eq!(
                fixture.gate.authorize(path, None).await.unwrap(),
                GateOutcome::Public,
                "{}",
                path
            );
        }
    }

    #[tokio::test]
    async fn test_protected_routes_reject_missing_credential() {
        let fixture = fixture();

        for path in protected_paths() {
            assert!(
                matches!(
                    fixture.gate.authorize(path, None).await,
                    Err(AuthError::Unauthorized(_))
                ),
                "{}",
                path
            );
        }
    }

    #[tokio::test]
    async fn test_wildcard_passes_every_route() {
        let fixture = fixture();

        for path in protected_paths() {
            let credential = bearer(&fixture, ClientType::Admin, PermissionSet::wildcard());
            assert!(
                matches!(
                    fixture.gate.authorize(path, Some(credential)).await,
                    Ok(GateOutcome::Authorized { .. })
                ),
                "{}",
                path
            );
        }
    }

    #[tokio::test]
    async fn test_missing_permission_is_forbidden() {
        let fixture = fixture();
        let email_only = PermissionSet::from_names([Permission::EMAIL_ANALYSIS]).unwrap();

        let allowed = fixture
            .gate
            .authorize(
                "/email/v1/analyze",
                Some(bearer(&fixture, ClientType::Chatbot, email_only.clone())),
            )
            .await;
        assert!(allowed.is_ok());

        for path in ["/website/v1/analyze", "/socialmedia/v1/translate", "/auth/keys"] {
            let denied = fixture
                .gate
                .authorize(path, Some(bearer(&fixture, ClientType::Chatbot, email_only.clone())))
                .await;
            assert!(matches!(denied, Err(AuthError::Forbidden(_))), "{}", path);
        }
    }

    #[tokio::test]
    async fn test_revoked_api_key_rejected() {
        let fixture = fixture();
        let issued = fixture
            .api_keys
            .issue(
                ClientId::new("ext-1").unwrap(),
                ClientType::WebExtension,
                PermissionSet::from_names([Permission::WEBSITE_ANALYSIS]).unwrap(),
                None,
            )
            .await
            .unwrap();
        let credential = Credential::ApiKey(issued.secret.clone());

        assert!(fixture
            .gate
            .authorize("/website/v1/analyze", Some(credential.clone()))
            .await
            .is_ok());

        fixture.api_keys.revoke(issued.record.id()).await.unwrap();

        assert!(matches!(
            fixture
                .gate
                .authorize("/website/v1/analyze", Some(credential))
                .await,
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_mobile_app_fifty_per_hour() {
        let profiles = ClientProfiles::new(ClientType::ALL.map(|client_type| {
            let mut profile = ClientProfiles::builtin().get(client_type).clone();
            if client_type == ClientType::MobileApp {
                profile = ClientProfile::new(RateLimitRule::per_hour(50), profile.permissions);
            }
            (client_type, profile)
        }))
        .unwrap();
        let fixture = fixture_with(profiles);
        let permissions = PermissionSet::from_names([Permission::EMAIL_ANALYSIS]).unwrap();
        let credential = bearer(&fixture, ClientType::MobileApp, permissions);

        for n in 1..=50u32 {
            match fixture
                .gate
                .authorize("/email/v1/analyze", Some(credential.clone()))
                .await
            {
                Ok(GateOutcome::Authorized { rate_limit, .. }) => {
                    assert_eq!(rate_limit.limit, 50);
                    assert_eq!(rate_limit.remaining, 50 - n);
                }
                other => panic!("request {} should pass, got {:?}", n, other),
            }
            fixture.clock.advance(TimeDelta::seconds(10));
        }

        let rejected = fixture
            .gate
            .authorize("/email/v1/analyze", Some(credential.clone()))
            .await;
        assert_eq!(
            rejected,
            Err(AuthError::RateLimited {
                limit: 50,
                retry_after_secs: 3600 - 500
            })
        );

        fixture.clock.advance(TimeDelta::seconds(3600 - 500));
        assert!(matches!(
            fixture
                .gate
                .authorize("/email/v1/analyze", Some(credential))
                .await,
            Ok(GateOutcome::Authorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_client() {
        let profiles = ClientProfiles::new(ClientType::ALL.map(|client_type| {
            let builtin = ClientProfiles::builtin().get(client_type).clone();
            (
                client_type,
                ClientProfile::new(RateLimitRule::per_hour(1), builtin.permissions),
            )
        }))
        .unwrap();
        let fixture = fixture_with(profiles);

        let first = fixture
            .tokens
            .issue(ClientId::new("a").unwrap(), ClientType::Chatbot, PermissionSet::new())
            .unwrap();
        let second = fixture
            .tokens
            .issue(ClientId::new("b").unwrap(), ClientType::Chatbot, PermissionSet::new())
            .unwrap();

        let hit = |token: &str| {
            fixture
                .gate
                .authorize("/auth/verify", Some(Credential::Bearer(token.to_string())))
        };

        assert!(hit(&first.token).await.is_ok());
        assert!(hit(&second.token).await.is_ok());
        assert!(matches!(
            hit(&first.token).await,
            Err(AuthError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_forbidden_requests_are_not_counted() {
        let profiles = ClientProfiles::new(ClientType::ALL.map(|client_type| {
            let builtin = ClientProfiles::builtin().get(client_type).clone();
            (
                client_type,
                ClientProfile::new(RateLimitRule::per_hour(1), builtin.permissions),
            )
        }))
        .unwrap();
        let fixture = fixture_with(profiles);
        let credential = bearer(&fixture, ClientType::Chatbot, PermissionSet::new());

        for _ in 0..3 {
            assert!(matches!(
                fixture
                    .gate
                    .authorize("/email/v1/analyze", Some(credential.clone()))
                    .await,
                Err(AuthError::Forbidden(_))
            ));
        }

        assert!(fixture
            .gate
            .authorize("/auth/verify", Some(credential))
            .await
            .is_ok());
    }
}
