//! HS256 access tokens carrying a client identity

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt::Debug;
use tracing::warn;

use crate::domain::auth::{AuthError, TokenClaims};
use crate::domain::client::{ClientId, ClientType, PermissionSet};
use crate::domain::DomainError;

/// Secrets shorter than this are accepted with a warning
const RECOMMENDED_SECRET_BYTES: usize = 32;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: u64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours: 24,
            issuer: "mai-scam-detection".to_string(),
            audience: "mai-clients".to_string(),
        }
    }
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("expiry_hours", &self.expiry_hours)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// A signed token and the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Issues and verifies access tokens
pub trait TokenService: Send + Sync + Debug {
    fn issue(
        &self,
        client_id: ClientId,
        client_type: ClientType,
        permissions: PermissionSet,
    ) -> Result<IssuedToken, DomainError>;

    /// Check signature, issuer, audience and expiry
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

#[derive(Clone)]
pub struct JwtTokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Result<Self, AuthError> {
        if config.secret.trim().is_empty() {
            return Err(AuthError::misconfigured("auth.jwt_secret must be set"));
        }
        if config.secret.len() < RECOMMENDED_SECRET_BYTES {
            warn!(
                "auth.jwt_secret is shorter than {} bytes",
                RECOMMENDED_SECRET_BYTES
            );
        }
        if config.expiry_hours == 0 {
            return Err(AuthError::misconfigured(
                "auth.token_expiry_hours must be greater than zero",
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        })
    }

    fn ttl(&self) -> Duration {
        Duration::hours(i64::try_from(self.config.expiry_hours).unwrap_or(i64::MAX / 3600))
    }
}

impl TokenService for JwtTokenService {
    fn issue(
        &self,
        client_id: ClientId,
        client_type: ClientType,
        permissions: PermissionSet,
    ) -> Result<IssuedToken, DomainError> {
        let claims = TokenClaims::new(
            client_id,
            client_type,
            permissions,
            &self.config.issuer,
            &self.config.audience,
            self.ttl(),
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken { token, claims })
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::unauthorized("Token has expired"),
                _ => AuthError::unauthorized("Invalid token"),
            },
        )?;

        // The library accepts exp == now, treat that instant as expired
        if data.claims.is_expired() {
            return Err(AuthError::unauthorized("Token has expired"));
        }

        Ok(data.claims)
    }
}
