//! API key service
//!
//! Issues, validates and revokes keys on top of an ApiKeyRepository.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::api_key::{ApiKeyId, ApiKeyRecord, ApiKeyRepository};
use crate::domain::auth::AuthError;
use crate::domain::client::{ClientId, ClientType, PermissionSet};
use crate::domain::rate_limit::RateLimitStore;
use crate::domain::DomainError;

use super::generator::{hash_key, ApiKeyGenerator, GeneratedApiKey};

/// A freshly issued key. The secret is never retrievable again.
#[derive(Debug)]
pub struct IssuedApiKey {
    pub record: ApiKeyRecord,
    pub secret: String,
}

#[derive(Debug)]
pub struct ApiKeyService {
    repository: Arc<dyn ApiKeyRepository>,
    rate_limits: Arc<dyn RateLimitStore>,
    generator: ApiKeyGenerator,
}

impl ApiKeyService {
    pub fn new(
        repository: Arc<dyn ApiKeyRepository>,
        rate_limits: Arc<dyn RateLimitStore>,
        generator: ApiKeyGenerator,
    ) -> Self {
        Self {
            repository,
            rate_limits,
            generator,
        }
    }

    /// Issue a new random key
    pub async fn issue(
        &self,
        client_id: ClientId,
        client_type: ClientType,
        permissions: PermissionSet,
        description: Option<String>,
    ) -> Result<IssuedApiKey, DomainError> {
        let generated = self.generator.generate();
        self.store(generated, client_id, client_type, permissions, description)
            .await
    }

    /// Register a key whose secret the operator chose. Registering the same
    /// secret twice returns the existing record.
    pub async fn issue_with_secret(
        &self,
        secret: &str,
        client_id: ClientId,
        client_type: ClientType,
        permissions: PermissionSet,
        description: Option<String>,
    ) -> Result<IssuedApiKey, DomainError> {
        if !self.generator.is_well_formed(secret) {
            return Err(DomainError::validation(format!(
                "API key must be '{}' followed by lowercase hex",
                self.generator.prefix()
            )));
        }

        let generated = self.generator.from_key(secret);
        if let Some(existing) = self.repository.find_by_hash(&generated.hash).await? {
            debug!(key_id = %existing.id(), "API key already registered");
            return Ok(IssuedApiKey {
                record: existing,
                secret: generated.key,
            });
        }

        self.store(generated, client_id, client_type, permissions, description)
            .await
    }

    async fn store(
        &self,
        generated: GeneratedApiKey,
        client_id: ClientId,
        client_type: ClientType,
        permissions: PermissionSet,
        description: Option<String>,
    ) -> Result<IssuedApiKey, DomainError> {
        let mut record = ApiKeyRecord::new(
            ApiKeyId::generate(),
            generated.hash,
            generated.prefix,
            client_id,
            client_type,
            permissions,
        );
        if let Some(description) = description {
            record = record.with_description(description);
        }

        let created = self.repository.create(record).await?;

        info!(
            key_id = %created.id(),
            client_id = %created.client_id(),
            client_type = %created.client_type(),
            "API key issued"
        );

        Ok(IssuedApiKey {
            record: created,
            secret: generated.key,
        })
    }

    /// Resolve a presented secret to its live record
    pub async fn validate(&self, secret: &str) -> Result<ApiKeyRecord, AuthError> {
        if !self.generator.is_well_formed(secret) {
            return Err(AuthError::unauthorized("Invalid API key"));
        }

        let record = self
            .repository
            .find_by_hash(&hash_key(secret))
            .await
            .map_err(|e| AuthError::unavailable(e.to_string()))?
            .ok_or_else(|| AuthError::unauthorized("Invalid API key"))?;

        if record.is_revoked() {
            debug!(key_id = %record.id(), "Rejected revoked API key");
            return Err(AuthError::unauthorized("API key has been revoked"));
        }

        if let Err(e) = self.repository.record_usage(record.id()).await {
            warn!(key_id = %record.id(), error = %e, "Failed to record API key usage");
        }

        Ok(record)
    }

    pub async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKeyRecord>, DomainError> {
        self.repository.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<ApiKeyRecord>, DomainError> {
        self.repository.list().await
    }

    /// Soft-revoke a key and reset its client's rate counter
    pub async fn revoke(&self, id: &ApiKeyId) -> Result<ApiKeyRecord, DomainError> {
        let mut record = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("API key '{}' not found", id)))?;

        if !record.revoke() {
            debug!(key_id = %id, "API key was already revoked");
            return Ok(record);
        }

        let record = self.repository.update(record).await?;
        info!(key_id = %id, client_id = %record.client_id(), "API key revoked");

        let counter_key = record.rate_limit_key();
        if let Err(e) = self.rate_limits.reset(&counter_key).await {
            warn!(key = %counter_key, error = %e, "Failed to reset rate limit counter");
        }

        Ok(record)
    }
}
