use std::fmt::Debug;

use async_trait::async_trait;

use super::counter::RateLimitDecision;
use crate::domain::client::RateLimitRule;
use crate::domain::DomainError;

/// Shared counter store with atomic increment-and-compare per key
#[async_trait]
pub trait RateLimitStore: Send + Sync + Debug {
    /// Count one request for `key` under `rule`
    async fn hit(&self, key: &str, rule: &RateLimitRule) -> Result<RateLimitDecision, DomainError>;

    /// Drop the counter for `key`
    async fn reset(&self, key: &str) -> Result<(), DomainError>;

    /// Name of the backing store
    fn backend(&self) -> &'static str;

    /// Whether the store is reachable
    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
