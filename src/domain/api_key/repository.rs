//! API key repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{ApiKeyId, ApiKeyRecord};
use crate::domain::DomainError;

/// Repository trait for API key storage
///
/// There is no delete: revoked records stay in storage.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Get a record by its id
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Get a record by the hex SHA-256 of its secret
    async fn find_by_hash(&self, secret_hash: &str) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Store a newly issued record
    async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError>;

    /// Replace an existing record
    async fn update(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError>;

    /// All records, revoked ones included
    async fn list(&self) -> Result<Vec<ApiKeyRecord>, DomainError>;

    /// Stamp the last-used time of a record
    async fn record_usage(&self, id: &ApiKeyId) -> Result<(), DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock API key repository for testing
    #[derive(Debug, Default)]
    pub struct MockApiKeyRepository {
        records: Arc<RwLock<HashMap<String, ApiKeyRecord>>>,
        should_fail: Arc<RwLock<bool>>,
        fail_usage_updates: Arc<RwLock<bool>>,
    }

    impl MockApiKeyRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every operation fail
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        /// Make only `record_usage` fail
        pub async fn set_fail_usage_updates(&self, fail: bool) {
            *self.fail_usage_updates.write().await = fail;
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::storage("Mock repository configured to fail"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ApiKeyRepository for MockApiKeyRepository {
        async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKeyRecord>, DomainError> {
            self.check_should_fail().await?;
            Ok(self.records.read().await.get(id.as_str()).cloned())
        }

        async fn find_by_hash(
            &self,
            secret_hash: &str,
        ) -> Result<Option<ApiKeyRecord>, DomainError> {
            self.check_should_fail().await?;
            let records = self.records.read().await;
            Ok(records
                .values()
                .find(|r| r.secret_hash() == secret_hash)
                .cloned())
        }

        async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
            self.check_should_fail().await?;
            self.records
                .write()
                .await
                .insert(record.id().as_str().to_string(), record.clone());
            Ok(record)
        }

        async fn update(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
            self.check_should_fail().await?;
            let mut records = self.records.write().await;

            if !records.contains_key(record.id().as_str()) {
                return Err(DomainError::not_found(format!(
                    "API key '{}' not found",
                    record.id()
                )));
            }

            records.insert(record.id().as_str().to_string(), record.clone());
            Ok(record)
        }

        async fn list(&self) -> Result<Vec<ApiKeyRecord>, DomainError> {
            self.check_should_fail().await?;
            Ok(self.records.read().await.values().cloned().collect())
        }

        async fn record_usage(&self, id: &ApiKeyId) -> Result<(), DomainError> {
            self.check_should_fail().await?;

            if *self.fail_usage_updates.read().await {
                return Err(DomainError::storage("usage update failed"));
            }

            if let Some(record) = self.records.write().await.get_mut(id.as_str()) {
                record.record_usage();
            }
            Ok(())
        }
    }
}
