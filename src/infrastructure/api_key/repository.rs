//! In-memory API key repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKeyId, ApiKeyRecord, ApiKeyRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<String, ApiKeyRecord>,
    /// secret hash -> key id
    hash_index: HashMap<String, String>,
}

/// In-memory implementation of ApiKeyRepository
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    records: Arc<RwLock<Records>>,
}

impl InMemoryApiKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKeyRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.by_id.get(id.as_str()).cloned())
    }

    async fn find_by_hash(&self, secret_hash: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .hash_index
            .get(secret_hash)
            .and_then(|id| records.by_id.get(id))
            .cloned())
    }

    async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        let mut records = self.records.write().await;
        let id = record.id().as_str().to_string();

        if records.by_id.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "API key with ID '{}' already exists",
                id
            )));
        }

        if records.hash_index.contains_key(record.secret_hash()) {
            return Err(DomainError::conflict("API key secret already registered"));
        }

        records
            .hash_index
            .insert(record.secret_hash().to_string(), id.clone());
        records.by_id.insert(id, record.clone());

        Ok(record)
    }

    async fn update(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        let mut records = self.records.write().await;

        match records.by_id.get_mut(record.id().as_str()) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record)
            }
            None => Err(DomainError::not_found(format!(
                "API key '{}' not found",
                record.id()
            ))),
        }
    }

    async fn list(&self) -> Result<Vec<ApiKeyRecord>, DomainError> {
        let records = self.records.read().await;
        let mut all: Vec<_> = records.by_id.values().cloned().collect();
        all.sort_by_key(|record| record.created_at());
        Ok(all)
    }

    async fn record_usage(&self, id: &ApiKeyId) -> Result<(), DomainError> {
        let mut records = self.records.write().await;

        match records.by_id.get_mut(id.as_str()) {
            Some(record) => {
                record.record_usage();
                Ok(())
            }
            None => Err(DomainError::not_found(format!("API key '{}' not found", id))),
        }
    }
}
