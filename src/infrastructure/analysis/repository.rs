//! In-memory analysis repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::analysis::{AnalysisId, AnalysisRecord, AnalysisRepository, ContentType};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<AnalysisId, AnalysisRecord>,
    /// (content type, content hash) -> newest record id
    hash_index: HashMap<(ContentType, String), AnalysisId>,
}

/// Analysis store kept in process memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryAnalysisRepository {
    records: Arc<RwLock<Records>>,
}

impl InMemoryAnalysisRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.by_id.len()
    }
}

#[async_trait]
impl AnalysisRepository for InMemoryAnalysisRepository {
    async fn create(&self, record: AnalysisRecord) -> Result<AnalysisRecord, DomainError> {
        let mut records = self.records.write().await;

        if records.by_id.contains_key(&record.id) {
            return Err(DomainError::conflict(format!(
                "Analysis '{}' already exists",
                record.id
            )));
        }

        records.hash_index.insert(
            (record.content_type, record.content_hash.clone()),
            record.id,
        );
        records.by_id.insert(record.id, record.clone());

        Ok(record)
    }

    async fn get(&self, id: &AnalysisId) -> Result<Option<AnalysisRecord>, DomainError> {
        Ok(self.records.read().await.by_id.get(id).cloned())
    }

    async fn find_by_hash(
        &self,
        content_type: ContentType,
        content_hash: &str,
    ) -> Result<Option<AnalysisRecord>, DomainError> {
        let records = self.records.read().await;

        Ok(records
            .hash_index
            .get(&(content_type, content_hash.to_string()))
            .and_then(|id| records.by_id.get(id))
            .cloned())
    }

    async fn update(&self, record: AnalysisRecord) -> Result<AnalysisRecord, DomainError> {
        let mut records = self.records.write().await;

        match records.by_id.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record)
            }
            None => Err(DomainError::not_found(format!(
                "Analysis '{}' not found",
                record.id
            ))),
        }
    }
}
