//! Analysis repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{AnalysisId, AnalysisRecord, ContentType};
use crate::domain::DomainError;

/// Document store for analysis results
#[async_trait]
pub trait AnalysisRepository: Send + Sync + Debug {
    async fn create(&self, record: AnalysisRecord) -> Result<AnalysisRecord, DomainError>;

    async fn get(&self, id: &AnalysisId) -> Result<Option<AnalysisRecord>, DomainError>;

    /// Most recent record of `content_type` with the given fingerprint
    async fn find_by_hash(
        &self,
        content_type: ContentType,
        content_hash: &str,
    ) -> Result<Option<AnalysisRecord>, DomainError>;

    async fn update(&self, record: AnalysisRecord) -> Result<AnalysisRecord, DomainError>;

    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
