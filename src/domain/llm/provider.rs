use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// A hosted chat-completion model endpoint
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request to `model`
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    fn provider_name(&self) -> &'static str;
}
