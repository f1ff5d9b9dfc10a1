//! Domain layer - Core business logic and entities

pub mod analysis;
pub mod api_key;
pub mod auth;
pub mod client;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod rate_limit;

pub use error::DomainError;
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};
