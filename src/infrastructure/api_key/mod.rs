//! API key infrastructure implementations
//!
//! Key generation and hashing, in-memory storage and the service that issues,
//! validates and revokes keys.

mod generator;
mod repository;
mod service;

pub use generator::{hash_key, ApiKeyGenerator, GeneratedApiKey};
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, IssuedApiKey};
