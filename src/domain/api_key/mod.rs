//! API key domain
//!
//! Issued keys are stored only as a SHA-256 digest of the secret. Records are
//! never deleted; revocation is a soft flag.

mod entity;
mod repository;
mod validation;

pub use entity::{ApiKeyId, ApiKeyRecord};
pub use repository::ApiKeyRepository;
pub use validation::{validate_api_key_id, ApiKeyValidationError};

#[cfg(test)]
pub use repository::mock;
