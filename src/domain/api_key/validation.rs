//! API key identifier validation

use thiserror::Error;

/// Errors that can occur during API key id validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("API key ID cannot be empty")]
    EmptyId,

    #[error("API key ID exceeds maximum length of {0} characters")]
    TooLong(usize),

    #[error("API key ID contains invalid character: '{0}'. Only alphanumeric characters and hyphens are allowed")]
    InvalidCharacter(char),

    #[error("API key ID must start and end with a letter or number")]
    InvalidBoundary,
}

const MAX_API_KEY_ID_LENGTH: usize = 64;

/// Validate an API key id: alphanumeric and hyphens, alphanumeric at both ends
pub fn validate_api_key_id(id: &str) -> Result<(), ApiKeyValidationError> {
    if id.is_empty() {
        return Err(ApiKeyValidationError::EmptyId);
    }

    if id.len() > MAX_API_KEY_ID_LENGTH {
        return Err(ApiKeyValidationError::TooLong(MAX_API_KEY_ID_LENGTH));
    }

    if let Some(c) = id.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
        return Err(ApiKeyValidationError::InvalidCharacter(c));
    }

    if id.starts_with('-') || id.ends_with('-') {
        return Err(ApiKeyValidationError::InvalidBoundary);
    }

    Ok(())
}
