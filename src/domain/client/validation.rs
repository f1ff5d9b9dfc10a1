//! Client identifier validation

use thiserror::Error;

/// Errors that can occur during client id validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientValidationError {
    #[error("Client ID cannot be empty")]
    EmptyId,

    #[error("Client ID exceeds maximum length of {0} characters")]
    TooLong(usize),

    #[error("Client ID must start with a letter or number")]
    InvalidStart,

    #[error("Client ID contains invalid character: '{0}'. Only alphanumeric characters, '-', '_' and '.' are allowed")]
    InvalidCharacter(char),

    #[error("Unknown client type: '{0}'")]
    UnknownClientType(String),

    #[error("Invalid permission name: '{0}'")]
    InvalidPermission(String),

    #[error("Invalid profile for client type '{client_type}': {reason}")]
    InvalidProfile { client_type: String, reason: String },
}

const MAX_CLIENT_ID_LENGTH: usize = 64;

/// Validate a client id
///
/// Rules:
/// - Cannot be empty
/// - Maximum 64 characters
/// - Alphanumeric characters plus `-`, `_` and `.`
/// - Must start with alphanumeric
pub fn validate_client_id(id: &str) -> Result<(), ClientValidationError> {
    let Some(first) = id.chars().next() else {
        return Err(ClientValidationError::EmptyId);
    };

    if id.len() > MAX_CLIENT_ID_LENGTH {
        return Err(ClientValidationError::TooLong(MAX_CLIENT_ID_LENGTH));
    }

    if !first.is_ascii_alphanumeric() {
        return Err(ClientValidationError::InvalidStart);
    }

    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(ClientValidationError::InvalidCharacter(c));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(validate_client_id("web_extension_v1").is_ok());
        assert!(validate_client_id("chatbot-telegram.prod").is_ok());
        assert!(validate_client_id("a").is_ok());
    }

    #[test]
    fn test_empty_id() {
        assert_eq!(validate_client_id(""), Err(ClientValidationError::EmptyId));
    }

    #[test]
    fn test_too_long() {
        let id = "a".repeat(65);
        assert_eq!(
            validate_client_id(&id),
            Err(ClientValidationError::TooLong(64))
        );
    }

    #[test]
    fn test_invalid_start() {
        assert_eq!(
            validate_client_id("_bot"),
            Err(ClientValidationError::InvalidStart)
        );
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(
            validate_client_id("bot:1"),
            Err(ClientValidationError::InvalidCharacter(':'))
        );
        assert_eq!(
            validate_client_id("bot 1"),
            Err(ClientValidationError::InvalidCharacter(' '))
        );
    }
}
