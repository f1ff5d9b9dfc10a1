//! Client identity types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::validation::{validate_client_id, ClientValidationError};

/// Client identifier - alphanumeric plus `-`, `_`, `.`, max 64 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Create a new ClientId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, ClientValidationError> {
        let id = id.into();
        validate_client_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = ClientValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    WebExtension,
    Chatbot,
    MobileApp,
    Admin,
}

impl ClientType {
    pub const ALL: [ClientType; 4] = [
        ClientType::WebExtension,
        ClientType::Chatbot,
        ClientType::MobileApp,
        ClientType::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebExtension => "web_extension",
            Self::Chatbot => "chatbot",
            Self::MobileApp => "mobile_app",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientType {
    type Err = ClientValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ClientValidationError::UnknownClientType(s.to_string()))
    }
}

/// Counter key shared by every credential of one client: `{client_type}:{client_id}`
pub fn rate_limit_key(client_type: ClientType, client_id: &ClientId) -> String {
    format!("{}:{}", client_type, client_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_rejects_invalid() {
        assert!(ClientId::new("chatbot_v1").is_ok());
        assert!(ClientId::new("").is_err());
        assert!(serde_json::from_str::<ClientId>("\"bad id\"").is_err());
    }

    #[test]
    fn test_client_type_round_trip_names() {
        for client_type in ClientType::ALL {
            let parsed: ClientType = client_type.as_str().parse().unwrap();
            assert_eq!(parsed, client_type);

            let json = serde_json::to_string(&client_type).unwrap();
            assert_eq!(json, format!("\"{}\"", client_type.as_str()));
        }
    }

    #[test]
    fn test_unknown_client_type() {
        let err = "api_client".parse::<ClientType>().unwrap_err();
        assert_eq!(
            err,
            ClientValidationError::UnknownClientType("api_client".to_string())
        );
    }
}
