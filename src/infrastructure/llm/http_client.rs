//! JSON-over-HTTP transport used by the chat provider

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::DomainError;

/// Upstream error bodies longer than this are cut before they reach logs
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Attribute the failure to a named upstream
    pub fn into_domain(self, provider: &str) -> DomainError {
        match self {
            Self::Timeout => DomainError::upstream_timeout(provider, self.to_string()),
            other => DomainError::provider(provider, other.to_string()),
        }
    }
}

#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    /// POST `body` as JSON with an optional bearer token and decode the JSON reply
    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Client whose requests fail with [`TransportError::Timeout`] after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(body: String) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body,
    }
}

fn send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TransportError> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Decode(e.to_string())
            }
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        let cut = truncate(body);
        assert_eq!(cut.len(), MAX_ERROR_BODY_CHARS + 3);
        assert!(cut.ends_with("..."));

        assert_eq!(truncate("short".to_string()), "short");
    }

    #[test]
    fn test_timeout_maps_to_upstream_timeout() {
        let err = TransportError::Timeout.into_domain("sea-lion");
        assert!(matches!(err, DomainError::UpstreamTimeout { ref provider, .. } if provider == "sea-lion"));

        let err = TransportError::Status {
            status: 503,
            body: "down".to_string(),
        }
        .into_domain("sea-lion");
        assert_eq!(err.to_string(), "Provider error: sea-lion - HTTP 503: down");
    }
}
