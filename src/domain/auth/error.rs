use thiserror::Error;

/// Failures of the request authorization gate
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// Missing, malformed, unknown, revoked or expired credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credential without the permission the route requires
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limit of {limit} requests exceeded, retry after {retry_after_secs}s")]
    RateLimited { limit: u32, retry_after_secs: u64 },

    /// Inconsistent policy or client configuration, detected at startup
    #[error("Misconfigured: {0}")]
    Misconfigured(String),

    /// Credential or counter store could not be reached
    #[error("Authorization backend unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::Misconfigured(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Short label used for logs and metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::RateLimited { .. } => "rate_limited",
            Self::Misconfigured(_) => "misconfigured",
            Self::Unavailable(_) => "unavailable",
        }
    }
}
