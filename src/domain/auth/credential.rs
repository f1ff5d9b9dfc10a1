use std::fmt;

/// Raw credential presented by a caller
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Value of the `X-API-Key` header
    ApiKey(String),
    /// Token from `Authorization: Bearer <token>`
    Bearer(String),
}

impl Credential {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "api_key",
            Self::Bearer(_) => "bearer",
        }
    }

    pub fn secret(&self) -> &str {
        match self {
            Self::ApiKey(value) | Self::Bearer(value) => value,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(self.kind()).field(&"[REDACTED]").finish()
    }
}
