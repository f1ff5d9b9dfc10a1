//! Minimal URL splitting for hashing and signal extraction

/// Components of an absolute `scheme://host/path?query#fragment` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl<'a> {
    pub scheme: &'a str,
    /// Host including any port, without userinfo
    pub host: &'a str,
    pub path: &'a str,
    pub query: &'a str,
}

impl<'a> ParsedUrl<'a> {
    /// Split an absolute URL. Returns None when there is no scheme or host.
    pub fn parse(url: &'a str) -> Option<Self> {
        let url = url.trim();
        let (scheme, rest) = url.split_once("://")?;

        let valid_scheme = scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if scheme.is_empty() || !valid_scheme {
            return None;
        }

        let rest = rest.split('#').next().unwrap_or_default();
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));
        let authority_end = rest.find('/').unwrap_or(rest.len());
        let (authority, path) = rest.split_at(authority_end);
        let host = authority.rsplit('@').next().unwrap_or_default();

        if host.is_empty() {
            return None;
        }

        Some(Self {
            scheme,
            host,
            path,
            query,
        })
    }

    /// Lowercased host without port
    pub fn domain(&self) -> String {
        let host = match self.host.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => self.host,
        };
        host.to_lowercase()
    }
}
