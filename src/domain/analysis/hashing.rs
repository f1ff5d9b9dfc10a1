//! Content fingerprints used to reuse earlier analyses

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::url::ParsedUrl;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const HASH_LENGTH: usize = 16;

/// Lowercase, trim and collapse whitespace runs into a single space
pub fn normalize_text(text: &str) -> String {
    WHITESPACE
        .replace_all(text.trim(), " ")
        .to_lowercase()
}

/// Keep scheme, host and path, dropping query, fragment and trailing slashes.
/// Falls back to text normalization for anything that is not an absolute URL.
pub fn normalize_url(url: &str) -> String {
    match ParsedUrl::parse(url) {
        Some(parsed) => format!("{}://{}{}", parsed.scheme, parsed.host, parsed.path)
            .trim_end_matches('/')
            .to_lowercase(),
        None => normalize_text(url),
    }
}

/// Truncated hex SHA-256 of a fingerprint string
pub fn content_hash(fingerprint: &str) -> String {
    let digest = hex::encode(Sha256::digest(fingerprint.as_bytes()));
    digest[..HASH_LENGTH].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello \n\t World  "), "hello world");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("HTTPS://Example.com/Path/?utm=1#frag"),
            "https://example.com/path"
        );
        assert_eq!(normalize_url("https://example.com/"), "https://example.com");
        assert_eq!(normalize_url("  Not A URL "), "not a url");
    }

    #[test]
    fn test_content_hash_is_stable_and_short() {
        let a = content_hash("email:subject|body|from@example.com");
        let b = content_hash("email:subject|body|from@example.com");
        let c = content_hash("email:subject|body|other@example.com");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
