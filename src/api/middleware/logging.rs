//! Request logging with credential redaction

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Headers worth logging. Credential-bearing ones are redacted.
const LOGGED_HEADERS: [&str; 8] = [
    "content-type",
    "content-length",
    "user-agent",
    "x-forwarded-for",
    "x-real-ip",
    "origin",
    "authorization",
    "x-api-key",
];

/// Logs method, matched path, status, latency and request id for every request.
/// The request id is taken from `x-request-id` or generated, and echoed back.
pub async fn logging_middleware(mut request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = matched_path(&request);
    let request_id = ensure_request_id(request.headers_mut());

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        headers = %describe_headers(request.headers()),
        "Incoming request"
    );

    let mut response = next.run(request).await;
    let status = response.status();
    let latency_ms = start.elapsed().as_millis();

    if status.is_server_error() {
        warn!(method = %method, path = %path, status = status.as_u16(), latency_ms, request_id = %request_id, "Request failed");
    } else {
        info!(method = %method, path = %path, status = status.as_u16(), latency_ms, request_id = %request_id, "Request completed");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn matched_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn ensure_request_id(headers: &mut HeaderMap) -> String {
    if let Some(id) = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return id.to_string();
    }

    let id = uuid::Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    id
}

fn describe_headers(headers: &HeaderMap) -> String {
    LOGGED_HEADERS
        .iter()
        .filter_map(|name| {
            let value = headers.get(*name)?;
            let shown = if is_sensitive_header(name) {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            Some(format!("{}={}", name, shown))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization" | "x-api-key" | "cookie" | "set-cookie" | "proxy-authorization"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_are_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer secret.jwt"));
        headers.insert("x-api-key", HeaderValue::from_static("mai_deadbeef"));
        headers.insert("user-agent", HeaderValue::from_static("scam-checker/1.0"));
        headers.insert("cache-control", HeaderValue::from_static("no-cache"));

        let described = describe_headers(&headers);

        assert!(!described.contains("secret.jwt"));
        assert!(!described.contains("deadbeef"));
        assert!(described.contains("x-api-key=[REDACTED]"));
        assert!(described.contains("user-agent=scam-checker/1.0"));
        assert!(!described.contains("cache-control"));
    }

    #[test]
    fn test_request_id_is_kept_or_generated() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-42"));
        assert_eq!(ensure_request_id(&mut headers), "req-42");

        let mut headers = HeaderMap::new();
        let generated = ensure_request_id(&mut headers);
        assert_eq!(generated.len(), 36);
        assert_eq!(headers[REQUEST_ID_HEADER], generated.as_str());
    }
}
