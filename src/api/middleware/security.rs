//! Security headers and request screening

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::types::ApiError;

/// Largest accepted request body (1 MB)
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Add security headers to all responses
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}

/// Reject requests the policy table must never see: traversal paths and
/// oversized bodies
pub async fn request_screening_middleware(request: Request<Body>, next: Next) -> Response {
    if let Err(err) = validate_path(request.uri().path()) {
        return err.into_response();
    }

    let content_length = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if let Err(err) = validate_content_length(content_length) {
        return err.into_response();
    }

    next.run(request).await
}

pub fn validate_content_length(content_length: Option<usize>) -> Result<(), ApiError> {
    match content_length {
        Some(len) if len > MAX_BODY_SIZE => {
            let mut err = ApiError::bad_request(format!(
                "Request body too large: {} bytes (max: {} bytes)",
                len, MAX_BODY_SIZE
            ));
            err.status = axum::http::StatusCode::PAYLOAD_TOO_LARGE;
            Err(err)
        }
        _ => Ok(()),
    }
}

pub fn validate_path(path: &str) -> Result<(), ApiError> {
    if path.split('/').any(|segment| segment == "..") || path.contains("//") {
        return Err(ApiError::bad_request("Invalid path: path traversal detected"));
    }

    if path.contains('\0') {
        return Err(ApiError::bad_request("Invalid request: prohibited characters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_validate_content_length() {
        assert!(validate_content_length(Some(1000)).is_ok());
        assert!(validate_content_length(Some(MAX_BODY_SIZE)).is_ok());
        assert!(validate_content_length(None).is_ok());

        let err = validate_content_length(Some(MAX_BODY_SIZE + 1)).unwrap_err();
        assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("/email/v1/analyze").is_ok());
        assert!(validate_path("/auth/keys/abc..def").is_ok());
        assert!(validate_path("/email/../auth/keys").is_err());
        assert!(validate_path("/email//v1/analyze").is_err());
        assert!(validate_path("/email/v1\0").is_err());
    }
}
