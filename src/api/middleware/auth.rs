//! Authorization gate middleware and the authenticated-client extractor

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::auth::{AuthError, AuthenticatedClient, Credential};
use crate::domain::rate_limit::RateLimitStatus;
use crate::infrastructure::auth::GateOutcome;

pub const API_KEY_HEADER: &str = "x-api-key";

static RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
static RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Credential presented with a request.
///
/// `Authorization: Bearer <token>` wins over `X-API-Key` when both are sent.
/// Headers that are not valid UTF-8 or are empty count as absent.
pub fn extract_credential(headers: &HeaderMap) -> Option<Credential> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(Credential::Bearer(token.to_string()));
    }

    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| Credential::ApiKey(key.to_string()))
}

/// Run every request through the authorization gate before its handler
pub async fn auth_gate_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let credential = extract_credential(request.headers());
    let path = request.uri().path().to_string();

    match state.gate.authorize(&path, credential).await {
        Ok(GateOutcome::Public) => next.run(request).await,
        Ok(GateOutcome::Authorized { client, rate_limit }) => {
            request.extensions_mut().insert(client);
            request.extensions_mut().insert(rate_limit);

            let mut response = next.run(request).await;
            insert_rate_limit_headers(
                response.headers_mut(),
                rate_limit.limit,
                rate_limit.remaining,
                rate_limit.reset_after_secs,
            );
            response
        }
        Err(err) => {
            let limited = match err {
                AuthError::RateLimited {
                    limit,
                    retry_after_secs,
                } => Some((limit, retry_after_secs)),
                _ => None,
            };

            let mut response = ApiError::from(err).into_response();
            if let Some((limit, retry_after_secs)) = limited {
                insert_rate_limit_headers(response.headers_mut(), limit, 0, retry_after_secs);
            }
            response
        }
    }
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset: u64) {
    headers.insert(RATE_LIMIT_LIMIT.clone(), HeaderValue::from(limit));
    headers.insert(RATE_LIMIT_REMAINING.clone(), HeaderValue::from(remaining));
    headers.insert(RATE_LIMIT_RESET.clone(), HeaderValue::from(reset));
}

/// Client the gate authorized for this request
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub client: AuthenticatedClient,
    pub rate_limit: Option<RateLimitStatus>,
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let client = parts
            .extensions
            .get::<AuthenticatedClient>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        Ok(Self {
            client,
            rate_limit: parts.extensions.get::<RateLimitStatus>().copied(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn test_bearer_takes_precedence() {
        let credential = extract_credential(&headers(&[
            ("authorization", "Bearer abc.def.ghi"),
            ("x-api-key", "mai_123"),
        ]));
        assert_eq!(credential, Some(Credential::Bearer("abc.def.ghi".to_string())));
    }

    #[test]
    fn test_api_key_header() {
        let credential = extract_credential(&headers(&[("x-api-key", " mai_123 ")]));
        assert_eq!(credential, Some(Credential::ApiKey("mai_123".to_string())));
    }

    #[test]
    fn test_non_bearer_authorization_falls_back_to_api_key() {
        let credential = extract_credential(&headers(&[
            ("authorization", "Basic dXNlcjpwYXNz"),
            ("x-api-key", "mai_123"),
        ]));
        assert_eq!(credential, Some(Credential::ApiKey("mai_123".to_string())));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let credential = extract_credential(&headers(&[("authorization", "bearer tok")]));
        assert_eq!(credential, Some(Credential::Bearer("tok".to_string())));
    }

    #[test]
    fn test_missing_or_empty() {
        assert_eq!(extract_credential(&HeaderMap::new()), None);
        assert_eq!(
            extract_credential(&headers(&[("authorization", "Bearer "), ("x-api-key", "")])),
            None
        );
    }
}
