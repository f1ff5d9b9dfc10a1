//! Auth management endpoints
//!
//! Protection for each route comes from the policy table; handlers here only
//! apply the rules that depend on the request body.

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{delete, get, post},
};
use tracing::info;

use crate::api::middleware::Authenticated;
use crate::api::router::RouteRegistry;
use crate::api::state::AppState;
use crate::api::types::auth::{
    ApiKeyListResponse, ApiKeySummary, AuthHealthResponse, CreateApiKeyRequest,
    CreatedApiKeyResponse, TokenRequest, TokenResponse, VerifyResponse,
};
use crate::api::types::{ApiError, ApiResponse, Json};
use crate::domain::api_key::ApiKeyId;
use crate::domain::client::{ClientId, PermissionSet};

pub fn register_routes(registry: RouteRegistry) -> RouteRegistry {
    registry
        .route("/auth/token", post(issue_token))
        .route("/auth/api-key", post(create_api_key))
        .route("/auth/verify", get(verify))
        .route("/auth/keys", get(list_api_keys))
        .route("/auth/keys/{key_id}", delete(revoke_api_key))
        .route("/auth/health", get(auth_health))
}

/// POST /auth/token
///
/// Exchange the presented credential for a bearer token. Admins may mint a
/// token for any identity; other callers only for themselves, optionally with
/// fewer permissions.
pub async fn issue_token(
    State(state): State<AppState>,
    Authenticated { client, .. }: Authenticated,
    body: Bytes,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    let request: TokenRequest = if body.iter().all(u8::is_ascii_whitespace) {
        TokenRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON data: {}", e)))?
    };

    let client_id = match request.client_id {
        Some(id) => ClientId::new(id).map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => client.client_id.clone(),
    };
    let client_type = request.client_type.unwrap_or(client.client_type);
    let permissions = match request.permissions {
        Some(names) => {
            PermissionSet::from_names(names).map_err(|e| ApiError::bad_request(e.to_string()))?
        }
        None if client_type == client.client_type => client.permissions.clone(),
        None => state.profiles.default_permissions(client_type).clone(),
    };

    if !client.is_admin() {
        if client_id != client.client_id || client_type != client.client_type {
            return Err(ApiError::forbidden(
                "Only admin clients may issue tokens for another identity",
            ));
        }
        if !permissions.is_subset_of(&client.permissions) {
            return Err(ApiError::forbidden(
                "Requested permissions exceed the caller's permissions",
            ));
        }
    }

    let issued = state.tokens.issue(client_id, client_type, permissions)?;

    info!(
        issuer_client = %client.client_id,
        client_id = %issued.claims.client_id,
        client_type = %issued.claims.client_type,
        "Access token issued"
    );

    Ok(ApiResponse::ok(
        "Access token issued",
        TokenResponse {
            access_token: issued.token,
            token_type: "bearer",
            expires_at: issued.claims.expires_at(),
            permissions: issued.claims.permissions.names(),
            client_id: issued.claims.client_id,
            client_type: issued.claims.client_type,
        },
    ))
}

/// POST /auth/api-key
pub async fn create_api_key(
    State(state): State<AppState>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<ApiResponse<CreatedApiKeyResponse>, ApiError> {
    let client_id = ClientId::new(request.client_id)
        .map_err(|e| ApiError::bad_request(e.to_string()).with_param("client_id"))?;
    let permissions = match request.permissions {
        Some(names) => PermissionSet::from_names(names)
            .map_err(|e| ApiError::bad_request(e.to_string()).with_param("permissions"))?,
        None => state.profiles.default_permissions(request.client_type).clone(),
    };

    let issued = state
        .api_keys
        .issue(client_id, request.client_type, permissions, request.description)
        .await?;

    Ok(ApiResponse::created(
        "API key created. Store it now; it cannot be shown again",
        CreatedApiKeyResponse {
            api_key: issued.secret,
            key: ApiKeySummary::from(&issued.record),
        },
    ))
}

/// GET /auth/verify
pub async fn verify(
    Authenticated { client, rate_limit }: Authenticated,
) -> ApiResponse<VerifyResponse> {
    ApiResponse::ok("Credential is valid", VerifyResponse { client, rate_limit })
}

/// GET /auth/keys
pub async fn list_api_keys(
    State(state): State<AppState>,
) -> Result<ApiResponse<ApiKeyListResponse>, ApiError> {
    let keys: Vec<ApiKeySummary> = state
        .api_keys
        .list()
        .await?
        .iter()
        .map(ApiKeySummary::from)
        .collect();

    Ok(ApiResponse::ok(
        "API keys retrieved",
        ApiKeyListResponse {
            total: keys.len(),
            keys,
        },
    ))
}

/// DELETE /auth/keys/{key_id}
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Path(key_id): Path<String>,
) -> Result<ApiResponse<ApiKeySummary>, ApiError> {
    let id = ApiKeyId::new(key_id.as_str())
        .map_err(|_| ApiError::not_found(format!("API key '{}' not found", key_id)))?;

    let record = state.api_keys.revoke(&id).await?;

    Ok(ApiResponse::ok(
        "API key revoked",
        ApiKeySummary::from(&record),
    ))
}

/// GET /auth/health
pub async fn auth_health(State(state): State<AppState>) -> ApiResponse<AuthHealthResponse> {
    ApiResponse::ok(
        "Authentication service is healthy",
        AuthHealthResponse {
            status: "healthy",
            rate_limit_backend: state.gate.rate_limits().backend(),
        },
    )
}
