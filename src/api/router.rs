//! Router assembly
//!
//! Every route is added through [`RouteRegistry`] so the policy table can be
//! checked against the exact set of live paths before the server starts.

use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, MethodRouter},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::{
    auth_gate_middleware, logging_middleware, metrics_middleware, request_screening_middleware,
    security_headers_middleware,
};
use super::state::AppState;
use super::{analysis, auth, health};
use crate::domain::auth::{AuthError, PolicyTable};
use crate::domain::client::ClientProfiles;
use crate::infrastructure::observability::{metrics_handler, PrometheusMetrics};

/// Routes added so far, with their path templates
#[derive(Default)]
pub struct RouteRegistry {
    router: Router<AppState>,
    paths: Vec<String>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, method_router: MethodRouter<AppState>) -> Self {
        self.router = self.router.route(path, method_router);
        self.paths.push(path.to_string());
        self
    }

    /// Mount a router that carries its own state, such as the metrics endpoint
    pub fn merge(mut self, path: &str, router: Router<AppState>) -> Self {
        self.router = self.router.merge(router);
        self.paths.push(path.to_string());
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

/// Every application route. Metrics are mounted when a recorder is given.
pub fn routes(metrics: Option<(&str, PrometheusMetrics)>) -> RouteRegistry {
    let mut registry = RouteRegistry::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check));

    registry = auth::register_routes(registry);
    registry = analysis::register_routes(registry);

    if let Some((path, metrics)) = metrics {
        let metrics_router = Router::new()
            .route(path, get(metrics_handler))
            .with_state(metrics);
        registry = registry.merge(path, metrics_router);
    }

    registry
}

/// Fail when a live route has no policy or a policy names a permission no
/// client type can hold
pub fn validate_policies(
    registry: &RouteRegistry,
    policies: &PolicyTable,
    profiles: &ClientProfiles,
) -> Result<(), AuthError> {
    policies.ensure_covers(registry.paths())?;
    policies.ensure_grantable(&profiles.granted_permissions())
}

/// Attach middleware and state. The gate runs innermost so it sees the
/// matched route; CORS runs outermost so preflights never reach the gate.
pub fn build_router(registry: RouteRegistry, state: AppState, cors_origins: &[String]) -> Router {
    registry
        .router
        .layer(from_fn_with_state(state.clone(), auth_gate_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(logging_middleware))
        .layer(from_fn(request_screening_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([
            axum::http::header::RETRY_AFTER,
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderName::from_static("x-ratelimit-reset"),
        ]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    layer.allow_origin(origins)
}
