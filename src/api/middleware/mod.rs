//! API middleware components

pub mod auth;
pub mod logging;
pub mod metrics;
pub mod security;

pub use auth::{auth_gate_middleware, extract_credential, Authenticated};
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use security::{request_screening_middleware, security_headers_middleware};
