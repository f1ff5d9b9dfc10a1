//! Infrastructure layer - External service implementations

pub mod analysis;
pub mod api_key;
pub mod auth;
pub mod llm;
pub mod observability;
pub mod rate_limit;
pub mod services;
