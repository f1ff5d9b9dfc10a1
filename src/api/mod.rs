//! API layer - HTTP endpoints and middleware

pub mod analysis;
pub mod auth;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use router::{build_router, routes, validate_policies, RouteRegistry};
pub use state::AppState;
