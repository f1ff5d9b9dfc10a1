//! Request, response and error bodies

pub mod analysis;
pub mod auth;
pub mod envelope;
pub mod error;
pub mod json;

pub use envelope::ApiResponse;
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
