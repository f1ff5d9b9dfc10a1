//! Client domain
//!
//! Callers are identified by a client id and categorized by client type.
//! Each client type carries its own rate-limit rule and default permission grant.

mod entity;
mod permission;
mod profile;
mod validation;

pub use entity::{rate_limit_key, ClientId, ClientType};
pub use permission::{Permission, PermissionSet, WILDCARD_PERMISSION};
pub use profile::{ClientProfile, ClientProfiles, RateLimitRule};
pub use validation::{validate_client_id, ClientValidationError};
