//! Authorization domain: credentials, identities, token claims and the
//! endpoint policy table

mod claims;
mod credential;
mod error;
mod identity;
mod policy;

pub use claims::TokenClaims;
pub use credential::Credential;
pub use error::AuthError;
pub use identity::{AuthMethod, AuthenticatedClient};
pub use policy::{
    EndpointPolicy, EndpointPolicyConfig, PolicyTable, ProtectionLevel, ProtectionLevelKind,
    RoutePattern,
};
