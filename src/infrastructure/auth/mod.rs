//! Credential validation and the request authorization gate

mod gate;
mod jwt;
mod validator;

pub use gate::{AuthGate, GateOutcome};
pub use jwt::{IssuedToken, JwtConfig, JwtTokenService, TokenService};
pub use validator::CredentialValidator;
