//! Endpoint policy table
//!
//! Maps route paths to the protection they require. The table is built once at
//! startup and shared read-only with the gate. Paths that match no entry
//! require authentication without any specific permission.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::identity::AuthenticatedClient;
use crate::domain::client::{Permission, PermissionSet};

static DEFAULT_LEVEL: ProtectionLevel = ProtectionLevel::Authenticated;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
}

/// Route path with optional `{param}` segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(path: &str) -> Result<Self, AuthError> {
        let rest = path
            .strip_prefix('/')
            .ok_or_else(|| AuthError::misconfigured(format!("Route '{}' must start with '/'", path)))?;

        let segments = rest
            .split('/')
            .map(|segment| parse_segment(path, segment))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether a concrete request path matches this pattern
    pub fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };

        let parts: Vec<&str> = rest.split('/').collect();
        parts.len() == self.segments.len()
            && self.segments.iter().zip(parts).all(|(segment, part)| match segment {
                Segment::Literal(literal) => literal == part,
                Segment::Param => !part.is_empty(),
            })
    }

    /// Whether every path matched by `route` is also matched by this pattern
    pub fn covers(&self, route: &RoutePattern) -> bool {
        self.segments.len() == route.segments.len()
            && self
                .segments
                .iter()
                .zip(&route.segments)
                .all(|(own, other)| match (own, other) {
                    (Segment::Param, Segment::Param) => true,
                    (Segment::Param, Segment::Literal(literal)) => !literal.is_empty(),
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Literal(_), Segment::Param) => false,
                })
    }
}

fn parse_segment(path: &str, segment: &str) -> Result<Segment, AuthError> {
    match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(name) if !name.is_empty() && !name.contains(is_brace) => Ok(Segment::Param),
        Some(_) => Err(AuthError::misconfigured(format!(
            "Route '{}' has an invalid parameter segment '{}'",
            path, segment
        ))),
        None if segment.contains(is_brace) => Err(AuthError::misconfigured(format!(
            "Route '{}' has an invalid segment '{}'",
            path, segment
        ))),
        None => Ok(Segment::Literal(segment.to_string())),
    }
}

fn is_brace(c: char) -> bool {
    c == '{' || c == '}'
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Protection required by a route
#[derive(Debug, Clone, PartialEq)]
pub enum ProtectionLevel {
    /// No credential needed
    Public,
    /// Any valid credential
    Authenticated,
    /// Any one of the listed permissions, or the wildcard
    Permission(PermissionSet),
    /// Wildcard permission only
    Admin,
}

impl ProtectionLevel {
    pub fn kind(&self) -> ProtectionLevelKind {
        match self {
            Self::Public => ProtectionLevelKind::Public,
            Self::Authenticated => ProtectionLevelKind::Authenticated,
            Self::Permission(_) => ProtectionLevelKind::Permission,
            Self::Admin => ProtectionLevelKind::Admin,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    pub fn required_permissions(&self) -> Option<&PermissionSet> {
        match self {
            Self::Permission(required) => Some(required),
            _ => None,
        }
    }

    /// Permission check for an authenticated caller
    pub fn authorize(&self, client: &AuthenticatedClient) -> Result<(), AuthError> {
        match self {
            Self::Public | Self::Authenticated => Ok(()),
            Self::Permission(required) if client.permissions.satisfies(required) => Ok(()),
            Self::Permission(required) => Err(AuthError::forbidden(format!(
                "One of these permissions required: {}",
                required
            ))),
            Self::Admin if client.is_admin() => Ok(()),
            Self::Admin => Err(AuthError::forbidden("Admin permissions required")),
        }
    }
}

/// Protection level name as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionLevelKind {
    Public,
    Authenticated,
    Permission,
    Admin,
}

/// One row of the policy table
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointPolicy {
    pub pattern: RoutePattern,
    pub level: ProtectionLevel,
}

impl EndpointPolicy {
    pub fn new(path: &str, level: ProtectionLevel) -> Result<Self, AuthError> {
        Ok(Self {
            pattern: RoutePattern::parse(path)?,
            level,
        })
    }

    pub fn public(path: &str) -> Result<Self, AuthError> {
        Self::new(path, ProtectionLevel::Public)
    }

    pub fn authenticated(path: &str) -> Result<Self, AuthError> {
        Self::new(path, ProtectionLevel::Authenticated)
    }

    pub fn admin(path: &str) -> Result<Self, AuthError> {
        Self::new(path, ProtectionLevel::Admin)
    }

    pub fn permission(path: &str, permissions: &[&str]) -> Result<Self, AuthError> {
        let required = PermissionSet::from_names(permissions.iter().copied())
            .map_err(|e| AuthError::misconfigured(format!("Route '{}': {}", path, e)))?;
        Self::new(path, ProtectionLevel::Permission(required))
    }
}

/// Policy entry as read from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointPolicyConfig {
    pub path: String,
    pub level: ProtectionLevelKind,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl TryFrom<EndpointPolicyConfig> for EndpointPolicy {
    type Error = AuthError;

    fn try_from(config: EndpointPolicyConfig) -> Result<Self, Self::Error> {
        if config.level != ProtectionLevelKind::Permission && !config.permissions.is_empty() {
            return Err(AuthError::misconfigured(format!(
                "Route '{}' lists permissions but its level is not 'permission'",
                config.path
            )));
        }

        let level = match config.level {
            ProtectionLevelKind::Public => ProtectionLevel::Public,
            ProtectionLevelKind::Authenticated => ProtectionLevel::Authenticated,
            ProtectionLevelKind::Admin => ProtectionLevel::Admin,
            ProtectionLevelKind::Permission => ProtectionLevel::Permission(
                PermissionSet::from_names(config.permissions)
                    .map_err(|e| AuthError::misconfigured(format!("Route '{}': {}", config.path, e)))?,
            ),
        };

        EndpointPolicy::new(&config.path, level)
    }
}

/// Immutable, ordered policy table. The first matching entry wins.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: Vec<EndpointPolicy>,
}

impl PolicyTable {
    pub fn new(policies: Vec<EndpointPolicy>) -> Self {
        Self { policies }
    }

    pub fn from_config(entries: Vec<EndpointPolicyConfig>) -> Result<Self, AuthError> {
        let policies = entries
            .into_iter()
            .map(EndpointPolicy::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(policies))
    }

    /// Default table for the routes this service exposes
    pub fn builtin() -> Result<Self, AuthError> {
        let email = [Permission::EMAIL_ANALYSIS];
        let social = [Permission::SOCIAL_MEDIA_ANALYSIS];
        let website = [Permission::WEBSITE_ANALYSIS];

        Ok(Self::new(vec![
            EndpointPolicy::public("/")?,
            EndpointPolicy::public("/health")?,
            EndpointPolicy::public("/ready")?,
            EndpointPolicy::public("/live")?,
            EndpointPolicy::public("/metrics")?,
            // auth
            EndpointPolicy::public("/auth/health")?,
            EndpointPolicy::authenticated("/auth/token")?,
            EndpointPolicy::authenticated("/auth/verify")?,
            EndpointPolicy::admin("/auth/api-key")?,
            EndpointPolicy::admin("/auth/keys")?,
            EndpointPolicy::admin("/auth/keys/{key_id}")?,
            // email
            EndpointPolicy::public("/email/")?,
            EndpointPolicy::permission("/email/v1/analyze", &email)?,
            EndpointPolicy::permission("/email/v1/translate", &email)?,
            EndpointPolicy::permission("/email/v2/analyze", &email)?,
            // social media
            EndpointPolicy::public("/socialmedia/")?,
            EndpointPolicy::permission("/socialmedia/v1/analyze", &social)?,
            EndpointPolicy::permission("/socialmedia/v1/translate", &social)?,
            // website
            EndpointPolicy::public("/website/")?,
            EndpointPolicy::permission("/website/v1/analyze", &website)?,
            EndpointPolicy::permission("/website/v1/translate", &website)?,
            EndpointPolicy::permission("/website/v2/analyze", &website)?,
        ]))
    }

    pub fn policies(&self) -> &[EndpointPolicy] {
        &self.policies
    }

    /// First entry matching the request path
    pub fn resolve(&self, path: &str) -> Option<&EndpointPolicy> {
        self.policies.iter().find(|policy| policy.pattern.matches(path))
    }

    /// Protection for a request path, defaulting to authentication required
    pub fn level_for(&self, path: &str) -> &ProtectionLevel {
        self.resolve(path)
            .map(|policy| &policy.level)
            .unwrap_or(&DEFAULT_LEVEL)
    }

    /// Fail if any live route is covered by no entry
    pub fn ensure_covers<'a>(
        &self,
        routes: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), AuthError> {
        let mut uncovered = Vec::new();

        for route in routes {
            let route_pattern = RoutePattern::parse(route)?;
            if !self.policies.iter().any(|p| p.pattern.covers(&route_pattern)) {
                uncovered.push(route.to_string());
            }
        }

        if uncovered.is_empty() {
            Ok(())
        } else {
            Err(AuthError::misconfigured(format!(
                "Routes without an endpoint policy: {}",
                uncovered.join(", ")
            )))
        }
    }

    /// Fail if an entry requires a permission no client type can hold
    pub fn ensure_grantable(&self, granted: &PermissionSet) -> Result<(), AuthError> {
        for policy in &self.policies {
            let Some(required) = policy.level.required_permissions() else {
                continue;
            };

            let missing = required.not_granted_by(granted);
            if let Some(permission) = missing.first() {
                return Err(AuthError::misconfigured(format!(
                    "Policy for '{}' requires permission '{}' which no client type grants",
                    policy.pattern, permission
                )));
            }
        }

        Ok(())
    }
}
