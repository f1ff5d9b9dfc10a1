//! Per client type rate limits and default grants

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::entity::ClientType;
use super::permission::{Permission, PermissionSet};
use super::validation::ClientValidationError;

/// Ceiling of requests allowed within a fixed window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitRule {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    pub fn per_hour(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(3600))
    }
}

/// Rate limit and default permissions for one client type
#[derive(Debug, Clone, PartialEq)]
pub struct ClientProfile {
    pub rate_limit: RateLimitRule,
    pub permissions: PermissionSet,
}

impl ClientProfile {
    pub fn new(rate_limit: RateLimitRule, permissions: PermissionSet) -> Self {
        Self {
            rate_limit,
            permissions,
        }
    }
}

/// Profiles for every client type
#[derive(Debug, Clone)]
pub struct ClientProfiles {
    profiles: BTreeMap<ClientType, ClientProfile>,
}

impl ClientProfiles {
    /// Build the registry. Every client type needs a profile with a non-zero
    /// ceiling and window.
    pub fn new(
        profiles: impl IntoIterator<Item = (ClientType, ClientProfile)>,
    ) -> Result<Self, ClientValidationError> {
        let profiles: BTreeMap<_, _> = profiles.into_iter().collect();

        for client_type in ClientType::ALL {
            let invalid = |reason: &str| ClientValidationError::InvalidProfile {
                client_type: client_type.to_string(),
                reason: reason.to_string(),
            };

            let profile = profiles
                .get(&client_type)
                .ok_or_else(|| invalid("no profile configured"))?;

            if profile.rate_limit.max_requests == 0 {
                return Err(invalid("rate limit must be greater than zero"));
            }

            if profile.rate_limit.window.is_zero() {
                return Err(invalid("rate limit window must be greater than zero"));
            }
        }

        Ok(Self { profiles })
    }

    /// Built-in profiles
    pub fn builtin() -> Self {
        let analysis_all = analysis_permissions(&[
            Permission::EMAIL_ANALYSIS,
            Permission::WEBSITE_ANALYSIS,
            Permission::SOCIAL_MEDIA_ANALYSIS,
        ]);

        let profiles = BTreeMap::from([
            (
                ClientType::WebExtension,
                ClientProfile::new(RateLimitRule::per_hour(100), analysis_all.clone()),
            ),
            (
                ClientType::Chatbot,
                ClientProfile::new(
                    RateLimitRule::per_hour(1000),
                    analysis_permissions(&[
                        Permission::EMAIL_ANALYSIS,
                        Permission::SOCIAL_MEDIA_ANALYSIS,
                    ]),
                ),
            ),
            (
                ClientType::MobileApp,
                ClientProfile::new(RateLimitRule::per_hour(200), analysis_all),
            ),
            (
                ClientType::Admin,
                ClientProfile::new(RateLimitRule::per_hour(10_000), PermissionSet::wildcard()),
            ),
        ]);

        Self { profiles }
    }

    pub fn get(&self, client_type: ClientType) -> &ClientProfile {
        // `new` and `builtin` guarantee a profile for every client type
        &self.profiles[&client_type]
    }

    pub fn rate_limit(&self, client_type: ClientType) -> RateLimitRule {
        self.get(client_type).rate_limit
    }

    pub fn default_permissions(&self, client_type: ClientType) -> &PermissionSet {
        &self.get(client_type).permissions
    }

    /// Union of the default grants of all client types
    pub fn granted_permissions(&self) -> PermissionSet {
        let mut granted = PermissionSet::new();
        for profile in self.profiles.values() {
            granted.extend(&profile.permissions);
        }
        granted
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClientType, &ClientProfile)> {
        self.profiles.iter()
    }
}

impl Default for ClientProfiles {
    fn default() -> Self {
        Self::builtin()
    }
}

fn analysis_permissions(names: &[&str]) -> PermissionSet {
    names
        .iter()
        .filter_map(|name| Permission::new(*name).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let profiles = ClientProfiles::builtin();

        assert_eq!(profiles.rate_limit(ClientType::WebExtension).max_requests, 100);
        assert_eq!(profiles.rate_limit(ClientType::Chatbot).max_requests, 1000);
        assert_eq!(
            profiles.rate_limit(ClientType::MobileApp).window,
            Duration::from_secs(3600)
        );
        assert!(profiles.default_permissions(ClientType::Admin).has_wildcard());
        assert!(!profiles.default_permissions(ClientType::Chatbot).has_wildcard());
    }

    #[test]
    fn test_granted_permissions_union() {
        let granted = ClientProfiles::builtin().granted_permissions();

        assert!(granted.has_wildcard());
        assert!(granted.contains(&Permission::new("website_analysis").unwrap()));
        assert_eq!(granted.len(), 4);
    }

    #[test]
    fn test_missing_profile_rejected() {
        let profiles = ClientProfiles::builtin();
        let partial: Vec<_> = profiles
            .iter()
            .filter(|(t, _)| **t != ClientType::Chatbot)
            .map(|(t, p)| (*t, p.clone()))
            .collect();

        let err = ClientProfiles::new(partial).unwrap_err();
        assert!(err.to_string().contains("chatbot"));
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let mut entries: Vec<_> = ClientProfiles::builtin()
            .iter()
            .map(|(t, p)| (*t, p.clone()))
            .collect();
        entries[0].1.rate_limit.max_requests = 0;

        assert!(matches!(
            ClientProfiles::new(entries),
            Err(ClientValidationError::InvalidProfile { .. })
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut entries: Vec<_> = ClientProfiles::builtin()
            .iter()
            .map(|(t, p)| (*t, p.clone()))
            .collect();
        entries[2].1.rate_limit.window = Duration::ZERO;

        assert!(ClientProfiles::new(entries).is_err());
    }
}
