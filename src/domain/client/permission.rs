//! Permissions and the permission checker

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::ClientValidationError;

/// Permission value that satisfies every permission check
pub const WILDCARD_PERMISSION: &str = "*";

/// A named capability gating access to a group of routes
///
/// Either the wildcard `*` or a lowercase snake_case name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(String);

impl Permission {
    pub const EMAIL_ANALYSIS: &'static str = "email_analysis";
    pub const WEBSITE_ANALYSIS: &'static str = "website_analysis";
    pub const SOCIAL_MEDIA_ANALYSIS: &'static str = "social_media_analysis";

    pub fn new(name: impl Into<String>) -> Result<Self, ClientValidationError> {
        let name = name.into();

        if name == WILDCARD_PERMISSION || is_permission_name(&name) {
            Ok(Self(name))
        } else {
            Err(ClientValidationError::InvalidPermission(name))
        }
    }

    pub fn wildcard() -> Self {
        Self(WILDCARD_PERMISSION.to_string())
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD_PERMISSION
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_permission_name(name: &str) -> bool {
    let mut chars = name.chars();

    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl TryFrom<String> for Permission {
    type Error = ClientValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered set of permissions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw permission names, rejecting invalid names
    pub fn from_names<I, S>(names: I) -> Result<Self, ClientValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(Permission::new).collect()
    }

    /// A set holding only the wildcard
    pub fn wildcard() -> Self {
        Self(BTreeSet::from([Permission::wildcard()]))
    }

    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    pub fn contains(&self, permission: &Permission) -> bool {
        self.0.contains(permission)
    }

    pub fn has_wildcard(&self) -> bool {
        self.0.iter().any(Permission::is_wildcard)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|p| p.as_str().to_string()).collect()
    }

    /// Whether a holder of this set may access a route requiring `required`.
    ///
    /// An empty requirement admits any authenticated identity. Otherwise the
    /// wildcard or any one of the required permissions is enough.
    pub fn satisfies(&self, required: &PermissionSet) -> bool {
        required.is_empty()
            || self.has_wildcard()
            || required.iter().any(|permission| self.contains(permission))
    }

    /// Whether every permission in this set is also held by `held`.
    ///
    /// Only a holder of the wildcard may pass the wildcard on.
    pub fn is_subset_of(&self, held: &PermissionSet) -> bool {
        held.has_wildcard() || self.0.iter().all(|permission| held.contains(permission))
    }

    /// Permissions in `self` that are neither in `granted` nor the wildcard
    pub fn not_granted_by<'a>(&'a self, granted: &'a PermissionSet) -> Vec<&'a Permission> {
        self.0
            .iter()
            .filter(|p| !p.is_wildcard() && !granted.contains(p))
            .collect()
    }

    pub fn extend(&mut self, other: &PermissionSet) {
        self.0.extend(other.0.iter().cloned());
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::collections::btree_set::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Permission::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> PermissionSet {
        PermissionSet::from_names(names.iter().copied()).unwrap()
    }

    #[test]
    fn test_permission_names() {
        assert!(Permission::new("email_analysis").is_ok());
        assert!(Permission::new("*").unwrap().is_wildcard());
        assert!(Permission::new("").is_err());
        assert!(Permission::new("Email").is_err());
        assert!(Permission::new("email analysis").is_err());
        assert!(Permission::new("_email").is_err());
    }

    #[test]
    fn test_empty_requirement_admits_anyone() {
        assert!(PermissionSet::new().satisfies(&PermissionSet::new()));
        assert!(set(&["email_analysis"]).satisfies(&PermissionSet::new()));
    }

    #[test]
    fn test_any_required_permission_is_enough() {
        let granted = set(&["email_analysis"]);

        assert!(granted.satisfies(&set(&["email_analysis", "website_analysis"])));
        assert!(!granted.satisfies(&set(&["website_analysis"])));
    }

    #[test]
    fn test_wildcard_satisfies_everything() {
        let admin = PermissionSet::wildcard();

        assert!(admin.satisfies(&set(&["website_analysis"])));
        assert!(admin.satisfies(&set(&["anything_else", "more"])));
    }

    #[test]
    fn test_missing_permissions_deny() {
        assert!(!PermissionSet::new().satisfies(&set(&["email_analysis"])));
    }

    #[test]
    fn test_subset_requires_every_permission() {
        let held = set(&["email_analysis", "website_analysis"]);

        assert!(set(&["email_analysis"]).is_subset_of(&held));
        assert!(PermissionSet::new().is_subset_of(&held));
        assert!(!set(&["email_analysis", "social_media_analysis"]).is_subset_of(&held));
        assert!(!set(&["email_analysis", "*"]).is_subset_of(&held));
        assert!(set(&["*"]).is_subset_of(&PermissionSet::wildcard()));
    }

    #[test]
    fn test_not_granted_by() {
        let required = set(&["email_analysis", "report_generation", "*"]);
        let granted = set(&["email_analysis"]);

        let missing: Vec<&str> = required
            .not_granted_by(&granted)
            .into_iter()
            .map(Permission::as_str)
            .collect();
        assert_eq!(missing, vec!["report_generation"]);
    }

    #[test]
    fn test_serializes_as_list() {
        let json = serde_json::to_string(&set(&["website_analysis", "email_analysis"])).unwrap();
        assert_eq!(json, r#"["email_analysis","website_analysis"]"#);

        let parsed: PermissionSet = serde_json::from_str(r#"["*"]"#).unwrap();
        assert!(parsed.has_wildcard());
        assert!(serde_json::from_str::<PermissionSet>(r#"["Bad"]"#).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            set(&["website_analysis", "email_analysis"]).to_string(),
            "email_analysis, website_analysis"
        );
    }
}
