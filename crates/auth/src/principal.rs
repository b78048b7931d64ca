use core::str::FromStr;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::claims::ClaimSet;

/// Identity of an authenticated user.
///
/// User ids are integers end to end: they appear as the token subject and are
/// interpolated into the refresh-token cache key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for UserId {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Capability view of the current caller.
///
/// Consumers (the menu builder in particular) only ever ask membership
/// questions; how the answers are derived (claims, a policy store, a test
/// fixture) is the implementor's business.
pub trait Principal: Send + Sync {
    fn user_id(&self) -> UserId;

    fn has_permission(&self, permission: &str) -> bool;

    fn is_in_role(&self, role: &str) -> bool;

    fn is_in_group(&self, group: &str) -> bool;
}

/// A principal resolved from a validated claim set.
///
/// Grants are opaque strings. The wildcard permission `"*"` grants every
/// permission without enumerating domain permissions in tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrincipal {
    user_id: UserId,
    permissions: HashSet<String>,
    roles: HashSet<String>,
    groups: HashSet<String>,
}

impl ResolvedPrincipal {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            permissions: HashSet::new(),
            roles: HashSet::new(),
            groups: HashSet::new(),
        }
    }

    /// Build a principal from the grant claims of a validated token.
    pub fn from_claims(claims: &ClaimSet) -> Self {
        Self::new(claims.subject())
            .with_permissions(claims.permissions())
            .with_roles(claims.roles())
            .with_groups(claims.groups())
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }
}

impl Principal for ResolvedPrincipal {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains("*") || self.permissions.contains(permission)
    }

    fn is_in_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    fn is_in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}
