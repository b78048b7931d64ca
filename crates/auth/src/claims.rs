use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::principal::UserId;

/// Claim names managed by the token layer itself.
///
/// These are written from [`crate::TokenSettings`] and the clock at signing
/// time; application claims may not shadow them.
pub(crate) const RESERVED_CLAIMS: [&str; 5] = ["iss", "aud", "sub", "nbf", "exp"];

const ROLES_CLAIM: &str = "roles";
const GROUPS_CLAIM: &str = "groups";
const PERMISSIONS_CLAIM: &str = "permissions";

/// The application claim set carried by an access token.
///
/// A subject plus an ordered map of application-defined claims. Issuer,
/// audience and the validity window are *not* part of the set; they belong
/// to the token envelope and are supplied by the token manager.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    subject: UserId,
    claims: BTreeMap<String, JsonValue>,
}

impl ClaimSet {
    pub fn new(subject: UserId) -> Self {
        Self {
            subject,
            claims: BTreeMap::new(),
        }
    }

    pub fn subject(&self) -> UserId {
        self.subject
    }

    /// Add an application claim.
    ///
    /// Registered claim names (`iss`, `aud`, `sub`, `nbf`, `exp`) are managed
    /// by the token layer and are ignored here.
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        let name = name.into();
        if !RESERVED_CLAIMS.contains(&name.as_str()) {
            self.claims.insert(name, value.into());
        }
        self
    }

    pub fn with_roles<I, S>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_string_list(ROLES_CLAIM, roles)
    }

    pub fn with_groups<I, S>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_string_list(GROUPS_CLAIM, groups)
    }

    pub fn with_permissions<I, S>(self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_string_list(PERMISSIONS_CLAIM, permissions)
    }

    pub fn claim(&self, name: &str) -> Option<&JsonValue> {
        self.claims.get(name)
    }

    pub fn claims(&self) -> &BTreeMap<String, JsonValue> {
        &self.claims
    }

    pub fn roles(&self) -> Vec<String> {
        self.string_list(ROLES_CLAIM)
    }

    pub fn groups(&self) -> Vec<String> {
        self.string_list(GROUPS_CLAIM)
    }

    pub fn permissions(&self) -> Vec<String> {
        self.string_list(PERMISSIONS_CLAIM)
    }

    pub(crate) fn from_parts(subject: UserId, claims: BTreeMap<String, JsonValue>) -> Self {
        Self { subject, claims }
    }

    fn with_string_list<I, S>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<JsonValue> = values
            .into_iter()
            .map(|v| JsonValue::String(v.into()))
            .collect();
        self.with_claim(name, JsonValue::Array(list))
    }

    fn string_list(&self, name: &str) -> Vec<String> {
        self.claims
            .get(name)
            .and_then(JsonValue::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
