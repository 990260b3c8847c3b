//! The locally synthesized user record.

use sensorama_token::Claims;
use serde::{Deserialize, Serialize};

/// Who is logged in, as the UI sees it.
///
/// Built from token claims at login time. It is a cache of the claims,
/// never an independent source of truth: the token stays authoritative
/// and the user can always be re-derived from it.
///
/// The same value is kept in memory and persisted as JSON under
/// [`USER_KEY`](crate::USER_KEY). Optional fields are left out of the JSON
/// entirely when absent, so a round trip through storage is lossless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl User {
    /// Creates a user with just an id and a username.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: None,
            profile_id: None,
            roles: None,
        }
    }

    /// Derives the user record from decoded claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.subject.clone(),
            username: claims.username.clone(),
            email: None,
            profile_id: claims.linked_profile().map(str::to_owned),
            roles: Some(claims.roles.clone()),
        }
    }

    /// Returns `true` if `other` names the same account (id and username).
    pub fn same_identity(&self, other: &User) -> bool {
        self.id == other.id && self.username == other.username
    }
}
