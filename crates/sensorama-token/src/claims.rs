//! The decoded payload of a session token.
//!
//! The backend issues a signed JWT when a user logs in. This client never
//! verifies the signature (that is the server's job); it only reads the
//! payload to learn who is logged in and when the token stops being valid.
//!
//! [`Claims`] is a strict, typed view of that payload. Required fields are
//! plain values, optional ones are `Option`s. If the payload doesn't fit
//! this shape, decoding fails instead of handing back a half-filled map.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// Typed JWT payload as issued by the Sensorama backend.
///
/// The `#[serde(rename = "...")]` attributes map our descriptive field
/// names onto the short keys used on the wire (`sub`, `iat`, `exp`) and
/// onto the camelCase keys the backend picked (`profileId`).
///
/// ```json
/// {
///   "sub": "u1",
///   "username": "alice",
///   "profileId": "p1",
///   "roles": ["USER"],
///   "iat": 1700000000,
///   "exp": 1700086400
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Unique user identifier (`sub`).
    #[serde(rename = "sub")]
    pub subject: String,

    /// Display handle.
    pub username: String,

    /// Identifier of the linked profile record.
    ///
    /// `None` is a valid state: the account exists but no profile has
    /// been linked yet.
    #[serde(
        rename = "profileId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_id: Option<String>,

    /// Role labels. Order carries no meaning; may be empty.
    ///
    /// A missing key and an explicit `null` both decode as an empty list.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<String>,

    /// Issued-at, seconds since the Unix epoch (`iat`).
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,

    /// Expiry, seconds since the Unix epoch (`exp`).
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    /// Returns `true` if these claims have expired at `now`.
    ///
    /// The comparison is strict (`exp < now`), using fractional seconds
    /// for `now`. A token whose `exp` is exactly the current whole second
    /// is expired as soon as any part of that second has passed.
    ///
    /// Always pass the current wall-clock time. The stored token can
    /// outlive its validity across restarts, so an "is expired" flag must
    /// never be cached.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        (self.expires_at as f64) < unix_seconds(now)
    }

    /// The profile id, with an empty string treated as "no profile linked".
    pub fn linked_profile(&self) -> Option<&str> {
        self.profile_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Seconds since the Unix epoch as a float. Times before the epoch
/// clamp to zero.
fn unix_seconds(now: SystemTime) -> f64 {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer)
        .map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn claims_expiring_at(exp: i64) -> Claims {
        Claims {
            subject: "u1".into(),
            username: "alice".into(),
            profile_id: None,
            roles: vec![],
            issued_at: None,
            expires_at: exp,
        }
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_is_expired_at_past_exp_returns_true() {
        let claims = claims_expiring_at(1_000);
        assert!(claims.is_expired_at(at(1_010)));
    }

    #[test]
    fn test_is_expired_at_future_exp_returns_false() {
        let claims = claims_expiring_at(2_000);
        assert!(!claims.is_expired_at(at(1_000)));
    }

    #[test]
    fn test_is_expired_at_exact_second_returns_false() {
        let claims = claims_expiring_at(1_000);
        assert!(!claims.is_expired_at(at(1_000)));
        assert!(claims.is_expired_at(at(1_000) + Duration::from_millis(1)));
    }

    #[test]
    fn test_deserialize_wire_names() {
        let json = r#"{"sub":"u1","username":"alice","profileId":"p1",
                       "roles":["USER"],"iat":10,"exp":20}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.subject, "u1");
        assert_eq!(claims.profile_id.as_deref(), Some("p1"));
        assert_eq!(claims.roles, vec!["USER".to_string()]);
        assert_eq!(claims.issued_at, Some(10));
        assert_eq!(claims.expires_at, 20);
    }

    #[test]
    fn test_deserialize_null_roles_and_profile_are_absent() {
        let json =
            r#"{"sub":"u1","username":"alice","profileId":null,"roles":null,"exp":20}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert!(claims.roles.is_empty());
        assert!(claims.profile_id.is_none());
        assert!(claims.issued_at.is_none());
    }

    #[test]
    fn test_deserialize_missing_exp_fails() {
        let json = r#"{"sub":"u1","username":"alice"}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }

    #[test]
    fn test_linked_profile_empty_string_is_none() {
        let mut claims = claims_expiring_at(0);
        claims.profile_id = Some(String::new());
        assert_eq!(claims.linked_profile(), None);
    }
}
