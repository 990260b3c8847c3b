//! Request and response bodies exchanged with the backend.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Every successful response is wrapped in this envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseDto<T> {
    pub data: T,
    /// Server timestamp. Informational only.
    #[serde(default)]
    pub time: Option<String>,
}

/// Body of `POST /public/users/login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What the login endpoint returns inside the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Some backend versions echo the user; newer ones rely on the token's
    /// claims alone.
    #[serde(default)]
    pub user: Option<LoginUser>,
}

/// The user object optionally attached to a login response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /public/users/register`.
#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Brazilian tax id, digits only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    /// Eleven digits, area code first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl RegistrationRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("cpf", &self.cpf.as_ref().map(|_| "<redacted>"))
            .field("phone", &self.phone)
            .finish()
    }
}

/// A player's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Photo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Body of `PUT /profiles/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.birth_date.is_none()
            && self.photo.is_none()
    }
}

/// Backend ids arrive as JSON strings or numbers depending on the entity.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_without_user() {
        let body: ResponseDto<LoginResponse> =
            serde_json::from_str(r#"{"data":{"token":"a.b.c"},"time":"2024-01-01T00:00:00"}"#)
                .unwrap();
        assert_eq!(body.data.token, "a.b.c");
        assert_eq!(body.data.user, None);
    }

    #[test]
    fn test_login_user_numeric_id_becomes_string() {
        let body: LoginResponse =
            serde_json::from_str(r#"{"token":"t","user":{"id":42,"username":"ana"}}"#).unwrap();
        let user = body.user.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_profile_uses_camel_case_birth_date() {
        let profile: Profile =
            serde_json::from_str(r#"{"id":"p1","name":"Ana","birthDate":"2001-02-03"}"#).unwrap();
        assert_eq!(profile.birth_date.as_deref(), Some("2001-02-03"));

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["birthDate"], "2001-02-03");
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn test_update_profile_skips_absent_fields() {
        let update = UpdateProfile {
            phone: Some("11987654321".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"phone":"11987654321"}"#
        );
        assert!(!update.is_empty());
        assert!(UpdateProfile::default().is_empty());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("ana", "hunter2"));
        assert!(rendered.contains("ana"));
        assert!(!rendered.contains("hunter2"));
    }
}
