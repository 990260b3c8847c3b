//! Error types for the API client.

use reqwest::StatusCode;

/// Result type alias for API client operations.
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Errors returned by [`ApiClient`](crate::ApiClient).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server did not answer within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    ///
    /// `message` is taken from the body's `message` or `error` field when
    /// the backend sends one, otherwise from the status reason.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not the expected JSON shape.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The client configuration is unusable.
    #[error("invalid API configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// The HTTP status, for [`Status`](Self::Status) errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Builds a [`Status`](Self::Status) error from a failed response body.
    pub(crate) fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["message", "error"].iter().find_map(|key| {
                    value
                        .get(key)
                        .and_then(|v| v.as_str())
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned)
                })
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
            });

        Self::Status {
            status: status.as_u16(),
            message,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_prefers_message_field() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            br#"{"message":"Bad credentials","error":"Unauthorized"}"#,
        );
        assert!(matches!(
            err,
            ApiError::Status { status: 401, ref message } if message == "Bad credentials"
        ));
    }

    #[test]
    fn test_from_status_falls_back_to_error_field() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, br#"{"error":"Forbidden zone"}"#);
        assert!(matches!(
            err,
            ApiError::Status { status: 403, ref message } if message == "Forbidden zone"
        ));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_from_status_non_json_body_uses_reason() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert!(matches!(
            err,
            ApiError::Status { status: 500, ref message } if message == "Internal Server Error"
        ));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_from_status_empty_message_uses_reason() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, br#"{"message":""}"#);
        assert!(matches!(
            err,
            ApiError::Status { status: 404, ref message } if message == "Not Found"
        ));
    }
}
