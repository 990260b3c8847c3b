//! Error types for token decoding.

/// Why a token could not be turned into [`Claims`](crate::Claims).
///
/// Decoding is a boundary operation against an opaque string, so every
/// failure is recoverable. Callers usually treat any `DecodeError` as
/// "no claims available" rather than surfacing it to the user.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The token string was empty.
    #[error("token is empty")]
    Empty,

    /// The token has no payload segment (`header.payload.signature`).
    #[error("token has no payload segment")]
    MissingPayload,

    /// The payload segment is not valid base64url.
    #[error("payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload decoded to bytes, but not to the expected claims JSON.
    ///
    /// Covers malformed JSON as well as well-formed JSON that is missing
    /// a required claim (`sub`, `username`, `exp`).
    #[error("payload is not a valid claims object: {0}")]
    Json(#[from] serde_json::Error),
}
