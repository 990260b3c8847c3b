//! Token codec trait and the JWT implementation.
//!
//! A "token codec" turns the raw session token string into [`Claims`].
//! Like the other seams in Sensorama, it's a trait so tests and alternate
//! backends can swap in their own decoder, while the rest of the code
//! only depends on the interface.
//!
//! Every method here is total: any `&str`, including garbage, produces
//! either claims or a [`DecodeError`]. Nothing panics and nothing escapes
//! as a fatal error, because the projections are used in best-effort UI
//! contexts (showing a username, fetching a profile).

use std::time::SystemTime;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::{Claims, DecodeError};

/// base64url engine for JWT segments.
///
/// JWTs are supposed to strip padding, but some issuers keep it. Decoding
/// accepts both; encoding (used only by [`encode_unsigned`]) omits it.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes session tokens into claims.
///
/// Only [`decode`](Self::decode) must be implemented. The remaining
/// methods are projections built on top of it; each returns a neutral
/// value (`None`, empty `Vec`, "expired") when decoding fails.
pub trait TokenCodec: Send + Sync + 'static {
    /// Decodes the token's payload.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] for any token that does not carry a
    /// well-formed claims payload.
    fn decode(&self, token: &str) -> Result<Claims, DecodeError>;

    /// Returns `true` if the token is expired at `now`, or unreadable.
    ///
    /// Fails safe: a token we can't decode is never treated as valid.
    fn is_expired(&self, token: &str, now: SystemTime) -> bool {
        match self.decode(token) {
            Ok(claims) => claims.is_expired_at(now),
            Err(_) => true,
        }
    }

    /// The `sub` claim, if the token decodes and it is non-empty.
    fn subject(&self, token: &str) -> Option<String> {
        self.decode(token)
            .ok()
            .map(|c| c.subject)
            .filter(|s| !s.is_empty())
    }

    /// The `username` claim, if the token decodes and it is non-empty.
    fn username(&self, token: &str) -> Option<String> {
        self.decode(token)
            .ok()
            .map(|c| c.username)
            .filter(|s| !s.is_empty())
    }

    /// The `profileId` claim, if present and non-empty.
    fn profile_id(&self, token: &str) -> Option<String> {
        self.decode(token)
            .ok()
            .and_then(|c| c.profile_id)
            .filter(|s| !s.is_empty())
    }

    /// The `roles` claim, or an empty list.
    fn roles(&self, token: &str) -> Vec<String> {
        self.decode(token).map(|c| c.roles).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// JwtCodec
// ---------------------------------------------------------------------------

/// Reads the payload segment of a compact JWT (`header.payload.signature`).
///
/// The header and signature are ignored. Signature checks belong to the
/// backend, which re-validates the token on every request anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtCodec;

impl TokenCodec for JwtCodec {
    fn decode(&self, token: &str) -> Result<Claims, DecodeError> {
        if token.is_empty() {
            return Err(DecodeError::Empty);
        }

        let payload = token
            .split('.')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or(DecodeError::MissingPayload)?;

        let bytes = SEGMENT_ENGINE.decode(payload)?;
        let claims = serde_json::from_slice(&bytes)?;
        Ok(claims)
    }
}

// ---------------------------------------------------------------------------
// Free-function shorthands
// ---------------------------------------------------------------------------

/// Decodes a token with [`JwtCodec`], logging failures at debug level.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    JwtCodec.decode(token).inspect_err(|e| {
        tracing::debug!(error = %e, "could not decode session token");
    })
}

/// [`TokenCodec::is_expired`] with [`JwtCodec`].
pub fn is_expired(token: &str, now: SystemTime) -> bool {
    JwtCodec.is_expired(token, now)
}

/// Builds an unsigned compact JWT carrying `claims`.
///
/// The header says `"alg":"none"` and the signature segment is empty.
/// Useful for tests and offline demos; the real backend never accepts it.
pub fn encode_unsigned(claims: &Claims) -> String {
    let header = SEGMENT_ENGINE.encode(br#"{"alg":"none","typ":"JWT"}"#);
    // Claims has only strings, integers, and string lists: serializing
    // it cannot fail.
    let payload = serde_json::to_vec(claims).expect("claims serialize to JSON");
    format!("{header}.{}.", SEGMENT_ENGINE.encode(payload))
}
