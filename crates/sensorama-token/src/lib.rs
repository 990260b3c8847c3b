//! Session token decoding for Sensorama.
//!
//! The backend hands out a signed JWT at login. This crate reads it:
//!
//! - **Claims** ([`Claims`]): the typed payload (who, which profile,
//!   which roles, when it expires).
//! - **Codec** ([`TokenCodec`] trait, [`JwtCodec`]): turning the raw
//!   token string into claims, plus total projections over it.
//! - **Errors** ([`DecodeError`]): why a token couldn't be read.
//!
//! # Where it sits
//!
//! ```text
//! login API (raw token) → Token Codec (claims) → Session Store / Context
//! ```
//!
//! Nothing here verifies signatures or talks to storage. It only reads.

mod claims;
mod codec;
mod error;

pub use claims::Claims;
pub use codec::{JwtCodec, TokenCodec, decode, encode_unsigned, is_expired};
pub use error::DecodeError;
