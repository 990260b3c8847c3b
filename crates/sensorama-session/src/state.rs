//! Session state types: what the rest of the app observes.
//!
//! The authentication state machine has three states:
//!
//! ```text
//!   Unknown ──(initialize)──→ Authenticated ⇄ Unauthenticated
//!                      └────→ Unauthenticated
//! ```
//!
//! - **Unknown**: the process just started and storage hasn't been read.
//! - **Authenticated**: a token and its user are held (and were persisted).
//! - **Unauthenticated**: nobody is logged in.
//!
//! There is no way back to `Unknown` once storage has been read.

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session context.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Restore a stored session even if its token's `exp` has passed.
    ///
    /// Default: `false`. The stored token is checked against the clock
    /// at startup, and an expired one is discarded. Tokens that can't be
    /// decoded are opaque to the client and are always restored; the
    /// backend decides whether they are still good.
    pub restore_expired: bool,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The authentication state.
///
/// `Authenticated` carries the token and user together, so a state with
/// only one of them can't be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Storage hasn't been read yet.
    Unknown,

    /// Logged in.
    Authenticated { token: String, user: crate::User },

    /// Logged out (or never logged in).
    Unauthenticated,
}

impl SessionState {
    /// `true` for `Authenticated` with a non-empty token.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { token, .. } if !token.is_empty())
    }

    /// `true` until storage has been read.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// What subscribers of the session see on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    /// The current authentication state.
    pub state: SessionState,

    /// `true` while a login or logout is being persisted.
    ///
    /// The state itself is not touched until that work finishes.
    pub busy: bool,

    /// Bumped on every state transition (not on `busy` changes or user
    /// edits). Lets observers act once per transition.
    pub generation: u64,
}

impl SessionStatus {
    pub(crate) fn initial() -> Self {
        Self {
            state: SessionState::Unknown,
            busy: false,
            generation: 0,
        }
    }

    /// `true` while storage hasn't been read or an operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.is_unknown() || self.busy
    }
}
