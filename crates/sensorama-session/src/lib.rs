//! Client-side session management for Sensorama.
//!
//! This crate owns the lifecycle of a login on the device:
//!
//! 1. **Storage**: a durable key-value seam ([`KeyValueStore`]) with
//!    in-memory and file-backed implementations
//! 2. **Session Store**: keeping the token and user records consistent
//!    in that storage ([`SessionStore`])
//! 3. **Session Context**: the in-memory state machine every screen
//!    reads from ([`SessionContext`])
//! 4. **Route Guard**: gating protected views on that state
//!    ([`RouteGuard`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Screens (above)  ← read state, call login/logout, evaluate guards
//!     ↕
//! Session Layer (this crate)  ← owns token + user, persists them
//!     ↕
//! Token Codec (below)  ← decodes claims from the raw token
//! ```

mod context;
mod error;
mod guard;
mod state;
mod storage;
mod store;
mod user;

pub use context::SessionContext;
pub use error::{SessionError, StorageError};
pub use guard::{DEFAULT_REDIRECT, GuardDecision, RouteGuard};
pub use state::{SessionConfig, SessionState, SessionStatus};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{SessionStore, StoredSession, TOKEN_KEY, USER_KEY};
pub use user::User;
