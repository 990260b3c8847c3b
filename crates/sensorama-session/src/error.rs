//! Error types for the session layer.

/// A failure of the durable key-value storage behind the session.
///
/// Storage errors are never swallowed on the write path: if a save fails
/// silently, the user believes they are logged in across restarts when
/// they are not.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The device storage reported an I/O error.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The storage medium exists but its contents can't be read back
    /// (for a [`FileStore`](crate::FileStore): the file isn't a JSON object).
    #[error("storage is corrupt: {0}")]
    Corrupt(String),

    /// A value could not be serialized before writing.
    #[error("could not serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The storage backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the mutating [`SessionContext`](crate::SessionContext)
/// operations.
///
/// The variants tell the caller whether the in-memory session moved:
/// after `Persist` it definitely did not; after `Storage` (from logout)
/// it definitely did.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Saving the new session failed during login. The in-memory state
    /// was not advanced.
    #[error("could not persist session: {0}")]
    Persist(#[source] StorageError),

    /// Storage failed while clearing the session. The in-memory state is
    /// logged out regardless.
    #[error("session storage error: {0}")]
    Storage(#[source] StorageError),

    /// The login response carried an empty token.
    #[error("login response carries no token")]
    MissingToken,

    /// Neither the token's claims nor the login response identified a user.
    #[error("login response carries no user identity")]
    MissingIdentity,

    /// The operation needs a logged-in session.
    #[error("no authenticated session")]
    NotAuthenticated,
}
