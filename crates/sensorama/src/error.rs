//! Unified error type for the Sensorama client core.

use sensorama_api::ApiError;
use sensorama_quiz::QuizError;
use sensorama_session::{SessionError, StorageError};
use sensorama_wheel::WheelError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `sensorama` crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SensoramaError {
    /// A session error (persisting a login, clearing on logout).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A backend call failed (network, timeout, non-2xx status).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A wheel error (misconfigured catalog, spin already in flight).
    #[error(transparent)]
    Wheel(#[from] WheelError),

    /// A quiz error (nothing selected, malformed question).
    #[error(transparent)]
    Quiz(#[from] QuizError),

    /// Direct storage access failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The logged-in token carries no profile id, or nobody is logged in.
    #[error("no profile is linked to the current session")]
    NoProfile,

    /// The registration form's CPF failed its checksum.
    #[error("invalid CPF")]
    InvalidCpf,
}

impl SensoramaError {
    /// Whether the backend rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_unauthorized())
    }
}
