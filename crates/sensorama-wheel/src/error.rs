//! Error types for the prize wheel.

/// Errors that can occur while configuring or spinning the wheel.
#[derive(Debug, thiserror::Error)]
pub enum WheelError {
    /// A catalog needs at least one segment.
    #[error("wheel catalog has no segments")]
    EmptyCatalog,

    /// A segment points at a destination the route table doesn't know.
    ///
    /// This is a configuration bug, not a runtime condition. It is meant
    /// to be caught by [`RouteTable::check`](crate::RouteTable::check)
    /// at startup.
    #[error("segment {segment:?} targets unknown destination {destination:?}")]
    UnknownDestination {
        segment: String,
        destination: String,
    },

    /// A spin was requested while the previous one is still turning.
    #[error("the wheel is already spinning")]
    AlreadySpinning,
}
