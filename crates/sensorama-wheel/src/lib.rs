//! Prize wheel for Sensorama.
//!
//! The home screen's wheel picks one of the mini-games at random. This
//! crate holds everything about that choice except the drawing:
//!
//! - [`Catalog`]: the ordered, non-empty list of [`Segment`]s
//! - [`select_index`]: which segment sits under the pointer for a given
//!   resting angle
//! - [`Wheel`]: draws a [`Spin`] (rotation plus outcome) from an RNG
//! - [`Spinner`]: runs spins one at a time on the tokio clock
//! - [`RouteTable`]: where each segment's destination navigates to
//!
//! # Fairness
//!
//! Only the final fraction of a turn decides the outcome. It is drawn
//! uniformly on `[0, 1)` and all segments have the same width, so every
//! game is equally likely. The whole-turn count is cosmetic.

mod catalog;
mod error;
mod selector;
mod spinner;

pub use catalog::{Catalog, RouteTable, Segment};
pub use error::WheelError;
pub use selector::{Spin, Wheel, WheelConfig, select_index};
pub use spinner::{SpinInFlight, Spinner};
