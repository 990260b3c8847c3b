//! One spin at a time, on the tokio clock.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time;
use tracing::{debug, info};

use crate::{Spin, Wheel, WheelError};

/// Runs spins of a [`Wheel`] and refuses to start a new one while the
/// previous one is still turning.
///
/// A spin counts as in flight from [`begin`](Self::begin) until the
/// returned [`SpinInFlight`] settles or is dropped, so an abandoned spin
/// (a cancelled future, a screen closed mid-animation) never leaves the
/// wheel locked.
#[derive(Debug)]
pub struct Spinner {
    wheel: Wheel,
    spinning: AtomicBool,
}

impl Spinner {
    pub fn new(wheel: Wheel) -> Self {
        Self {
            wheel,
            spinning: AtomicBool::new(false),
        }
    }

    /// Draws a spin and marks the wheel as busy.
    ///
    /// # Errors
    /// Returns [`WheelError::AlreadySpinning`] if a spin is in flight.
    pub fn begin(&self) -> Result<SpinInFlight<'_>, WheelError> {
        if self
            .spinning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("spin requested while wheel is turning, ignored");
            return Err(WheelError::AlreadySpinning);
        }

        let spin = self.wheel.spin(&mut rand::rng());
        info!(
            segment = %spin.segment.name,
            destination = %spin.segment.destination,
            "wheel spinning"
        );

        Ok(SpinInFlight {
            spin,
            flag: &self.spinning,
        })
    }

    /// Spins, waits out the animation and the reveal delay, then returns
    /// the outcome.
    ///
    /// # Errors
    /// Returns [`WheelError::AlreadySpinning`] if a spin is in flight.
    pub async fn spin_and_settle(&self) -> Result<Spin, WheelError> {
        Ok(self.begin()?.settle().await)
    }

    /// Whether a spin is currently in flight.
    pub fn is_spinning(&self) -> bool {
        self.spinning.load(Ordering::Acquire)
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new(Wheel::default())
    }
}

/// A spin that has been drawn but not yet settled.
///
/// Hand [`spin`](Self::spin) to the animation layer, then await
/// [`settle`](Self::settle). Dropping this value releases the wheel.
#[derive(Debug)]
pub struct SpinInFlight<'a> {
    spin: Spin,
    flag: &'a AtomicBool,
}

impl SpinInFlight<'_> {
    /// The drawn outcome, available before the animation finishes.
    pub fn spin(&self) -> &Spin {
        &self.spin
    }

    /// Sleeps for the spin duration and then the reveal delay.
    pub async fn settle(self) -> Spin {
        time::sleep(self.spin.duration).await;
        debug!(segment = %self.spin.segment.name, "wheel stopped");
        time::sleep(self.spin.reveal_delay).await;
        self.spin.clone()
    }
}

impl Drop for SpinInFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
