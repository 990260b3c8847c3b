//! A cancellable once-per-second countdown.
//!
//! The countdown runs on its own tokio task and publishes the remaining
//! whole seconds through a [`watch`] channel, so a screen can render the
//! timer without polling. The task belongs to the [`Countdown`] handle:
//! cancelling or dropping the handle aborts it, so nothing fires after
//! the question it was timing is gone.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

const TICK: Duration = Duration::from_secs(1);

/// How a countdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// The remaining time reached zero.
    Expired,
    /// The countdown was cancelled (or dropped) before reaching zero.
    Cancelled,
}

/// Handle to a running countdown.
#[derive(Debug)]
pub struct Countdown {
    limit_secs: u64,
    remaining: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl Countdown {
    /// Starts counting down from `limit`, rounded up to whole seconds.
    ///
    /// The first decrement happens one second after the call. A zero
    /// limit expires immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(limit: Duration) -> Self {
        let limit_secs = limit.as_secs() + u64::from(limit.subsec_nanos() > 0);
        let (tx, rx) = watch::channel(limit_secs);
        let first_tick = Instant::now() + TICK;

        let task = tokio::spawn(async move {
            if limit_secs == 0 {
                debug!("countdown started with zero limit, expired");
                return;
            }
            let mut interval = time::interval_at(first_tick, TICK);
            loop {
                interval.tick().await;
                let left = tx.borrow().saturating_sub(1);
                tx.send_replace(left);
                trace!(remaining = left, "countdown tick");
                if left == 0 {
                    debug!("countdown expired");
                    return;
                }
            }
        });

        debug!(limit_secs, "countdown started");
        Self {
            limit_secs,
            remaining: rx,
            task,
        }
    }

    /// Seconds left, as last published.
    pub fn remaining(&self) -> u64 {
        *self.remaining.borrow()
    }

    /// The starting value in whole seconds.
    pub fn limit_secs(&self) -> u64 {
        self.limit_secs
    }

    /// A receiver that sees every published value.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.clone()
    }

    /// Whether the countdown reached zero.
    pub fn is_expired(&self) -> bool {
        self.remaining() == 0
    }

    /// Whether the ticking task is still alive.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the countdown. Idempotent. The remaining value freezes at
    /// whatever was last published.
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            self.task.abort();
            debug!(remaining = self.remaining(), "countdown cancelled");
        }
    }

    /// Waits until the countdown expires or is cancelled.
    pub async fn finished(&self) -> CountdownEvent {
        let mut rx = self.remaining.clone();
        match rx.wait_for(|left| *left == 0).await {
            Ok(_) => CountdownEvent::Expired,
            // The task owns the sender; it only goes away early on abort.
            Err(_) => CountdownEvent::Cancelled,
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
