//! A question round wired to its countdown.

use tokio::sync::watch;
use tracing::debug;

use crate::{Countdown, CountdownEvent, Outcome, QuestionRound, QuizError, SubmitResult};

/// A [`QuestionRound`] with a running [`Countdown`].
///
/// The countdown starts on construction and stops as soon as the answer
/// is revealed. Dropping the question drops the countdown with it, which
/// aborts the ticking task.
///
/// Drive it from the screen's event loop:
///
/// ```ignore
/// loop {
///     tokio::select! {
///         Some(input) = inputs.recv() => { /* select / submit */ }
///         outcome = question.expired() => { show(outcome); }
///     }
/// }
/// ```
#[derive(Debug)]
pub struct TimedQuestion {
    round: QuestionRound,
    countdown: Countdown,
}

impl TimedQuestion {
    /// Starts the countdown for `round`. Must be called inside a tokio
    /// runtime.
    pub fn start(round: QuestionRound) -> Self {
        let countdown = Countdown::start(round.limit());
        Self { round, countdown }
    }

    /// See [`QuestionRound::select`].
    pub fn select(&mut self, id: u32) -> bool {
        self.round.select(id)
    }

    /// See [`QuestionRound::submit`]. Stops the countdown on reveal.
    pub fn submit(&mut self) -> Result<SubmitResult, QuizError> {
        let result = self.round.submit()?;
        if matches!(result, SubmitResult::Revealed(_)) {
            self.countdown.cancel();
        }
        Ok(result)
    }

    /// Resolves when time runs out, revealing the round.
    ///
    /// Pends forever once the round is revealed by a submit, so it is
    /// safe to keep in a `select!` loop.
    pub async fn expired(&mut self) -> Outcome {
        if self.round.is_revealed() {
            return std::future::pending().await;
        }
        match self.countdown.finished().await {
            CountdownEvent::Expired => {
                debug!("question time limit reached");
                self.round.time_up()
            }
            CountdownEvent::Cancelled => std::future::pending().await,
        }
    }

    /// Seconds left on the clock.
    pub fn remaining(&self) -> u64 {
        self.countdown.remaining()
    }

    /// A receiver for rendering the timer.
    pub fn subscribe_remaining(&self) -> watch::Receiver<u64> {
        self.countdown.subscribe()
    }

    pub fn round(&self) -> &QuestionRound {
        &self.round
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }
}
