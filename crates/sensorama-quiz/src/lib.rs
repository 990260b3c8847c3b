//! Quiz timing and answer state for Sensorama's question screens.
//!
//! Every question gives the player a fixed time (15 seconds by default)
//! to pick an option. Pressing "next" reveals the answer; pressing it
//! again moves on. If the clock runs out first the answer is revealed
//! with whatever was selected.
//!
//! - [`QuestionRound`]: pure selection/reveal state, no clock
//! - [`Countdown`]: a cancellable once-per-second timer on its own task
//! - [`TimedQuestion`]: the two together, with the countdown stopped on
//!   reveal and aborted on drop

mod countdown;
mod error;
mod question;
mod timed;

pub use countdown::{Countdown, CountdownEvent};
pub use error::QuizError;
pub use question::{
    DEFAULT_TIME_LIMIT, OptionMark, Outcome, QuestionRound, QuizOption, SubmitResult,
};
pub use timed::TimedQuestion;
