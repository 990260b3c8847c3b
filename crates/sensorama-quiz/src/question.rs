//! Answer state for a single multiple-choice question.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::QuizError;

/// Time allowed per question unless the caller overrides it.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(15);

/// One answer the player can choose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: u32,
    pub text: String,
    pub is_correct: bool,
}

impl QuizOption {
    pub fn new(id: u32, text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id,
            text: text.into(),
            is_correct,
        }
    }
}

/// How the player did on a revealed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Time ran out with nothing selected.
    Unanswered,
}

/// What pressing "next" did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitResult {
    /// The answer is now shown; the round is locked.
    Revealed(Outcome),
    /// The answer was already shown; move on to the next question.
    Advance,
}

/// How an option should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Default,
    /// Chosen, answer not yet shown.
    Selected,
    /// The right answer, once shown.
    Correct,
    /// The player's wrong choice, once shown.
    Incorrect,
}

/// Selection and reveal state for one question.
///
/// The round moves one way: open (selection allowed), then revealed
/// (locked, answer shown) by either [`submit`](Self::submit) or
/// [`time_up`](Self::time_up). A second submit after the reveal asks to
/// advance.
#[derive(Debug, Clone)]
pub struct QuestionRound {
    options: Vec<QuizOption>,
    limit: Duration,
    selected: Option<u32>,
    revealed: bool,
}

impl QuestionRound {
    /// Creates a round with the default time limit.
    ///
    /// # Errors
    /// - [`QuizError::NoOptions`] if `options` is empty
    /// - [`QuizError::DuplicateOption`] if two options share an id
    pub fn new(options: Vec<QuizOption>) -> Result<Self, QuizError> {
        Self::with_limit(options, DEFAULT_TIME_LIMIT)
    }

    /// Creates a round with a custom time limit.
    ///
    /// # Errors
    /// Same as [`new`](Self::new).
    pub fn with_limit(options: Vec<QuizOption>, limit: Duration) -> Result<Self, QuizError> {
        if options.is_empty() {
            return Err(QuizError::NoOptions);
        }
        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.id) {
                return Err(QuizError::DuplicateOption(option.id));
            }
        }
        Ok(Self {
            options,
            limit,
            selected: None,
            revealed: false,
        })
    }

    /// Chooses an option. Ignored once the answer is shown or when `id`
    /// is not one of this round's options. Returns whether the selection
    /// changed.
    pub fn select(&mut self, id: u32) -> bool {
        if self.revealed || self.option(id).is_none() {
            return false;
        }
        let changed = self.selected != Some(id);
        self.selected = Some(id);
        changed
    }

    /// The "next" button.
    ///
    /// The first press reveals the answer and locks the round; the second
    /// asks to advance. Once revealed (including by timeout) advancing does
    /// not require a selection.
    ///
    /// # Errors
    /// Returns [`QuizError::NothingSelected`] if the round is still open
    /// and nothing is selected.
    pub fn submit(&mut self) -> Result<SubmitResult, QuizError> {
        if self.revealed {
            return Ok(SubmitResult::Advance);
        }
        if self.selected.is_none() {
            return Err(QuizError::NothingSelected);
        }
        self.revealed = true;
        let outcome = self.outcome();
        debug!(selected = ?self.selected, ?outcome, "question answered");
        Ok(SubmitResult::Revealed(outcome))
    }

    /// Time ran out: reveal with whatever is selected. Idempotent.
    pub fn time_up(&mut self) -> Outcome {
        if !self.revealed {
            self.revealed = true;
            debug!(selected = ?self.selected, "question timed out");
        }
        self.outcome()
    }

    /// Scores the current selection.
    pub fn outcome(&self) -> Outcome {
        match self.selected.and_then(|id| self.option(id)) {
            None => Outcome::Unanswered,
            Some(option) if option.is_correct => Outcome::Correct,
            Some(_) => Outcome::Incorrect,
        }
    }

    /// How option `id` should be drawn right now.
    pub fn mark(&self, id: u32) -> OptionMark {
        let Some(option) = self.option(id) else {
            return OptionMark::Default;
        };
        let chosen = self.selected == Some(id);
        match (self.revealed, chosen, option.is_correct) {
            (false, true, _) => OptionMark::Selected,
            (false, false, _) => OptionMark::Default,
            (true, _, true) => OptionMark::Correct,
            (true, true, false) => OptionMark::Incorrect,
            (true, false, false) => OptionMark::Default,
        }
    }

    pub fn options(&self) -> &[QuizOption] {
        &self.options
    }

    pub fn option(&self, id: u32) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    /// Whether the answer is shown (by submit or timeout).
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}
