//! Error types for quiz questions.

/// Errors raised by a [`QuestionRound`](crate::QuestionRound).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    /// The player pressed "next" without choosing an option.
    #[error("select an option before continuing")]
    NothingSelected,

    /// Two options share an id, so a selection would be ambiguous.
    #[error("option id {0} appears more than once")]
    DuplicateOption(u32),

    /// A question needs something to choose from.
    #[error("question has no options")]
    NoOptions,
}
