use thiserror::Error;

use crate::session::quiz::SessionState;

/// Errors surfaced by the quiz engine. All of them are recoverable: the
/// caller shows a message and carries on.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Unknown difficulty '{0}' (expected easy, medium or hard)")]
    InvalidDifficulty(String),

    #[error("Cannot {action} while the quiz is {state}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },

    #[error("Answer option {0} is out of range (expected 0-3)")]
    InvalidOptionIndex(usize),

    #[error("Malformed import: {0}")]
    MalformedImport(String),

    #[error("Please enter your name to continue")]
    EmptyName,

    #[error("Invalid share link: {0}")]
    InvalidShare(String),

    #[error("Factor range {min}-{max} is invalid (need 1 <= min <= max)")]
    InvalidBand { min: u32, max: u32 },

    #[error("{band} can supply at most {available} unique questions, {requested} requested")]
    InsufficientQuestions {
        band: String,
        available: usize,
        requested: usize,
    },

    #[error("Could not find three distinct wrong answers for {0}")]
    DistractorExhausted(u32),

    #[error("Failed to read/write quiz data: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Failed to serialize quiz data: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = QuizError> = std::result::Result<T, E>;
