//! Error types for input resolution and signal emission
//!
//! All of these are recoverable: the controller turns an [`InputError`] into
//! a state transition and the host logs a [`SignalError`] after the output
//! has been restored.

use thiserror::Error;

/// Why a submitted question number did not produce a resolution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Buffer could not be parsed as an integer (e.g. overflow)
    #[error("invalid number format: {0:?}")]
    InvalidFormat(String),

    /// Parsed number lies outside the accepted question range
    #[error("question {value} out of range (must be 1-{max})")]
    OutOfRange { value: u64, max: u32 },

    /// Question number has no entry in the answer map
    #[error("no answer found for question {0}")]
    NotFound(u32),

    /// Entry exists but is neither a letter A-E nor in the text range
    #[error("invalid answer {answer:?} for question {question}")]
    UnknownAnswerSymbol { question: u32, answer: String },
}

impl InputError {
    /// Range and format failures keep the session open for another try
    pub fn keeps_session(&self) -> bool {
        matches!(self, Self::InvalidFormat(_) | Self::OutOfRange { .. })
    }
}

/// Failures of the blink emitter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// Output could not be read or written
    #[error("output device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Sequence was cancelled; the original state has been restored
    #[error("blink interrupted after {completed} of {requested} blinks")]
    Interrupted { completed: u32, requested: u32 },
}
