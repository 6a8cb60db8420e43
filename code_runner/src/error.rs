//! Errors raised by the execution engine itself.
//!
//! Only broken preconditions are errors. A learner's program that times out,
//! crashes, or cannot be started is reported as a failed [`TestCaseResult`]
//! instead, because a failing submission is an expected outcome.
//!
//! [`TestCaseResult`]: crate::types::TestCaseResult

use util::languages::UnknownLanguage;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The requested language is not one the engine can run. Nothing was spawned.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Malformed engine input, e.g. a test case without an id.
    #[error("Invalid execution request: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UnknownLanguage> for RunnerError {
    fn from(err: UnknownLanguage) -> Self {
        RunnerError::UnsupportedLanguage(err.0)
    }
}
