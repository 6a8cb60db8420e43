//! Marker Error Types
//!
//! [`MarkerError`] covers failures of the grading engine's own preconditions and
//! collaborators. A learner's wrong or broken answer is never an error: it is a
//! graded outcome with zero points.
//!
//! # Example
//!
//! ```rust
//! use marker::error::MarkerError;
//!
//! fn check_id(id: &str) -> Result<(), MarkerError> {
//!     if id.is_empty() {
//!         return Err(MarkerError::Validation("question id is required".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use code_runner::error::RunnerError;

#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    /// Malformed grading input (missing id, negative points, duplicate questions).
    #[error("Invalid grading input: {0}")]
    Validation(String),
    /// The execution engine could not run at all (not a failing submission).
    #[error("Execution engine failure: {0}")]
    Execution(String),
    /// The persistence collaborator rejected a read or write.
    #[error("Grade store failure: {0}")]
    Store(String),
    /// A background grading job ended without producing a grade.
    #[error("Grading job aborted: {0}")]
    JobAborted(String),
}

impl From<RunnerError> for MarkerError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::Validation(msg) => MarkerError::Validation(msg),
            other => MarkerError::Execution(other.to_string()),
        }
    }
}
