//! # Marker Library
//!
//! Grades quiz attempts. Choice questions are compared against the stored
//! answer, coding questions are run through the execution engine against
//! their hidden test cases, and free-text, essay and upload questions are left
//! for a human.
//!
//! ## Key Concepts
//! - **AutoGrader**: grades one question with the rule for its kind.
//! - **Aggregator**: folds every question of an attempt into one outcome, with
//!   a partial mode used immediately after submission.
//! - **Jobs**: background grading with a persisted, observable state.
//! - **Comparators** and **Executors**: the seams the grader depends on.

pub mod aggregator;
pub mod comparators;
pub mod error;
pub mod feedback;
pub mod grader;
pub mod job;
pub mod traits;
pub mod types;

pub use crate::grader::AutoGrader;
pub use crate::job::{GradeStore, GradingHandle, GradingState, InMemoryGradeStore, spawn_grading_job};
