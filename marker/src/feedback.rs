//! # Feedback
//!
//! Template-based feedback text attached to each graded question.

pub const NO_CODE_SUBMITTED: &str = "No code submitted";
pub const REQUIRES_MANUAL_GRADING: &str = "This question requires manual grading";
pub const PENDING_MANUAL_GRADING: &str = "Pending manual grading";
pub const MANUALLY_GRADED: &str = "Manually graded";
pub const CORRECT: &str = "Correct";
pub const INCORRECT: &str = "Incorrect";

/// e.g. `"3/4 test cases passed, 15/20 points"`.
pub fn coding_summary(passed: usize, total: usize, points: f64, max_points: f64) -> String {
    format!("{passed}/{total} test cases passed, {points}/{max_points} points")
}

pub fn unsupported_language(language: &str) -> String {
    format!("Unsupported language: {language}")
}

pub fn choice(correct: bool) -> &'static str {
    if correct { CORRECT } else { INCORRECT }
}
