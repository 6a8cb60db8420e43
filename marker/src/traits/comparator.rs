/// AnswerComparator is a strategy trait for deciding whether a selection of
/// choice ids matches the stored correct answer. Grading is all-or-nothing.
pub trait AnswerComparator: Send + Sync {
    /// - `expected`: the stored correct choice id(s).
    /// - `submitted`: the learner's selected choice id(s).
    fn matches(&self, expected: &[String], submitted: &[String]) -> bool;
}
