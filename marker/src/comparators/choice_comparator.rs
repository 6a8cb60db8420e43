//! A comparator that awards full marks only when the learner selected exactly
//! the stored choice ids. Order of selection does not matter; surrounding
//! whitespace in ids is ignored.

use std::collections::BTreeSet;

use crate::traits::comparator::AnswerComparator;

#[derive(Debug, Default, Clone, Copy)]
pub struct ChoiceComparator;

fn normalise(ids: &[String]) -> BTreeSet<&str> {
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .collect()
}

impl AnswerComparator for ChoiceComparator {
    fn matches(&self, expected: &[String], submitted: &[String]) -> bool {
        let expected = normalise(expected);
        !expected.is_empty() && expected == normalise(submitted)
    }
}
