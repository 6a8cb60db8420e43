use serde::{Deserialize, Serialize};

use crate::types::TestCaseResult;

/// Aggregate counts for one run of a submission, as returned to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    /// `round(passed / total * 100)` followed by `%`.
    pub score: String,
    pub all_passed: bool,
}

impl ScoreSummary {
    pub fn from_results(results: &[TestCaseResult]) -> Self {
        let total_tests = results.len();
        let passed_tests = results.iter().filter(|r| r.passed).count();
        let percent = if total_tests == 0 {
            0
        } else {
            (passed_tests as f64 / total_tests as f64 * 100.0).round() as u32
        };

        Self {
            total_tests,
            passed_tests,
            failed_tests: total_tests - passed_tests,
            score: format!("{percent}%"),
            all_passed: total_tests > 0 && passed_tests == total_tests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(passed: &[bool]) -> Vec<TestCaseResult> {
        passed
            .iter()
            .enumerate()
            .map(|(i, p)| TestCaseResult {
                test_case_id: format!("tc{i}"),
                passed: *p,
                input: String::new(),
                expected_output: String::new(),
                actual_output: String::new(),
                execution_time_ms: 0,
                error: None,
                is_hidden: false,
            })
            .collect()
    }

    #[test]
    fn rounds_percentage() {
        let summary = ScoreSummary::from_results(&results(&[true, true, false]));
        assert_eq!(summary.passed_tests, 2);
        assert_eq!(summary.failed_tests, 1);
        assert_eq!(summary.score, "67%");
        assert!(!summary.all_passed);
    }

    #[test]
    fn all_passed_only_when_every_case_passes() {
        let summary = ScoreSummary::from_results(&results(&[true, true]));
        assert_eq!(summary.score, "100%");
        assert!(summary.all_passed);
    }

    #[test]
    fn empty_results_score_zero() {
        let summary = ScoreSummary::from_results(&[]);
        assert_eq!(summary.total_tests, 0);
        assert_eq!(summary.score, "0%");
        assert!(!summary.all_passed);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(ScoreSummary::from_results(&results(&[true]))).unwrap();
        assert_eq!(json["totalTests"], 1);
        assert_eq!(json["allPassed"], true);
    }
}
