//! # Test Case Judge
//!
//! Runs one submission against one test case and decides pass/fail by exact
//! string equality of the trimmed outputs. There is no numeric tolerance and no
//! line-ending normalisation beyond the trim: "3.0" and "3" are different answers.

use tracing::debug;
use util::execution_config::ExecutionLimits;
use util::languages::Language;

use crate::sandbox::SandboxRunner;
use crate::types::{ExecutionOutcome, ExitSignal, TestCase, TestCaseResult};
use crate::wrapper;

pub const TIMEOUT_ERROR: &str = "Execution timeout";

/// Synthesizes, runs and compares. Never fails: sandbox problems become a failed result.
pub async fn judge(
    runner: &SandboxRunner,
    code: &str,
    language: Language,
    test_case: &TestCase,
    limits: ExecutionLimits,
) -> TestCaseResult {
    let limits = effective_limits(test_case, limits);
    let program = wrapper::synthesize(code, &test_case.input, language);
    let stdin = wrapper::stdin_text(&test_case.input);
    let outcome = runner.run(&program, language, &stdin, limits).await;
    let result = evaluate(test_case, &outcome);
    debug!(
        test_case_id = %test_case.id,
        passed = result.passed,
        elapsed_ms = result.execution_time_ms,
        "Judged test case"
    );
    result
}

/// A per-case limit set by the question author wins over the call-level one.
fn effective_limits(test_case: &TestCase, limits: ExecutionLimits) -> ExecutionLimits {
    ExecutionLimits {
        time_limit_ms: test_case.time_limit_ms.unwrap_or(limits.time_limit_ms),
        memory_limit_mb: test_case.memory_limit_mb.unwrap_or(limits.memory_limit_mb),
    }
}

/// Turns a raw outcome into a verdict for `test_case`.
pub fn evaluate(test_case: &TestCase, outcome: &ExecutionOutcome) -> TestCaseResult {
    let actual = outcome.stdout.trim();
    let expected = test_case.expected_output.trim();

    let (passed, error) = match outcome.exit_signal {
        ExitSignal::Normal => (actual == expected, None),
        ExitSignal::Timeout => (false, Some(TIMEOUT_ERROR.to_string())),
        ExitSignal::Error => (false, Some(outcome.diagnostic())),
    };

    TestCaseResult {
        test_case_id: test_case.id.clone(),
        passed,
        input: test_case.input.clone(),
        expected_output: test_case.expected_output.clone(),
        actual_output: actual.to_string(),
        execution_time_ms: outcome.wall_time_ms,
        error,
        is_hidden: test_case.is_hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(stdout: &str, signal: ExitSignal) -> ExecutionOutcome {
        ExecutionOutcome {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_signal: signal,
            exit_code: match signal {
                ExitSignal::Normal => Some(0),
                ExitSignal::Error => Some(1),
                ExitSignal::Timeout => None,
            },
            wall_time_ms: 7,
        }
    }

    #[test]
    fn trimmed_exact_match_passes() {
        let tc = TestCase::new("a", "", "hello\n");
        let result = evaluate(&tc, &outcome("  hello \n\n", ExitSignal::Normal));
        assert!(result.passed);
        assert_eq!(result.actual_output, "hello");
        assert_eq!(result.error, None);
    }

    #[test]
    fn any_deviation_fails() {
        let tc = TestCase::new("a", "", "3");
        assert!(!evaluate(&tc, &outcome("3.0", ExitSignal::Normal)).passed);
        assert!(!evaluate(&tc, &outcome("3\n4", ExitSignal::Normal)).passed);
        assert!(!evaluate(&tc, &outcome("", ExitSignal::Normal)).passed);
    }

    #[test]
    fn inner_line_endings_are_not_normalised() {
        let tc = TestCase::new("a", "", "1\n2");
        assert!(!evaluate(&tc, &outcome("1\r\n2", ExitSignal::Normal)).passed);
    }

    #[test]
    fn timeout_fails_with_timeout_error() {
        let tc = TestCase::new("a", "", "");
        let result = evaluate(&tc, &outcome("", ExitSignal::Timeout));
        assert!(!result.passed);
        assert_eq!(result.error.as_deref(), Some(TIMEOUT_ERROR));
    }

    #[test]
    fn runtime_error_fails_even_if_output_matches() {
        let tc = TestCase::new("a", "", "partial");
        let mut out = outcome("partial", ExitSignal::Error);
        out.stderr = "ZeroDivisionError: division by zero\n".into();
        let result = evaluate(&tc, &out);
        assert!(!result.passed);
        assert_eq!(
            result.error.as_deref(),
            Some("ZeroDivisionError: division by zero")
        );
    }

    #[test]
    fn per_case_limit_overrides_call_limit() {
        let mut tc = TestCase::new("a", "", "");
        tc.time_limit_ms = Some(50);
        let limits = effective_limits(&tc, ExecutionLimits::new(1000, 256));
        assert_eq!(limits, ExecutionLimits::new(50, 256));
    }
}
