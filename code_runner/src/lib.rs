//! # Code Runner
//!
//! Runs learner code against test cases and judges the output.
//!
//! - [`wrapper`]: embeds code and one test input into a runnable harness program.
//! - [`sandbox`]: runs a program as an isolated child process with a deadline.
//! - [`judge`]: one (code, test case) pair in, one [`TestCaseResult`] out.
//! - [`CodeExecutionService`]: judges a whole submission, preserving test-case order.

use std::path::PathBuf;

use futures::stream::{self, StreamExt};
use tracing::info;
use util::config::AppConfig;
use util::execution_config::{ExecutionConfig, ExecutionLimits};
use util::languages::Language;

pub mod error;
pub mod judge;
pub mod sandbox;
pub mod summary;
pub mod types;
pub mod wrapper;

use crate::error::RunnerError;
use crate::sandbox::SandboxRunner;
pub use crate::summary::ScoreSummary;
use crate::types::{ExitSignal, SyntaxCheck, TestCase, TestCaseResult};

/// Stateless entry point for running submissions. Cheap to clone and safe to
/// share across tasks; every call spawns its own processes and workspaces.
#[derive(Debug, Clone)]
pub struct CodeExecutionService {
    runner: SandboxRunner,
    config: ExecutionConfig,
}

impl CodeExecutionService {
    pub fn new(app_config: AppConfig, config: ExecutionConfig) -> Self {
        Self {
            runner: SandboxRunner::new(app_config, config.runner.clone()),
            config,
        }
    }

    /// Builds a service from the global [`AppConfig`], loading the execution
    /// config file it points at (or defaults when it points nowhere).
    pub fn from_global() -> Result<Self, RunnerError> {
        let app_config = AppConfig::snapshot();
        let config = ExecutionConfig::load_or_default(app_config.execution_config_path.as_deref())
            .map_err(RunnerError::Validation)?;
        Ok(Self::new(app_config, config))
    }

    /// Places per-invocation workspaces under `root`.
    pub fn with_sandbox_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.runner = self.runner.with_root(root);
        self
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Judges `code` against every test case, returning one result per case in input order.
    ///
    /// Cases are judged independently (up to `runner.max_parallel_cases` at a
    /// time); a crash or timeout in one never affects the others.
    ///
    /// # Errors
    /// * [`RunnerError::UnsupportedLanguage`] before anything is spawned.
    /// * [`RunnerError::Validation`] for malformed test cases or a zero time limit.
    pub async fn execute_code(
        &self,
        code: &str,
        language: &str,
        test_cases: &[TestCase],
        limits: ExecutionLimits,
    ) -> Result<Vec<TestCaseResult>, RunnerError> {
        let language: Language = language.parse()?;
        validate_request(test_cases, limits)?;

        if test_cases.is_empty() {
            return Ok(Vec::new());
        }

        let jobs: Vec<_> = test_cases
            .iter()
            .map(|test_case| judge::judge(&self.runner, code, language, test_case, limits))
            .collect();
        let results: Vec<TestCaseResult> = stream::iter(jobs)
            .buffered(self.config.runner.max_parallel_cases.max(1))
            .collect()
            .await;

        let passed = results.iter().filter(|r| r.passed).count();
        let timed_out = results
            .iter()
            .filter(|r| r.error.as_deref() == Some(judge::TIMEOUT_ERROR))
            .count();
        info!(
            %language,
            total = results.len(),
            passed,
            timed_out,
            time_limit_ms = limits.time_limit_ms,
            "Executed submission"
        );

        Ok(results)
    }

    /// [`execute_code`](Self::execute_code) with the learner-facing budget from the config.
    pub async fn execute_with_defaults(
        &self,
        code: &str,
        language: &str,
        test_cases: &[TestCase],
    ) -> Result<Vec<TestCaseResult>, RunnerError> {
        self.execute_code(code, language, test_cases, self.config.execution)
            .await
    }

    /// Parse-only check, used to fail fast before spending a full sandbox run.
    pub async fn validate_syntax(
        &self,
        code: &str,
        language: &str,
    ) -> Result<SyntaxCheck, RunnerError> {
        let language: Language = language.parse()?;
        let outcome = self.runner.check_syntax(code, language).await;

        Ok(match outcome.exit_signal {
            ExitSignal::Normal => SyntaxCheck::ok(),
            ExitSignal::Timeout => SyntaxCheck::invalid("Syntax check timed out"),
            ExitSignal::Error => SyntaxCheck::invalid(outcome.diagnostic()),
        })
    }
}

/// Checks a request without running anything. [`CodeExecutionService::execute_code`]
/// calls this first; callers that must reject bad input before spending
/// something (such as a hidden-run quota) can call it on its own.
pub fn validate_request(
    test_cases: &[TestCase],
    limits: ExecutionLimits,
) -> Result<(), RunnerError> {
    if limits.time_limit_ms == 0 {
        return Err(RunnerError::Validation(
            "time limit must be greater than zero".into(),
        ));
    }
    for (index, test_case) in test_cases.iter().enumerate() {
        if test_case.id.trim().is_empty() {
            return Err(RunnerError::Validation(format!(
                "test case at position {index} is missing an id"
            )));
        }
        if test_case.points < 0.0 || !test_case.points.is_finite() {
            return Err(RunnerError::Validation(format!(
                "test case '{}' has invalid points {}",
                test_case.id, test_case.points
            )));
        }
        if test_case.time_limit_ms == Some(0) {
            return Err(RunnerError::Validation(format!(
                "test case '{}' has a zero time limit",
                test_case.id
            )));
        }
        if test_case.memory_limit_mb == Some(0) {
            return Err(RunnerError::Validation(format!(
                "test case '{}' has a zero memory limit",
                test_case.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CodeExecutionService {
        CodeExecutionService::new(AppConfig::snapshot(), ExecutionConfig::default_config())
    }

    #[tokio::test]
    async fn unsupported_language_fails_fast() {
        let err = service()
            .execute_code("print(1)", "cobol", &[TestCase::new("a", "", "1")], ExecutionLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::UnsupportedLanguage(ref l) if l == "cobol"));
    }

    #[tokio::test]
    async fn empty_test_cases_yield_empty_results() {
        let results = service()
            .execute_code("print(1)", "python", &[], ExecutionLimits::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn missing_test_case_id_is_a_validation_error() {
        let err = service()
            .execute_code("print(1)", "python", &[TestCase::new(" ", "", "1")], ExecutionLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Validation(_)));
    }

    #[tokio::test]
    async fn zero_time_limit_is_a_validation_error() {
        let err = service()
            .execute_code("print(1)", "python", &[TestCase::new("a", "", "1")], ExecutionLimits::new(0, 256))
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Validation(_)));
    }

    #[tokio::test]
    async fn zero_per_case_time_limit_is_a_validation_error() {
        let mut case = TestCase::new("slow", "", "1");
        case.time_limit_ms = Some(0);
        let err = service()
            .execute_code("print(1)", "python", &[case], ExecutionLimits::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid execution request: test case 'slow' has a zero time limit"
        );
    }

    #[test]
    fn validate_request_accepts_positive_per_case_limits() {
        let mut case = TestCase::new("a", "", "1");
        case.time_limit_ms = Some(50);
        case.memory_limit_mb = Some(64);
        assert!(validate_request(&[case], ExecutionLimits::default()).is_ok());

        let mut case = TestCase::new("b", "", "1");
        case.memory_limit_mb = Some(0);
        assert!(matches!(
            validate_request(&[case], ExecutionLimits::default()),
            Err(RunnerError::Validation(_))
        ));
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn execute_code_future_can_be_spawned() {
        let svc = service();
        let cases = vec![TestCase::new("a", "1", "1"), TestCase::new("b", "2", "2")];
        let fut = svc.execute_code("print(input())", "python", &cases, ExecutionLimits::default());
        assert_send(&fut);
    }

    #[tokio::test]
    async fn validate_syntax_rejects_unknown_language() {
        let err = service().validate_syntax("x", "ruby").await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported language: ruby");
    }
}
