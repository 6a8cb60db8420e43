//! Executor Trait
//!
//! [`CodeExecutor`] is what the grader needs from the execution engine. The
//! production implementation is [`CodeExecutionService`]; tests substitute a
//! scripted executor so grading rules can be checked without interpreters.

use async_trait::async_trait;
use code_runner::CodeExecutionService;
use code_runner::error::RunnerError;
use code_runner::types::{TestCase, TestCaseResult};
use util::execution_config::ExecutionLimits;
use util::languages::Language;

#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Judges `code` against `test_cases`, one result per case in input order.
    async fn execute(
        &self,
        code: &str,
        language: Language,
        test_cases: &[TestCase],
        limits: ExecutionLimits,
    ) -> Result<Vec<TestCaseResult>, RunnerError>;
}

#[async_trait]
impl CodeExecutor for CodeExecutionService {
    async fn execute(
        &self,
        code: &str,
        language: Language,
        test_cases: &[TestCase],
        limits: ExecutionLimits,
    ) -> Result<Vec<TestCaseResult>, RunnerError> {
        self.execute_code(code, language.as_str(), test_cases, limits)
            .await
    }
}
