use async_trait::async_trait;
use code_runner::CodeExecutionService;
use code_runner::error::RunnerError;
use code_runner::types::{TestCase, TestCaseResult};
use marker::traits::executor::CodeExecutor;
use util::execution_config::ExecutionLimits;
use util::languages::Language;

use crate::manager::manager::ExecutionManager;

/// Grading executor that shares the HTTP surface's run slots.
#[derive(Debug, Clone)]
pub struct QueuedExecutor {
    service: CodeExecutionService,
    manager: ExecutionManager,
}

impl QueuedExecutor {
    pub fn new(service: CodeExecutionService, manager: ExecutionManager) -> Self {
        Self { service, manager }
    }
}

#[async_trait]
impl CodeExecutor for QueuedExecutor {
    async fn execute(
        &self,
        code: &str,
        language: Language,
        test_cases: &[TestCase],
        limits: ExecutionLimits,
    ) -> Result<Vec<TestCaseResult>, RunnerError> {
        self.manager
            .run(self.service.execute(code, language, test_cases, limits))
            .await
    }
}
