use std::sync::Arc;

use code_runner::CodeExecutionService;
use code_runner::error::RunnerError;
use marker::{AutoGrader, GradeStore, InMemoryGradeStore};
use util::config::AppConfig;
use util::execution_config::ExecutionConfig;

use crate::manager::executor::QueuedExecutor;
use crate::manager::manager::ExecutionManager;
use crate::quota::RunQuota;

/// Shared handles for every route.
#[derive(Clone)]
pub struct AppState {
    pub service: CodeExecutionService,
    pub manager: ExecutionManager,
    pub quota: RunQuota,
    pub grader: Arc<AutoGrader<QueuedExecutor>>,
    pub grades: Arc<dyn GradeStore>,
}

impl AppState {
    pub fn new(app_config: AppConfig, execution_config: ExecutionConfig) -> Self {
        let manager = ExecutionManager::new(app_config.max_concurrent_runs);
        let quota = RunQuota::in_memory(app_config.max_hidden_runs_per_question);
        let grading_limits = execution_config.grading;
        let service = CodeExecutionService::new(app_config, execution_config);
        let grader = AutoGrader::new(QueuedExecutor::new(service.clone(), manager.clone()))
            .with_limits(grading_limits);

        Self {
            service,
            manager,
            quota,
            grader: Arc::new(grader),
            grades: Arc::new(InMemoryGradeStore::new()),
        }
    }

    /// Builds state from the global [`AppConfig`] and the execution config file it names.
    pub fn from_global() -> Result<Self, RunnerError> {
        let app_config = AppConfig::snapshot();
        let execution_config =
            ExecutionConfig::load_or_default(app_config.execution_config_path.as_deref())
                .map_err(RunnerError::Validation)?;
        Ok(Self::new(app_config, execution_config))
    }

    pub fn with_grade_store(mut self, store: Arc<dyn GradeStore>) -> Self {
        self.grades = store;
        self
    }

    pub fn with_quota(mut self, quota: RunQuota) -> Self {
        self.quota = quota;
        self
    }
}
