#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use code_runner::error::RunnerError;
use code_runner::types::{TestCase, TestCaseResult};
use marker::traits::executor::CodeExecutor;
use marker::types::{Question, QuestionKind};
use util::execution_config::ExecutionLimits;
use util::languages::Language;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Judge,
    Fail,
    Panic,
}

/// Passes exactly the test cases named in `passing`, without spawning anything.
pub struct ScriptedExecutor {
    passing: HashSet<String>,
    mode: Mode,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn passing(ids: &[&str]) -> Self {
        Self {
            passing: ids.iter().map(|id| id.to_string()).collect(),
            mode: Mode::Judge,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            mode: Mode::Fail,
            ..Self::passing(&[])
        }
    }

    pub fn panicking() -> Self {
        Self {
            mode: Mode::Panic,
            ..Self::passing(&[])
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        _code: &str,
        _language: Language,
        test_cases: &[TestCase],
        limits: ExecutionLimits,
    ) -> Result<Vec<TestCaseResult>, RunnerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.mode {
            Mode::Fail => {
                return Err(RunnerError::Io(std::io::Error::other(
                    "sandbox root unavailable",
                )));
            }
            Mode::Panic => panic!("executor exploded"),
            Mode::Judge => {}
        }
        assert_eq!(limits, ExecutionLimits::hidden_grading());

        Ok(test_cases
            .iter()
            .map(|tc| {
                let passed = self.passing.contains(&tc.id);
                TestCaseResult {
                    test_case_id: tc.id.clone(),
                    passed,
                    input: tc.input.clone(),
                    expected_output: tc.expected_output.clone(),
                    actual_output: if passed {
                        tc.expected_output.clone()
                    } else {
                        "wrong".into()
                    },
                    execution_time_ms: 3,
                    error: None,
                    is_hidden: tc.is_hidden,
                }
            })
            .collect())
    }
}

/// Four hidden cases `t1..t4`, five points each.
pub fn coding_question(id: &str) -> Question {
    let test_cases = (1..=4)
        .map(|i| {
            TestCase::new(format!("t{i}"), format!("{i}"), format!("{}", i * 2))
                .hidden()
                .worth(5.0)
        })
        .collect();
    Question::new(
        id,
        20.0,
        QuestionKind::Coding {
            language: Language::Python,
            test_cases,
        },
    )
}

pub fn essay_question(id: &str, points: f64) -> Question {
    Question::new(id, points, QuestionKind::Essay)
}
