//! # Types Module
//!
//! Data carried between the wrapper, the sandbox, the judge and callers.
//! Outbound types serialize in `camelCase` to match the HTTP layer's JSON.

use serde::{Deserialize, Serialize};

/// One (input, expected output) pair owned by a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    #[serde(default)]
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub points: f64,
    /// Overrides the call-level time limit for this case only.
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
    #[serde(default)]
    pub memory_limit_mb: Option<u64>,
}

impl TestCase {
    pub fn new(id: impl Into<String>, input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            input: input.into(),
            expected_output: expected.into(),
            is_hidden: false,
            points: 0.0,
            time_limit_ms: None,
            memory_limit_mb: None,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }

    pub fn worth(mut self, points: f64) -> Self {
        self.points = points;
        self
    }
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitSignal {
    /// Exited on its own with status 0.
    Normal,
    /// Killed by the runner when the wall-clock deadline passed.
    Timeout,
    /// Non-zero exit, or the process could not be started at all.
    Error,
}

/// Raw result of one sandboxed process. Lives only as long as the judge needs it.
///
/// For spawn failures `stderr` carries the OS error text and `exit_code` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_signal: ExitSignal,
    pub exit_code: Option<i32>,
    pub wall_time_ms: u64,
}

impl ExecutionOutcome {
    pub fn spawn_failure(message: impl Into<String>, wall_time_ms: u64) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            exit_signal: ExitSignal::Error,
            exit_code: None,
            wall_time_ms,
        }
    }

    /// The diagnostic a failed run should surface: the last non-empty stderr
    /// line (the exception message in both harnesses), otherwise the exit code.
    pub fn diagnostic(&self) -> String {
        if let Some(line) = self.stderr.lines().map(str::trim).rfind(|l| !l.is_empty()) {
            return line.to_string();
        }
        match self.exit_code {
            Some(code) => format!("Process exited with code {code}"),
            None => "Process terminated abnormally".to_string(),
        }
    }
}

/// Verdict for one test case. Created once per judging and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    #[serde(rename = "id")]
    pub test_case_id: String,
    pub passed: bool,
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    #[serde(rename = "executionTime")]
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub is_hidden: bool,
}

impl TestCaseResult {
    /// The projection shown to learners. Hidden cases reveal pass/fail only.
    pub fn learner_view(&self) -> TestCaseResult {
        if !self.is_hidden {
            return self.clone();
        }
        TestCaseResult {
            test_case_id: self.test_case_id.clone(),
            passed: self.passed,
            input: String::new(),
            expected_output: String::new(),
            actual_output: String::new(),
            execution_time_ms: self.execution_time_ms,
            error: None,
            is_hidden: true,
        }
    }
}

/// Result of a parse-only check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyntaxCheck {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}
