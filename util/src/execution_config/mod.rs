use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Wall-clock and memory budget for one test-case run.
///
/// Memory is advisory metadata: it is carried through to results and logs, but
/// containment requires host-level limits (cgroups, container runtime) applied
/// outside this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExecutionLimits {
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,

    #[serde(default = "default_memory_limit_mb")]
    pub memory_limit_mb: u64,
}

impl ExecutionLimits {
    pub fn new(time_limit_ms: u64, memory_limit_mb: u64) -> Self {
        Self {
            time_limit_ms,
            memory_limit_mb,
        }
    }

    /// The fixed budget used when grading against the full (visible + hidden) test set.
    pub fn hidden_grading() -> Self {
        Self {
            time_limit_ms: default_grading_time_limit_ms(),
            memory_limit_mb: default_memory_limit_mb(),
        }
    }
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            time_limit_ms: default_time_limit_ms(),
            memory_limit_mb: default_memory_limit_mb(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerOptions {
    /// How many test cases of one submission may be judged at the same time.
    #[serde(default = "default_max_parallel_cases")]
    pub max_parallel_cases: usize,

    /// Captured stdout/stderr beyond this many bytes is dropped.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    #[serde(default = "default_syntax_check_timeout_ms")]
    pub syntax_check_timeout_ms: u64,

    /// How long to keep draining pipes after a timed-out child has been killed.
    #[serde(default = "default_kill_grace_ms")]
    pub kill_grace_ms: u64,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            max_parallel_cases: default_max_parallel_cases(),
            max_output_bytes: default_max_output_bytes(),
            syntax_check_timeout_ms: default_syntax_check_timeout_ms(),
            kill_grace_ms: default_kill_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionConfig {
    /// Learner-facing "try it" budget.
    #[serde(default)]
    pub execution: ExecutionLimits,

    /// Budget for full hidden-test grading.
    #[serde(default = "ExecutionLimits::hidden_grading")]
    pub grading: ExecutionLimits,

    #[serde(default)]
    pub runner: RunnerOptions,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl ExecutionConfig {
    pub fn default_config() -> Self {
        ExecutionConfig {
            execution: ExecutionLimits::default(),
            grading: ExecutionLimits::hidden_grading(),
            runner: RunnerOptions::default(),
        }
    }

    /// Loads an `ExecutionConfig` from a JSON file. Missing fields take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path_ref = path.as_ref();

        if !path_ref.is_file() {
            return Err(format!(
                "Config file {:?} does not exist or is not a valid file",
                path_ref
            ));
        }

        let content = fs::read_to_string(path_ref)
            .map_err(|e| format!("Failed to read config file {:?}: {}", path_ref, e))?;

        let config: ExecutionConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid JSON in config file {:?}: {}", path_ref, e))?;

        config.validate()?;
        tracing::info!(path = %path_ref.display(), "Loaded execution config");
        Ok(config)
    }

    /// Loads from `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default_config()),
        }
    }

    /// Rejects values the runner cannot honour.
    pub fn validate(&self) -> Result<(), String> {
        if self.execution.time_limit_ms == 0 || self.grading.time_limit_ms == 0 {
            return Err("time_limit_ms must be greater than zero".into());
        }
        if self.runner.max_parallel_cases == 0 {
            return Err("max_parallel_cases must be greater than zero".into());
        }
        if self.runner.max_output_bytes == 0 {
            return Err("max_output_bytes must be greater than zero".into());
        }
        Ok(())
    }
}

// ---- Defaults ----

fn default_time_limit_ms() -> u64 {
    1000
}

fn default_grading_time_limit_ms() -> u64 {
    3000
}

fn default_memory_limit_mb() -> u64 {
    256
}

fn default_max_parallel_cases() -> usize {
    4
}

fn default_max_output_bytes() -> usize {
    1024 * 1024
}

fn default_syntax_check_timeout_ms() -> u64 {
    5000
}

fn default_kill_grace_ms() -> u64 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_documented_budgets() {
        let cfg = ExecutionConfig::default_config();
        assert_eq!(cfg.execution, ExecutionLimits::new(1000, 256));
        assert_eq!(cfg.grading, ExecutionLimits::new(3000, 256));
        assert_eq!(cfg.runner.max_parallel_cases, 4);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: ExecutionConfig =
            serde_json::from_str(r#"{ "execution": { "time_limit_ms": 250 } }"#).unwrap();
        assert_eq!(cfg.execution.time_limit_ms, 250);
        assert_eq!(cfg.execution.memory_limit_mb, 256);
        assert_eq!(cfg.grading.time_limit_ms, 3000);
    }

    #[test]
    fn load_from_file_rejects_zero_parallelism() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "runner": {{ "max_parallel_cases": 0 }} }}"#).unwrap();
        let err = ExecutionConfig::load_from_file(file.path()).unwrap_err();
        assert!(err.contains("max_parallel_cases"));
    }

    #[test]
    fn load_from_missing_file_fails() {
        let err = ExecutionConfig::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.contains("does not exist"));
    }
}
