//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub host: String,
    pub port: u16,
    pub python_bin: String,
    pub node_bin: String,
    pub sandbox_root: PathBuf,
    pub max_concurrent_runs: usize,
    pub max_hidden_runs_per_question: u32,
    pub execution_config_path: Option<PathBuf>,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every field has a default, so a bare environment yields a usable config.
    /// Malformed numeric values fall back to their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "code-grader".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| {
                "code_manager=info,code_runner=info,marker=info".into()
            }),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "code_manager.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env_or("PORT", 3001),
            python_bin: env::var("PYTHON_BIN").unwrap_or_else(|_| "python3".into()),
            node_bin: env::var("NODE_BIN").unwrap_or_else(|_| "node".into()),
            sandbox_root: env::var("SANDBOX_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            max_concurrent_runs: env_or("MAX_CONCURRENT_RUNS", 4),
            max_hidden_runs_per_question: env_or("MAX_HIDDEN_RUNS_PER_QUESTION", 5),
            execution_config_path: env::var("EXECUTION_CONFIG_PATH").ok().map(PathBuf::from),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Returns an owned snapshot of the global configuration.
    pub fn snapshot() -> AppConfig {
        Self::global().clone()
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock
                .write()
                .expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_python_bin(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.python_bin = value.into());
    }

    pub fn set_node_bin(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.node_bin = value.into());
    }

    pub fn set_sandbox_root(value: impl Into<PathBuf>) {
        AppConfig::set_field(|cfg| cfg.sandbox_root = value.into());
    }

    pub fn set_max_concurrent_runs(value: usize) {
        AppConfig::set_field(|cfg| cfg.max_concurrent_runs = value);
    }

    pub fn set_max_hidden_runs_per_question(value: u32) {
        AppConfig::set_field(|cfg| cfg.max_hidden_runs_per_question = value);
    }
}
