//! # Sandbox Runner
//!
//! Runs a synthesized program as a short-lived child process with a wall-clock
//! deadline. Every call gets its own workspace directory named after a fresh
//! invocation id, so concurrent runs never share files, and the workspace is
//! removed on every exit path (normal exit, timeout, spawn failure, or the
//! caller dropping the future).
//!
//! The runner never returns an error: whatever happens is folded into an
//! [`ExecutionOutcome`].
//!
//! Memory limits are carried for logging only. Real containment belongs to the
//! host (cgroups or a container runtime wrapped around the interpreter binary
//! configured in [`AppConfig`]).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use util::config::AppConfig;
use util::execution_config::{ExecutionLimits, RunnerOptions};
use util::languages::{Language, LanguageExt};

use crate::types::{ExecutionOutcome, ExitSignal};

const TRUNCATION_MARKER: &str = "\n[output truncated]";

/// Per-invocation scratch directory. Dropping it deletes the directory.
struct Workspace {
    dir: TempDir,
    program: PathBuf,
    invocation_id: Uuid,
}

impl Workspace {
    fn create(root: &Path, language: Language, source: &str) -> std::io::Result<Self> {
        let invocation_id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("run-{invocation_id}-"))
            .tempdir_in(root)?;
        let program = dir.path().join(language.main_filename());
        std::fs::write(&program, source)?;
        Ok(Self {
            dir,
            program,
            invocation_id,
        })
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the directory now so a failure can be logged rather than swallowed by `Drop`.
    fn close(self) {
        let invocation_id = self.invocation_id;
        if let Err(e) = self.dir.close() {
            warn!(%invocation_id, error = %e, "Failed to remove sandbox workspace");
        }
    }
}

/// Bytes read from one pipe, capped at the configured size.
#[derive(Default)]
struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

impl Captured {
    fn into_string(self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.truncated {
            text.push_str(TRUNCATION_MARKER);
        }
        text
    }
}

/// Drains `pipe` to EOF, keeping at most `limit` bytes. Draining continues past
/// the limit so a chatty child never blocks on a full pipe.
async fn read_capped<R>(pipe: Option<R>, limit: usize) -> Captured
where
    R: AsyncRead + Unpin,
{
    let mut captured = Captured::default();
    let Some(mut pipe) = pipe else {
        return captured;
    };
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let room = limit.saturating_sub(captured.bytes.len());
                if n > room {
                    captured.truncated = true;
                }
                captured.bytes.extend_from_slice(&chunk[..n.min(room)]);
            }
            Err(_) => break,
        }
    }
    captured
}

/// Waits up to `grace` for a pipe reader. A reader still blocked after that
/// (e.g. a grandchild kept the pipe open) is aborted.
async fn collect(mut handle: JoinHandle<Captured>, grace: Duration) -> Captured {
    match timeout(grace, &mut handle).await {
        Ok(Ok(captured)) => captured,
        Ok(Err(_)) => Captured::default(),
        Err(_) => {
            handle.abort();
            Captured::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SandboxRunner {
    root: PathBuf,
    config: AppConfig,
    options: RunnerOptions,
}

impl SandboxRunner {
    pub fn new(config: AppConfig, options: RunnerOptions) -> Self {
        Self {
            root: config.sandbox_root.clone(),
            config,
            options,
        }
    }

    /// Uses `root` for per-invocation workspaces instead of the configured sandbox root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runs `program` with the language's interpreter under `limits`, writing
    /// `stdin` to its standard input and then closing it.
    pub async fn run(
        &self,
        program: &str,
        language: Language,
        stdin: &str,
        limits: ExecutionLimits,
    ) -> ExecutionOutcome {
        self.run_in_workspace(program, language, Some(stdin), limits, false)
            .await
    }

    /// Asks the interpreter to parse `source` without executing it.
    pub async fn check_syntax(&self, source: &str, language: Language) -> ExecutionOutcome {
        let limits = ExecutionLimits::new(self.options.syntax_check_timeout_ms, 0);
        self.run_in_workspace(source, language, None, limits, true)
            .await
    }

    async fn run_in_workspace(
        &self,
        source: &str,
        language: Language,
        stdin: Option<&str>,
        limits: ExecutionLimits,
        syntax_only: bool,
    ) -> ExecutionOutcome {
        let started = Instant::now();

        let workspace = match Workspace::create(&self.root, language, source) {
            Ok(ws) => ws,
            Err(e) => {
                warn!(%language, error = %e, root = %self.root.display(), "Failed to prepare sandbox workspace");
                return ExecutionOutcome::spawn_failure(
                    format!("Failed to prepare sandbox workspace: {e}"),
                    elapsed_ms(started),
                );
            }
        };

        let interpreter = language.interpreter(&self.config);
        let program_path = workspace.program.to_string_lossy().into_owned();
        let mut command = Command::new(&interpreter);
        if syntax_only {
            command.args(language.syntax_check_args(&program_path));
        } else {
            command.arg(&program_path);
        }
        command
            .current_dir(workspace.path())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            invocation_id = %workspace.invocation_id,
            %language,
            time_limit_ms = limits.time_limit_ms,
            memory_limit_mb = limits.memory_limit_mb,
            syntax_only,
            "Starting sandboxed process"
        );

        let outcome = self
            .supervise(
                command,
                &interpreter,
                stdin.map(str::to_owned),
                limits,
                started,
                workspace.invocation_id,
            )
            .await;

        workspace.close();
        outcome
    }

    async fn supervise(
        &self,
        mut command: Command,
        interpreter: &str,
        stdin: Option<String>,
        limits: ExecutionLimits,
        started: Instant,
        invocation_id: Uuid,
    ) -> ExecutionOutcome {
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(%invocation_id, interpreter, error = %e, "Failed to spawn interpreter");
                return ExecutionOutcome::spawn_failure(
                    format!("Failed to start '{interpreter}': {e}"),
                    elapsed_ms(started),
                );
            }
        };

        // Dropping the pipe at the end of the task sends EOF. A child that exits
        // without reading turns the write into a broken pipe, which is ignored.
        let stdin_task = match (child.stdin.take(), stdin) {
            (Some(mut pipe), Some(text)) => Some(tokio::spawn(async move {
                let _ = pipe.write_all(text.as_bytes()).await;
            })),
            _ => None,
        };

        let limit = self.options.max_output_bytes;
        let stdout_task = tokio::spawn(read_capped(child.stdout.take(), limit));
        let stderr_task = tokio::spawn(read_capped(child.stderr.take(), limit));

        let deadline = Duration::from_millis(limits.time_limit_ms);
        let (exit_signal, exit_code, wait_error) = match timeout(deadline, child.wait()).await {
            Ok(Ok(status)) if status.success() => (ExitSignal::Normal, status.code(), None),
            Ok(Ok(status)) => (ExitSignal::Error, status.code(), None),
            Ok(Err(e)) => {
                // Could not observe the exit; make sure nothing is left running.
                let _ = child.kill().await;
                (ExitSignal::Error, None, Some(format!("Failed to wait for process: {e}")))
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!(%invocation_id, error = %e, "Failed to kill timed-out process");
                }
                (ExitSignal::Timeout, None, None)
            }
        };
        let wall_time_ms = elapsed_ms(started);
        if let Some(task) = stdin_task {
            task.abort();
        }

        let grace = Duration::from_millis(self.options.kill_grace_ms);
        let stdout = collect(stdout_task, grace).await.into_string();
        let mut stderr = collect(stderr_task, grace).await.into_string();
        if let Some(msg) = wait_error {
            if !stderr.is_empty() {
                stderr.push('\n');
            }
            stderr.push_str(&msg);
        }

        match exit_signal {
            ExitSignal::Timeout => warn!(
                %invocation_id,
                time_limit_ms = limits.time_limit_ms,
                wall_time_ms,
                "Process killed after exceeding time limit"
            ),
            _ => debug!(%invocation_id, ?exit_signal, ?exit_code, wall_time_ms, "Process finished"),
        }

        ExecutionOutcome {
            stdout,
            stderr,
            exit_signal,
            exit_code,
            wall_time_ms,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_capped_truncates_but_drains() {
        let data = vec![b'x'; 20_000];
        let captured = read_capped(Some(&data[..]), 100).await;
        assert_eq!(captured.bytes.len(), 100);
        assert!(captured.truncated);
        assert!(captured.into_string().ends_with("[output truncated]"));
    }

    #[tokio::test]
    async fn read_capped_without_pipe_is_empty() {
        let captured = read_capped::<&[u8]>(None, 100).await;
        assert!(captured.bytes.is_empty());
        assert!(!captured.truncated);
    }

    #[tokio::test]
    async fn missing_interpreter_is_reported_not_raised() {
        let root = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::snapshot();
        config.python_bin = "definitely-not-a-real-python-binary".into();
        let runner = SandboxRunner::new(config, RunnerOptions::default()).with_root(root.path());

        let outcome = runner
            .run("print(1)", Language::Python, "", ExecutionLimits::default())
            .await;

        assert_eq!(outcome.exit_signal, ExitSignal::Error);
        assert!(outcome.stderr.contains("Failed to start"));
        assert_eq!(util::test_helpers::count_entries(root.path()), 0);
    }

    #[tokio::test]
    async fn program_reads_piped_stdin() {
        if !util::test_helpers::interpreter_available("python3") {
            eprintln!("skipping: python3 not available");
            return;
        }
        let root = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::snapshot();
        config.python_bin = "python3".into();
        let runner = SandboxRunner::new(config, RunnerOptions::default()).with_root(root.path());

        let outcome = runner
            .run(
                "import sys\nprint(sys.stdin.read().split())",
                Language::Python,
                "4 5\n6\n",
                ExecutionLimits::default(),
            )
            .await;

        assert_eq!(outcome.exit_signal, ExitSignal::Normal, "stderr: {}", outcome.stderr);
        assert_eq!(outcome.stdout.trim(), "['4', '5', '6']");
    }

    #[tokio::test]
    async fn unwritable_root_is_reported_not_raised() {
        let runner = SandboxRunner::new(AppConfig::snapshot(), RunnerOptions::default())
            .with_root("/definitely/not/a/directory");

        let outcome = runner
            .run("print(1)", Language::Python, "", ExecutionLimits::default())
            .await;

        assert_eq!(outcome.exit_signal, ExitSignal::Error);
        assert!(outcome.stderr.contains("workspace"));
    }
}
