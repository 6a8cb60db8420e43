use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Creates a unique temporary directory to use as a sandbox root.
/// The directory is removed when the returned `TempDir` is dropped.
///
/// Keep the returned `TempDir` in scope for as long as you need the files.
pub fn setup_test_sandbox_root() -> TempDir {
    TempDir::new().expect("failed to create tempdir")
}

/// True when `bin --version` can be spawned. Integration tests that need a real
/// interpreter use this to skip on hosts without one.
pub fn interpreter_available(bin: &str) -> bool {
    Command::new(bin)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Number of entries directly under `dir`. Used to assert that runs leave nothing behind.
pub fn count_entries(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).count())
        .unwrap_or(0)
}
