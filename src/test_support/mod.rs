//! Test utilities and mocks for unit tests.
//!
//! This module provides mock implementations of the two collaborators every
//! probe talks to: the filesystem and the process runner. Both record what
//! they were asked so tests can assert on side effects.
//!
//! # Example
//!
//! ```rust,ignore
//! use harbour_libc::test_support::{MockFileSystem, MockProcessOutput, MockRunner};
//!
//! #[test]
//! fn test_example() {
//!     let fs = MockFileSystem::new();
//!     fs.add_file("/usr/include/stdlib.h");
//!
//!     let runner = MockRunner::new();
//!     runner.expect("cc -print-file-name=crt1.o", MockProcessOutput::success("/usr/lib/crt1.o"));
//!
//!     // Use mocks in tests...
//! }
//! ```

pub mod fixtures;

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::util::fs::FileSystem;
use crate::util::process::{
    CapturedOutput, CommandRunner, ProcessBuilder, ProcessError, Termination,
};

// Re-export fixtures for convenience
pub use fixtures::*;

#[derive(Debug, Default)]
struct MockFsState {
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
    errors: HashMap<PathBuf, io::ErrorKind>,
    accessed: Vec<PathBuf>,
}

/// Mock filesystem for testing without real I/O.
///
/// Holds sets of directories and files, and can be told to fail on specific
/// paths. Every `open_dir` and `file_exists` call is recorded.
#[derive(Debug, Default)]
pub struct MockFileSystem {
    state: Mutex<MockFsState>,
}

impl MockFileSystem {
    /// Create a new empty mock filesystem.
    pub fn new() -> Self {
        MockFileSystem::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockFsState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a file, creating its parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.state().files.insert(path.to_path_buf());
    }

    /// Add a directory and all of its ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.state();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            state.dirs.insert(ancestor.to_path_buf());
        }
    }

    /// Make any access to `path` fail with `kind`.
    pub fn fail_on(&self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        self.state()
            .errors
            .insert(path.as_ref().to_path_buf(), kind);
    }

    /// Every path accessed so far, in order.
    pub fn accessed(&self) -> Vec<PathBuf> {
        self.state().accessed.clone()
    }
}

impl FileSystem for MockFileSystem {
    fn open_dir(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state();
        state.accessed.push(path.to_path_buf());

        if let Some(kind) = state.errors.get(path) {
            return Err(io::Error::from(*kind));
        }
        if state.dirs.contains(path) {
            Ok(())
        } else if state.files.contains(path) {
            Err(io::Error::from(io::ErrorKind::NotADirectory))
        } else {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
    }

    fn file_exists(&self, dir: &Path, name: &str) -> io::Result<bool> {
        let path = dir.join(name);
        let mut state = self.state();
        state.accessed.push(path.clone());

        if let Some(kind) = state.errors.get(&path) {
            return Err(io::Error::from(*kind));
        }
        Ok(state.files.contains(&path) || state.dirs.contains(&path))
    }
}

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// How the process ends; `None` means it fails to spawn.
    pub termination: Option<Termination>,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            termination: Some(Termination::Exited(0)),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a successful output with the given stderr.
    pub fn stderr(stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            termination: Some(Termination::Exited(0)),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            termination: Some(Termination::Exited(status)),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// A process killed by a signal.
    pub fn crashed() -> Self {
        MockProcessOutput {
            termination: Some(Termination::Other),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// A process that cannot be started.
    pub fn spawn_failure() -> Self {
        MockProcessOutput {
            termination: None,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn to_result(&self) -> Result<CapturedOutput, ProcessError> {
        let termination = self.termination.ok_or_else(|| {
            ProcessError::Spawn(io::Error::from(io::ErrorKind::NotFound))
        })?;
        Ok(CapturedOutput {
            termination,
            stdout: self.stdout.clone().into_bytes(),
            stderr: self.stderr.clone().into_bytes(),
        })
    }
}

/// Pattern for matching commands in MockRunner.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
        }
    }
}

#[derive(Debug, Default)]
struct MockRunnerState {
    expectations: Vec<(CommandPattern, MockProcessOutput)>,
    calls: Vec<String>,
}

/// Mock process runner.
///
/// Returns the output of the first expectation matching the full command
/// line, and records every command it was asked to run. Unmatched commands
/// fail to spawn.
#[derive(Debug, Default)]
pub struct MockRunner {
    state: Mutex<MockRunnerState>,
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        MockRunner::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockRunnerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandPattern::Exact(cmd.to_string()), output)
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandPattern::StartsWith(prefix.to_string()), output)
    }

    fn expect_pattern(&self, pattern: CommandPattern, output: MockProcessOutput) -> &Self {
        self.state().expectations.push((pattern, output));
        self
    }

    /// Get all commands that were called.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &ProcessBuilder, _max_output: usize) -> Result<CapturedOutput, ProcessError> {
        let full_cmd = cmd.display_command();
        let mut state = self.state();
        state.calls.push(full_cmd.clone());

        match state
            .expectations
            .iter()
            .find(|(pattern, _)| pattern.matches(&full_cmd))
        {
            Some((_, output)) => output.to_result(),
            None => MockProcessOutput::spawn_failure().to_result(),
        }
    }
}

/// Log sink shared between a test and its tracing subscriber.
#[derive(Debug, Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with an `info`-level subscriber installed on this thread and
/// return what it logged, the way the CLI shows it by default.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = buffer.0.lock().unwrap_or_else(|e| e.into_inner()).clone();
    (result, String::from_utf8_lossy(&logs).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_classifies_paths() {
        let fs = MockFileSystem::new();
        fs.add_file("/a/b/file.h");

        assert!(fs.open_dir(Path::new("/a")).is_ok());
        assert!(fs.open_dir(Path::new("/a/b")).is_ok());
        assert_eq!(
            fs.open_dir(Path::new("/a/b/file.h")).unwrap_err().kind(),
            io::ErrorKind::NotADirectory
        );
        assert_eq!(
            fs.open_dir(Path::new("/nope")).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
        assert!(fs.file_exists(Path::new("/a/b"), "file.h").unwrap());
        assert_eq!(fs.accessed().len(), 5);
    }

    #[test]
    fn test_mock_runner_matches_in_order() {
        let runner = MockRunner::new();
        runner
            .expect("cc --version", MockProcessOutput::success("cc 12"))
            .expect_prefix("cc", MockProcessOutput::failure(1, "bad"));

        let out = runner
            .run(&ProcessBuilder::new("cc").arg("--version"), 0)
            .unwrap();
        assert_eq!(out.stdout_lossy(), "cc 12");

        let out = runner.run(&ProcessBuilder::new("cc").arg("-E"), 0).unwrap();
        assert_eq!(out.termination, Termination::Exited(1));

        assert!(runner.run(&ProcessBuilder::new("ld"), 0).is_err());
        assert_eq!(runner.calls(), vec!["cc --version", "cc -E", "ld"]);
    }
}
