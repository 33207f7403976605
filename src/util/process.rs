//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

/// Upper bound on captured stdout and stderr of a probe process.
pub const MAX_CAPTURED_OUTPUT: usize = 1024 * 1024;

/// Error running a subprocess.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn process")]
    Spawn(#[source] io::Error),

    #[error("failed to collect process output")]
    Io(#[source] io::Error),

    #[error("process output exceeded {limit} bytes")]
    OutputTooLarge { limit: usize },
}

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Normal exit with a status code.
    Exited(i32),
    /// Killed by a signal or otherwise terminated abnormally.
    Other,
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Termination::Exited(code),
            None => Termination::Other,
        }
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub termination: Termination,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.termination == Termination::Exited(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Execute the command, capturing at most `max_output` bytes of each
    /// output stream.
    ///
    /// Exceeding the cap is an error; the child is killed and reaped before
    /// returning.
    pub fn exec_capped(&self, max_output: usize) -> Result<CapturedOutput, ProcessError> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(ProcessError::Spawn)?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr) = std::thread::scope(|s| {
            let stderr_reader = s.spawn(move || read_capped(stderr, max_output));
            let stdout = read_capped(stdout, max_output);
            let stderr = stderr_reader
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stderr reader panicked")));
            (stdout, stderr)
        });

        let collected = stdout.and_then(|out| stderr.map(|err| (out, err)));
        let (stdout, stderr) = match collected {
            Ok((Some(out), Some(err))) => (out, err),
            Ok(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::OutputTooLarge { limit: max_output });
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::Io(e));
            }
        };

        let status = child.wait().map_err(ProcessError::Io)?;

        Ok(CapturedOutput {
            termination: status.into(),
            stdout,
            stderr,
        })
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Read a stream to its end, or return `None` once more than `max` bytes
/// have arrived.
fn read_capped(reader: Option<impl Read>, max: usize) -> io::Result<Option<Vec<u8>>> {
    let Some(reader) = reader else {
        return Ok(Some(Vec::new()));
    };

    let mut buf = Vec::new();
    reader.take(max as u64 + 1).read_to_end(&mut buf)?;
    if buf.len() > max {
        return Ok(None);
    }
    Ok(Some(buf))
}

/// Runs probe processes.
///
/// Discovery goes through this trait so tests can substitute scripted
/// compilers for real ones.
pub trait CommandRunner: Sync {
    fn run(&self, cmd: &ProcessBuilder, max_output: usize) -> Result<CapturedOutput, ProcessError>;
}

/// Runs commands as real subprocesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ProcessBuilder, max_output: usize) -> Result<CapturedOutput, ProcessError> {
        tracing::debug!("running `{}`", cmd.display_command());
        cmd.exec_capped(max_output)
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
