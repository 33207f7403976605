//! C compiler probes.
//!
//! The system C compiler is used as an oracle for two questions:
//! - which directories does it search for headers (`cc -E -Wp,-v -xc /dev/null`)
//! - where does a given runtime file live (`cc -print-file-name=crt1.o`)

use std::path::{Path, PathBuf};

use crate::core::record::{Field, InstallationRecord};
use crate::core::target::Os;
use crate::util::fs::{is_tolerated_open_error, FileSystem};
use crate::util::process::{
    CapturedOutput, CommandRunner, ProcessBuilder, Termination, MAX_CAPTURED_OUTPUT,
};

use super::errors::{DiscoveryError, Result};
use super::DiscoveryOptions;

/// Marker confirming a C standard header directory.
pub const STDLIB_HEADER: &str = "stdlib.h";

/// Whether the full path or only the containing directory is wanted from
/// [`CompilerProbe::print_file_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileNameQuery {
    FullPath,
    ParentDir,
}

/// Runs the configured C compiler to locate headers and runtime files.
pub struct CompilerProbe<'a> {
    options: &'a DiscoveryOptions,
    runner: &'a dyn CommandRunner,
    fs: &'a dyn FileSystem,
}

impl<'a> CompilerProbe<'a> {
    pub fn new(
        options: &'a DiscoveryOptions,
        runner: &'a dyn CommandRunner,
        fs: &'a dyn FileSystem,
    ) -> Self {
        CompilerProbe {
            options,
            runner,
            fs,
        }
    }

    /// The platform-specific header that confirms the system include dir.
    fn sys_header_marker(&self) -> &'static str {
        if self.options.target.os == Os::Windows {
            "sys/types.h"
        } else {
            "sys/errno.h"
        }
    }

    /// The runtime startup object used to locate `crt_dir`.
    pub fn crt_object(&self) -> &'static str {
        if self.options.target.os == Os::Windows {
            "crt2.o"
        } else {
            "crt1.o"
        }
    }

    fn null_device(&self) -> &'static str {
        if self.options.target.os == Os::Windows {
            "nul"
        } else {
            "/dev/null"
        }
    }

    /// Find `include_dir` and `sys_include_dir` from the compiler's header
    /// search list.
    pub fn find_headers(&self) -> Result<InstallationRecord> {
        let cmd = ProcessBuilder::new(&self.options.cc).args([
            "-E",
            "-Wp,-v",
            "-xc",
            self.null_device(),
        ]);
        let output = self.run(&cmd, None)?;
        let stderr = output.stderr_lossy();

        let candidates = search_candidates(&stderr);
        if candidates.is_empty() {
            return Err(DiscoveryError::CCompilerCannotFindHeaders);
        }

        let sys_marker = self.sys_header_marker();
        let mut found = InstallationRecord::new();

        // Later entries are more specific (override directories come last),
        // so they win ties.
        for dir in candidates.iter().rev() {
            let dir = Path::new(dir);
            if let Err(e) = self.fs.open_dir(dir) {
                if is_tolerated_open_error(&e) {
                    tracing::debug!("skipping include candidate {}: {}", dir.display(), e);
                    continue;
                }
                tracing::debug!("cannot open {}: {}", dir.display(), e);
                return Err(DiscoveryError::FileSystem);
            }

            if !found.is_set(Field::IncludeDir) && self.has_marker(dir, STDLIB_HEADER)? {
                found.set(Field::IncludeDir, dir);
            }
            if !found.is_set(Field::SysIncludeDir) && self.has_marker(dir, sys_marker)? {
                found.set(Field::SysIncludeDir, dir);
            }

            if found.is_set(Field::IncludeDir) && found.is_set(Field::SysIncludeDir) {
                return Ok(found);
            }
        }

        Err(DiscoveryError::LibCStdLibHeaderNotFound)
    }

    /// Ask the compiler where `basename` lives.
    ///
    /// Compilers that cannot find the file echo the bare name back instead of
    /// failing, so an answer equal to `basename` counts as not found.
    pub fn print_file_name(&self, basename: &str, query: FileNameQuery) -> Result<PathBuf> {
        let cmd = ProcessBuilder::new(&self.options.cc).arg(format!("-print-file-name={}", basename));
        let output = self.run(&cmd, Some(basename))?;
        let stdout = output.stdout_lossy();

        let line = stdout.lines().next().unwrap_or("").trim_end();
        if line.is_empty() || line == basename {
            tracing::debug!("compiler could not resolve {}", basename);
            return Err(DiscoveryError::LibCRuntimeNotFound);
        }

        let path = Path::new(line);
        match query {
            FileNameQuery::FullPath => Ok(path.to_path_buf()),
            FileNameQuery::ParentDir => match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
                _ => Err(DiscoveryError::LibCRuntimeNotFound),
            },
        }
    }

    /// Find `crt_dir` by resolving the C runtime startup object.
    pub fn find_crt_dir(&self) -> Result<InstallationRecord> {
        let dir = self.print_file_name(self.crt_object(), FileNameQuery::ParentDir)?;
        let mut found = InstallationRecord::new();
        found.set(Field::CrtDir, dir);
        Ok(found)
    }

    fn has_marker(&self, dir: &Path, marker: &str) -> Result<bool> {
        self.fs.file_exists(dir, marker).map_err(|e| {
            tracing::debug!("cannot access {} in {}: {}", marker, dir.display(), e);
            DiscoveryError::FileSystem
        })
    }

    /// Run a compiler query and require a clean exit.
    fn run(&self, cmd: &ProcessBuilder, sought: Option<&str>) -> Result<CapturedOutput> {
        let output = match self.runner.run(cmd, MAX_CAPTURED_OUTPUT) {
            Ok(output) => output,
            Err(e) => {
                self.report_failure(cmd, sought, &format!("{:#}", anyhow::Error::new(e)));
                return Err(DiscoveryError::UnableToSpawnCCompiler);
            }
        };

        let err = match output.termination {
            Termination::Exited(0) => return Ok(output),
            Termination::Exited(_) => DiscoveryError::CCompilerExitCode,
            Termination::Other => DiscoveryError::CCompilerCrashed,
        };
        self.report_failure(cmd, sought, &output.stderr_lossy());
        Err(err)
    }

    fn report_failure(&self, cmd: &ProcessBuilder, sought: Option<&str>, detail: &str) {
        let command = cmd.display_command();
        let sought = sought.map(|s| format!(" (looking for `{}`)", s)).unwrap_or_default();
        if self.options.verbose {
            tracing::warn!("C compiler query failed: `{}`{}\n{}", command, sought, detail);
        } else {
            tracing::debug!("C compiler query failed: `{}`{}\n{}", command, sought, detail);
        }
    }
}

/// Extract include search directories from `-Wp,-v` diagnostics.
///
/// The compiler lists them one per line with a single leading space, in
/// search order.
pub fn search_candidates(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .filter(|line| line.starts_with(' '))
        .map(|line| line.trim_start().to_string())
        .filter(|dir| !dir.is_empty())
        .collect()
}
