//! Windows SDK and MSVC directory probes.
//!
//! The SDK locator reports up to two installed kits (Windows 10 first, then
//! Windows 8.1) and, when Visual Studio is present, the MSVC library
//! directory. The probes here turn that report into record fields by
//! checking for a marker file in each derived directory.
//!
//! Kits are tried in the order given, newest first; the first kit with the
//! marker wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::record::{Field, InstallationRecord};
use crate::core::target::{Arch, Target};
use crate::util::fs::{is_tolerated_open_error, FileSystem};

use super::cc::STDLIB_HEADER;
use super::errors::{DiscoveryError, Result};

/// Longest path the locator reports, matching the Win32 `MAX_PATH`.
const MAX_PATH: usize = 260;

/// One installed Windows kit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkCandidate {
    /// Kit root, e.g. `C:\Program Files (x86)\Windows Kits\10`.
    pub root: PathBuf,
    /// Kit version, e.g. `10.0.19041.0`.
    pub version: String,
}

impl SdkCandidate {
    pub fn new(root: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        SdkCandidate {
            root: root.into(),
            version: version.into(),
        }
    }
}

/// What the SDK locator found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkInstallation {
    /// At most two kits, highest version first.
    pub candidates: Vec<SdkCandidate>,
    /// MSVC library directory, e.g. `...\VC\Tools\MSVC\14.29.30133\lib\x64`.
    pub msvc_lib_dir: Option<PathBuf>,
}

/// Error from an SDK locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SdkLocateError {
    #[error("out of memory")]
    OutOfMemory,

    #[error("no Windows SDK installation found")]
    NotFound,

    #[error("Windows SDK path too long")]
    PathTooLong,
}

impl From<SdkLocateError> for DiscoveryError {
    fn from(err: SdkLocateError) -> Self {
        match err {
            SdkLocateError::OutOfMemory => DiscoveryError::OutOfMemory,
            SdkLocateError::NotFound | SdkLocateError::PathTooLong => {
                DiscoveryError::WindowsSdkNotFound
            }
        }
    }
}

/// Finds installed Windows SDKs.
pub trait SdkLocator: Sync {
    fn locate(&self, target: &Target) -> std::result::Result<SdkInstallation, SdkLocateError>;
}

/// Directory name used for `arch` under the SDK `Lib` tree.
pub fn sdk_arch_dir(arch: &Arch) -> Result<&'static str> {
    match arch {
        Arch::X86 => Ok("x86"),
        Arch::X86_64 => Ok("x64"),
        Arch::Arm => Ok("arm"),
        _ => Err(DiscoveryError::UnsupportedArchitecture),
    }
}

/// Resolves record fields from an [`SdkInstallation`].
pub struct SdkDirectoryProbe<'a> {
    sdk: &'a SdkInstallation,
    target: &'a Target,
    fs: &'a dyn FileSystem,
}

impl<'a> SdkDirectoryProbe<'a> {
    pub fn new(sdk: &'a SdkInstallation, target: &'a Target, fs: &'a dyn FileSystem) -> Self {
        SdkDirectoryProbe { sdk, target, fs }
    }

    /// `include_dir`: `<root>\Include\<version>\ucrt` containing `stdlib.h`.
    pub fn find_ucrt_include_dir(&self) -> Result<InstallationRecord> {
        let dir = self.search(
            |c| c.root.join("Include").join(&c.version).join("ucrt"),
            STDLIB_HEADER,
            DiscoveryError::LibCStdLibHeaderNotFound,
        )?;
        Ok(fragment(Field::IncludeDir, dir))
    }

    /// `crt_dir`: `<root>\Lib\<version>\ucrt\<arch>` containing `ucrt.lib`.
    pub fn find_ucrt_crt_dir(&self) -> Result<InstallationRecord> {
        let arch = sdk_arch_dir(&self.target.arch)?;
        let dir = self.search(
            |c| c.root.join("Lib").join(&c.version).join("ucrt").join(arch),
            "ucrt.lib",
            DiscoveryError::LibCRuntimeNotFound,
        )?;
        Ok(fragment(Field::CrtDir, dir))
    }

    /// `kernel32_lib_dir`: `<root>\Lib\<version>\um\<arch>` containing `kernel32.lib`.
    pub fn find_kernel32_lib_dir(&self) -> Result<InstallationRecord> {
        let arch = sdk_arch_dir(&self.target.arch)?;
        let dir = self.search(
            |c| c.root.join("Lib").join(&c.version).join("um").join(arch),
            "kernel32.lib",
            DiscoveryError::LibCKernel32LibNotFound,
        )?;
        Ok(fragment(Field::Kernel32LibDir, dir))
    }

    /// `sys_include_dir`: the `include` directory two levels above the MSVC
    /// library directory, if it contains `vcruntime.h`.
    pub fn find_msvc_include_dir(&self) -> Result<InstallationRecord> {
        let lib_dir = self
            .sdk
            .msvc_lib_dir
            .as_deref()
            .ok_or(DiscoveryError::LibCStdLibHeaderNotFound)?;
        let base = lib_dir
            .parent()
            .and_then(Path::parent)
            .ok_or(DiscoveryError::LibCStdLibHeaderNotFound)?;
        let dir = base.join("include");

        if let Err(e) = self.fs.open_dir(&dir) {
            tracing::debug!("cannot open MSVC include dir {}: {}", dir.display(), e);
            return Err(if is_tolerated_open_error(&e) {
                DiscoveryError::LibCStdLibHeaderNotFound
            } else {
                DiscoveryError::FileSystem
            });
        }

        if !self.has_marker(&dir, "vcruntime.h")? {
            return Err(DiscoveryError::LibCStdLibHeaderNotFound);
        }

        Ok(fragment(Field::SysIncludeDir, dir))
    }

    /// `msvc_lib_dir`: copied from the locator.
    pub fn find_msvc_lib_dir(&self) -> Result<InstallationRecord> {
        let dir = self
            .sdk
            .msvc_lib_dir
            .clone()
            .ok_or(DiscoveryError::LibCRuntimeNotFound)?;
        Ok(fragment(Field::MsvcLibDir, dir))
    }

    /// First candidate directory containing `marker`.
    fn search(
        &self,
        subdir: impl Fn(&SdkCandidate) -> PathBuf,
        marker: &str,
        not_found: DiscoveryError,
    ) -> Result<PathBuf> {
        for candidate in &self.sdk.candidates {
            let dir = subdir(candidate);
            if let Err(e) = self.fs.open_dir(&dir) {
                if is_tolerated_open_error(&e) {
                    tracing::debug!("skipping SDK candidate {}: {}", dir.display(), e);
                    continue;
                }
                tracing::debug!("cannot open {}: {}", dir.display(), e);
                return Err(DiscoveryError::FileSystem);
            }

            if self.has_marker(&dir, marker)? {
                return Ok(dir);
            }
        }

        Err(not_found)
    }

    fn has_marker(&self, dir: &Path, marker: &str) -> Result<bool> {
        self.fs.file_exists(dir, marker).map_err(|e| {
            tracing::debug!("cannot access {} in {}: {}", marker, dir.display(), e);
            DiscoveryError::FileSystem
        })
    }
}

fn fragment(field: Field, dir: PathBuf) -> InstallationRecord {
    let mut record = InstallationRecord::new();
    record.set(field, dir);
    record
}

/// Locates the SDK from the variables a Visual Studio developer prompt sets
/// (`vcvarsall.bat`).
#[derive(Debug, Clone, Default)]
pub struct EnvSdkLocator {
    vars: HashMap<String, String>,
}

impl EnvSdkLocator {
    const VARS: [&'static str; 5] = [
        "UniversalCRTSdkDir",
        "UCRTVersion",
        "WindowsSdkDir",
        "WindowsSDKVersion",
        "VCToolsInstallDir",
    ];

    /// Snapshot the relevant variables of the current process.
    pub fn from_env() -> Self {
        Self::from_vars(
            Self::VARS
                .iter()
                .filter_map(|k| std::env::var(k).ok().map(|v| (k.to_string(), v))),
        )
    }

    /// Build a locator from explicit variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvSdkLocator {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| trim_separators(v))
            .filter(|v| !v.is_empty())
    }
}

impl SdkLocator for EnvSdkLocator {
    fn locate(&self, target: &Target) -> std::result::Result<SdkInstallation, SdkLocateError> {
        let mut sdk = SdkInstallation::default();

        if let (Some(root), Some(version)) = (self.var("UniversalCRTSdkDir"), self.var("UCRTVersion")) {
            sdk.candidates.push(SdkCandidate::new(root, version));
        }

        // An 8.1 kit has no per-version directories of its own; `winv6.3`
        // is its fixed layout name.
        if let Some(root) = self.var("WindowsSdkDir") {
            let version = self.var("WindowsSDKVersion").unwrap_or("");
            let is_81 = version.starts_with("8.1") || root.ends_with("8.1");
            let is_duplicate = sdk.candidates.iter().any(|c| c.root == Path::new(root));
            if is_81 && !is_duplicate {
                sdk.candidates.push(SdkCandidate::new(root, "winv6.3"));
            }
        }

        if sdk.candidates.is_empty() {
            return Err(SdkLocateError::NotFound);
        }

        if let Some(tools) = self.var("VCToolsInstallDir") {
            match sdk_arch_dir(&target.arch) {
                Ok(arch) => sdk.msvc_lib_dir = Some(Path::new(tools).join("lib").join(arch)),
                Err(_) => tracing::debug!("no MSVC library directory for {}", target.arch.as_str()),
            }
        }

        let too_long = sdk
            .candidates
            .iter()
            .map(|c| c.root.as_path())
            .chain(sdk.msvc_lib_dir.as_deref())
            .any(|p| p.as_os_str().len() > MAX_PATH);
        if too_long {
            return Err(SdkLocateError::PathTooLong);
        }

        tracing::debug!("located Windows SDK: {:?}", sdk);
        Ok(sdk)
    }
}

fn trim_separators(s: &str) -> &str {
    s.trim_end_matches(['\\', '/'])
}
