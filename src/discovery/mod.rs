//! Native libc discovery.
//!
//! [`NativeDiscovery`] picks the probes that apply to the target, runs them
//! as one [`Batch`], and merges their fragments into a single
//! [`InstallationRecord`]. Each probe owns a disjoint set of fields.
//!
//! | target                 | probes                                                |
//! |------------------------|-------------------------------------------------------|
//! | Windows, GNU ABI       | compiler headers, compiler `crt2.o`                   |
//! | Windows, MSVC ABI      | SDK lookup, then the five SDK/MSVC directory probes   |
//! | FreeBSD, NetBSD        | compiler headers; `crt_dir` is `/usr/lib`             |
//! | Linux, DragonFly       | compiler headers, compiler `crt1.o`                   |
//! | anything else          | compiler headers; no `crt_dir`                        |

use std::path::PathBuf;

use crate::core::record::{Field, InstallationRecord};
use crate::core::target::{Os, Target};
use crate::util::config::ToolchainConfig;
use crate::util::fs::{FileSystem, SystemFileSystem};
use crate::util::join::Batch;
use crate::util::process::{CommandRunner, SystemRunner};

pub mod cc;
pub mod errors;
pub mod windows_sdk;

pub use cc::{CompilerProbe, FileNameQuery};
pub use errors::{DiscoveryError, Result};
pub use windows_sdk::{
    EnvSdkLocator, SdkCandidate, SdkDirectoryProbe, SdkInstallation, SdkLocateError, SdkLocator,
};

/// `crt_dir` on FreeBSD and NetBSD.
const BSD_CRT_DIR: &str = "/usr/lib";

/// Settings threaded into every probe.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Platform to discover for.
    pub target: Target,
    /// C compiler executable used by compiler probes.
    pub cc: PathBuf,
    /// Report failed compiler queries with their command line and stderr.
    pub verbose: bool,
}

impl DiscoveryOptions {
    /// Create options using `cc` as the C compiler.
    pub fn new(target: Target, cc: impl Into<PathBuf>) -> Self {
        DiscoveryOptions {
            target,
            cc: cc.into(),
            verbose: false,
        }
    }

    /// The compiler used when nothing overrides it.
    pub fn default_cc(target: &Target) -> &'static str {
        if target.os == Os::Windows {
            "cc.exe"
        } else {
            "cc"
        }
    }

    /// Resolve the compiler from the environment.
    ///
    /// Priority: `CC` environment variable, then the toolchain settings
    /// file, then the platform default.
    pub fn from_env(target: Target, settings: &ToolchainConfig) -> Self {
        let cc = std::env::var_os("CC")
            .filter(|cc| !cc.is_empty())
            .map(PathBuf::from)
            .or_else(|| settings.toolchain.cc.clone())
            .unwrap_or_else(|| PathBuf::from(Self::default_cc(&target)));

        DiscoveryOptions::new(target, cc)
    }

    /// Use a different C compiler.
    pub fn with_cc(mut self, cc: impl Into<PathBuf>) -> Self {
        self.cc = cc.into();
        self
    }

    /// Enable or disable verbose failure reports.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Which probes run for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    WindowsGnu,
    WindowsMsvc,
    Bsd,
    LinuxLike,
    HeadersOnly,
}

impl Strategy {
    pub fn for_target(target: &Target) -> Self {
        match target.os {
            Os::Windows if target.abi.is_gnu() => Strategy::WindowsGnu,
            Os::Windows => Strategy::WindowsMsvc,
            Os::FreeBsd | Os::NetBsd => Strategy::Bsd,
            Os::Linux | Os::DragonFly => Strategy::LinuxLike,
            _ => Strategy::HeadersOnly,
        }
    }
}

/// Discovers the libc installation of a target.
pub struct NativeDiscovery<'a> {
    options: &'a DiscoveryOptions,
    runner: &'a dyn CommandRunner,
    fs: &'a dyn FileSystem,
    sdk: &'a dyn SdkLocator,
}

impl<'a> NativeDiscovery<'a> {
    pub fn new(
        options: &'a DiscoveryOptions,
        runner: &'a dyn CommandRunner,
        fs: &'a dyn FileSystem,
        sdk: &'a dyn SdkLocator,
    ) -> Self {
        NativeDiscovery {
            options,
            runner,
            fs,
            sdk,
        }
    }

    /// Run every probe for the target and merge the results.
    ///
    /// All probes of the batch run to completion before this returns, even
    /// when one of them fails. On error nothing is returned; partial results
    /// are dropped.
    pub fn find_native(&self) -> Result<InstallationRecord> {
        let target = &self.options.target;
        let strategy = Strategy::for_target(target);
        tracing::info!("discovering libc for {} ({:?})", target, strategy);

        let compiler = CompilerProbe::new(self.options, self.runner, self.fs);
        let mut record = InstallationRecord::new();

        let fragments = match strategy {
            Strategy::WindowsMsvc => {
                let sdk = self.sdk.locate(target).map_err(|e| {
                    tracing::debug!("Windows SDK lookup failed: {}", e);
                    DiscoveryError::from(e)
                })?;
                let probe = SdkDirectoryProbe::new(&sdk, target, self.fs);

                let mut batch: Batch<'_, InstallationRecord, DiscoveryError> = Batch::new();
                batch
                    .add(|| probe.find_msvc_include_dir())
                    .add(|| probe.find_msvc_lib_dir())
                    .add(|| probe.find_kernel32_lib_dir())
                    .add(|| probe.find_ucrt_include_dir())
                    .add(|| probe.find_ucrt_crt_dir());
                // `sdk` is released here, after every probe using it finished.
                batch.wait()?
            }
            Strategy::WindowsGnu | Strategy::LinuxLike => {
                let mut batch = Batch::new();
                batch
                    .add(|| compiler.find_headers())
                    .add(|| compiler.find_crt_dir());
                batch.wait()?
            }
            Strategy::Bsd => {
                record.set(Field::CrtDir, BSD_CRT_DIR);
                let mut batch = Batch::new();
                batch.add(|| compiler.find_headers());
                batch.wait()?
            }
            Strategy::HeadersOnly => {
                let mut batch = Batch::new();
                batch.add(|| compiler.find_headers());
                batch.wait()?
            }
        };

        for fragment in fragments {
            record.absorb(fragment);
        }

        tracing::debug!("discovered libc: {:?}", record);
        Ok(record)
    }
}

/// Discover the libc installation with the real filesystem, real processes
/// and the environment-based SDK locator.
pub fn find_native_libc(options: &DiscoveryOptions) -> Result<InstallationRecord> {
    let sdk = EnvSdkLocator::from_env();
    NativeDiscovery::new(options, &SystemRunner, &SystemFileSystem, &sdk).find_native()
}
