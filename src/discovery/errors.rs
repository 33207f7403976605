//! Discovery error types.

use thiserror::Error;

/// Terminal error of a probe or of native discovery as a whole.
///
/// Errors carry no payload; details go to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("out of memory")]
    OutOfMemory,

    #[error("filesystem error while searching for libc")]
    FileSystem,

    #[error("unable to spawn the C compiler")]
    UnableToSpawnCCompiler,

    #[error("the C compiler exited with a non-zero status")]
    CCompilerExitCode,

    #[error("the C compiler crashed")]
    CCompilerCrashed,

    #[error("the C compiler did not report any include directories")]
    CCompilerCannotFindHeaders,

    #[error("unable to find the libc runtime directory")]
    LibCRuntimeNotFound,

    #[error("unable to find the libc standard headers")]
    LibCStdLibHeaderNotFound,

    #[error("unable to find kernel32.lib")]
    LibCKernel32LibNotFound,

    #[error("unsupported architecture for the Windows SDK")]
    UnsupportedArchitecture,

    #[error("unable to find the Windows SDK")]
    WindowsSdkNotFound,
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
