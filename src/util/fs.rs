//! Filesystem utilities.
//!
//! Probes only ever ask two questions of the filesystem: can this path be
//! opened as a directory, and does a given file exist inside an open
//! directory. [`FileSystem`] captures exactly that so tests can observe and
//! script every access.

use std::fs;
use std::io;
use std::path::Path;

/// Directory and marker-file access used by the probes.
pub trait FileSystem: Sync {
    /// Open `path` as a directory.
    fn open_dir(&self, path: &Path) -> io::Result<()>;

    /// Whether `name` exists relative to the directory `dir`.
    ///
    /// A missing file is `Ok(false)`; any other failure is an error.
    fn file_exists(&self, dir: &Path, name: &str) -> io::Result<bool>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFileSystem;

impl FileSystem for SystemFileSystem {
    fn open_dir(&self, path: &Path) -> io::Result<()> {
        fs::read_dir(path).map(drop)
    }

    fn file_exists(&self, dir: &Path, name: &str) -> io::Result<bool> {
        match fs::metadata(dir.join(name)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// `ENODEV` has the same value on Linux, macOS and the BSDs.
#[cfg(unix)]
const ENODEV: i32 = 19;

/// Whether a directory-open error just means "not this candidate".
///
/// Not-found, not-a-directory and no-such-device are skipped by the probes;
/// everything else is fatal.
pub fn is_tolerated_open_error(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    ) {
        return true;
    }

    #[cfg(unix)]
    {
        if err.raw_os_error() == Some(ENODEV) {
            return true;
        }
    }

    false
}
