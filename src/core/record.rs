//! The libc installation record.
//!
//! An [`InstallationRecord`] holds the five filesystem locations needed to
//! compile and link against a target's C runtime. Every field is optional;
//! which ones must be present depends on the target (see
//! [`crate::core::validate`]).

use std::path::{Path, PathBuf};

use serde::Serialize;

/// One of the five record fields.
///
/// [`Field::ALL`] is the canonical order used when rendering and when
/// checking that every key was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    IncludeDir,
    SysIncludeDir,
    CrtDir,
    MsvcLibDir,
    Kernel32LibDir,
}

impl Field {
    /// All fields, in canonical order.
    pub const ALL: [Field; 5] = [
        Field::IncludeDir,
        Field::SysIncludeDir,
        Field::CrtDir,
        Field::MsvcLibDir,
        Field::Kernel32LibDir,
    ];

    /// The key used for this field in libc files.
    pub fn key(self) -> &'static str {
        match self {
            Field::IncludeDir => "include_dir",
            Field::SysIncludeDir => "sys_include_dir",
            Field::CrtDir => "crt_dir",
            Field::MsvcLibDir => "msvc_lib_dir",
            Field::Kernel32LibDir => "kernel32_lib_dir",
        }
    }

    /// Look up a field by its key.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Explanatory comment emitted above the key when rendering.
    pub fn comment(self) -> &'static str {
        match self {
            Field::IncludeDir => {
                "# The directory that contains `stdlib.h`.\n\
                 # On POSIX-like systems, include directories can be found with: `cc -E -Wp,-v -xc /dev/null`"
            }
            Field::SysIncludeDir => {
                "# The system-specific include directory. May be the same as `include_dir`.\n\
                 # On Windows it's the directory that includes `vcruntime.h`.\n\
                 # On POSIX it's the directory that includes `sys/errno.h`."
            }
            Field::CrtDir => {
                "# The directory that contains `crt1.o` or `crt2.o`.\n\
                 # On POSIX, can be found with `cc -print-file-name=crt1.o`.\n\
                 # Not needed when targeting macOS."
            }
            Field::MsvcLibDir => {
                "# The directory that contains `vcruntime.lib`.\n\
                 # Only needed when targeting MSVC on Windows."
            }
            Field::Kernel32LibDir => {
                "# The directory that contains `kernel32.lib`.\n\
                 # Only needed when targeting MSVC on Windows."
            }
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Discovered or loaded locations of a C library installation.
///
/// Always starts all-absent. A present field is never an empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallationRecord {
    pub include_dir: Option<PathBuf>,
    pub sys_include_dir: Option<PathBuf>,
    pub crt_dir: Option<PathBuf>,
    pub msvc_lib_dir: Option<PathBuf>,
    pub kernel32_lib_dir: Option<PathBuf>,
}

impl InstallationRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        InstallationRecord::default()
    }

    /// Get a field.
    pub fn get(&self, field: Field) -> Option<&Path> {
        match field {
            Field::IncludeDir => self.include_dir.as_deref(),
            Field::SysIncludeDir => self.sys_include_dir.as_deref(),
            Field::CrtDir => self.crt_dir.as_deref(),
            Field::MsvcLibDir => self.msvc_lib_dir.as_deref(),
            Field::Kernel32LibDir => self.kernel32_lib_dir.as_deref(),
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<PathBuf> {
        match field {
            Field::IncludeDir => &mut self.include_dir,
            Field::SysIncludeDir => &mut self.sys_include_dir,
            Field::CrtDir => &mut self.crt_dir,
            Field::MsvcLibDir => &mut self.msvc_lib_dir,
            Field::Kernel32LibDir => &mut self.kernel32_lib_dir,
        }
    }

    /// Set a field. An empty path unsets it.
    pub fn set(&mut self, field: Field, value: impl Into<PathBuf>) {
        let value = value.into();
        *self.slot_mut(field) = if value.as_os_str().is_empty() {
            None
        } else {
            Some(value)
        };
    }

    /// Whether a field is present.
    pub fn is_set(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Whether every field is absent.
    pub fn is_empty(&self) -> bool {
        Field::ALL.into_iter().all(|f| !self.is_set(f))
    }

    /// Release every field, returning the record to its initial state.
    pub fn clear(&mut self) {
        *self = InstallationRecord::default();
    }

    /// Iterate over the fields that are present, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &Path)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|p| (f, p)))
    }

    /// Merge the fields set in `fragment` into this record.
    ///
    /// Each field has a single producer, so `fragment` must not carry a field
    /// that is already set here.
    pub fn absorb(&mut self, mut fragment: InstallationRecord) {
        for field in Field::ALL {
            if let Some(path) = fragment.slot_mut(field).take() {
                debug_assert!(
                    !self.is_set(field),
                    "field `{}` written by more than one probe",
                    field
                );
                *self.slot_mut(field) = Some(path);
            }
        }
    }
}
