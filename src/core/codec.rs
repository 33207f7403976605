//! Text format for persisted libc installations.
//!
//! ```text
//! # comment
//! include_dir=/usr/include
//! sys_include_dir=/usr/include/x86_64-linux-gnu
//! crt_dir=/usr/lib/x86_64-linux-gnu
//! msvc_lib_dir=
//! kernel32_lib_dir=
//! ```
//!
//! Blank lines and `#` lines are skipped. Every other line is `key=value`;
//! the value is everything after the first `=` and an empty value leaves the
//! field unset. All five keys must appear. Unknown keys are ignored so that
//! older tools can read files written by newer ones.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::core::record::{Field, InstallationRecord};
use crate::core::target::Target;
use crate::core::validate;

/// Error parsing a libc file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: expected `key=value`")]
    MissingEquals { line: usize },

    #[error("missing field `{key}`")]
    MissingField { key: &'static str },

    #[error("`{key}` may not be empty: {reason}")]
    RequiredFieldEmpty {
        key: &'static str,
        reason: &'static str,
    },
}

/// Parse libc file contents and validate them for `target`.
pub fn parse(text: &str, target: &Target) -> Result<InstallationRecord, ParseError> {
    parse_inner(text, target).inspect_err(|e| tracing::debug!("invalid libc file: {}", e))
}

fn parse_inner(text: &str, target: &Target) -> Result<InstallationRecord, ParseError> {
    let mut record = InstallationRecord::new();
    let mut seen = HashSet::new();

    for (index, line) in text.lines().enumerate() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or(ParseError::MissingEquals { line: index + 1 })?;

        let Some(field) = Field::from_key(key) else {
            tracing::debug!("ignoring unknown libc key `{}`", key);
            continue;
        };

        seen.insert(field);
        record.set(field, value);
    }

    if let Some(field) = Field::ALL.into_iter().find(|f| !seen.contains(f)) {
        return Err(ParseError::MissingField { key: field.key() });
    }

    if let Some((field, reason)) = validate::first_missing(&record, target) {
        return Err(ParseError::RequiredFieldEmpty {
            key: field.key(),
            reason,
        });
    }

    Ok(record)
}

/// Render a record in canonical form.
pub fn render(record: &InstallationRecord) -> String {
    let mut out = String::new();
    for field in Field::ALL {
        let value = record
            .get(field)
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}\n{}={}\n", field.comment(), field.key(), value);
    }
    out
}

impl InstallationRecord {
    /// Read and validate a libc file.
    pub fn load(path: &Path, target: &Target) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read libc file: {}", path.display()))?;

        parse(&text, target)
            .with_context(|| format!("failed to parse libc file: {}", path.display()))
    }

    /// Write the canonical rendering of this record to `path`.
    ///
    /// The file is written to a temporary sibling and renamed into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
        std::io::Write::write_all(&mut tmp, render(self).as_bytes())
            .with_context(|| format!("failed to write libc file: {}", path.display()))?;
        tmp.persist(path)
            .with_context(|| format!("failed to write libc file: {}", path.display()))?;

        Ok(())
    }
}
