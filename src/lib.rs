//! Harbour libc - native C library discovery for the Harbour toolchain
//!
//! This crate locates the headers, startup objects and (on Windows/MSVC)
//! import libraries of the C library a target links against, and reads and
//! writes the resulting record as a small text file.

pub mod core;
pub mod discovery;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides mock implementations for filesystem and
/// process execution.
#[cfg(test)]
pub mod test_support;

pub use core::{Field, InstallationRecord, ParseError, Target};
pub use discovery::{
    find_native_libc, DiscoveryError, DiscoveryOptions, NativeDiscovery, Strategy,
};
