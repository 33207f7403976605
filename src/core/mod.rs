//! Core data structures for libc discovery.
//!
//! This module contains the foundational types used throughout the crate:
//! - The installation record and its field table
//! - Target platform identity
//! - Platform-dependent validation rules
//! - The persisted text format

pub mod codec;
pub mod record;
pub mod target;
pub mod validate;

pub use codec::{parse, render, ParseError};
pub use record::{Field, InstallationRecord};
pub use target::{Abi, Arch, Os, Target};
