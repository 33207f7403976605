//! Shared utilities

pub mod config;
pub mod fs;
pub mod join;
pub mod process;

pub use config::ToolchainConfig;
pub use fs::{FileSystem, SystemFileSystem};
pub use join::Batch;
pub use process::{CommandRunner, ProcessBuilder, SystemRunner};
