//! Command implementations

pub mod check;
pub mod detect;
pub mod env;

use anyhow::{Context, Result};
use harbour_libc::util::config;
use harbour_libc::util::ToolchainConfig;

/// Toolchain settings for the current directory.
pub fn load_settings() -> Result<ToolchainConfig> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    Ok(config::load_for_project(&cwd))
}
