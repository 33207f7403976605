//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Harbour libc - discover and check native C library installations
#[derive(Parser)]
#[command(name = "harbour-libc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the native libc installation of this machine
    Detect(DetectArgs),

    /// Parse and validate a libc file
    Check(CheckArgs),

    /// Show the compiler and environment used for detection
    Env,
}

#[derive(Args)]
pub struct DetectArgs {
    /// Write the libc file here instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long, conflicts_with = "output")]
    pub json: bool,

    /// C compiler to query (overrides CC and toolchain.toml)
    #[arg(long)]
    pub cc: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// libc file to check (defaults to .harbour/libc.txt)
    pub path: Option<PathBuf>,

    /// Validate for this target triple instead of the host
    #[arg(long)]
    pub target: Option<String>,
}
