//! Harbour libc CLI - discover and check native C library installations

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("harbour_libc=debug")
    } else {
        EnvFilter::new("harbour_libc=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Detect(args) => commands::detect::execute(args, cli.verbose),
        Commands::Check(args) => commands::check::execute(args),
        Commands::Env => commands::env::execute(),
    }
}
