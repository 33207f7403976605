//! `harbour-libc detect` command

use anyhow::{Context, Result};

use super::load_settings;
use crate::cli::DetectArgs;
use harbour_libc::core::codec;
use harbour_libc::{find_native_libc, DiscoveryOptions, Target};

pub fn execute(args: DetectArgs, verbose: bool) -> Result<()> {
    let settings = load_settings()?;

    let mut options = DiscoveryOptions::from_env(Target::host(), &settings).with_verbose(verbose);
    if let Some(cc) = args.cc {
        options = options.with_cc(cc);
    }

    tracing::debug!(
        "detecting libc for {} using {}",
        options.target,
        options.cc.display()
    );

    let record = find_native_libc(&options)
        .with_context(|| format!("failed to detect libc for {}", options.target))?;

    if let Some(output) = args.output {
        record.save(&output)?;
        tracing::info!("wrote {}", output.display());
    } else if args.json {
        let json = serde_json::to_string_pretty(&record).context("failed to serialize record")?;
        println!("{}", json);
    } else {
        print!("{}", codec::render(&record));
    }

    Ok(())
}
