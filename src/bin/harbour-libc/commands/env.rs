//! `harbour-libc env` command

use anyhow::Result;

use super::load_settings;
use harbour_libc::util::process::find_executable;
use harbour_libc::{DiscoveryOptions, Strategy, Target};

/// Variables that influence discovery.
const DISCOVERY_VARS: &[&str] = &[
    "CC",
    "UniversalCRTSdkDir",
    "UCRTVersion",
    "WindowsSdkDir",
    "WindowsSDKVersion",
    "VCToolsInstallDir",
];

pub fn execute() -> Result<()> {
    let settings = load_settings()?;
    let target = Target::host();
    let options = DiscoveryOptions::from_env(target.clone(), &settings);

    println!("Discovery:");
    println!();

    let cc = options.cc.to_string_lossy();
    match find_executable(&cc) {
        Some(path) => println!("  CC:       {} ({})", cc, path.display()),
        None => println!("  CC:       {} (not found)", cc),
    }

    println!("  Target:   {}", target);
    println!("  Strategy: {:?}", Strategy::for_target(&target));

    println!();

    println!("Environment:");
    for var in DISCOVERY_VARS {
        if let Ok(value) = std::env::var(var) {
            println!("  {}={}", var, value);
        }
    }

    Ok(())
}
