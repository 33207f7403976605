//! `harbour-libc check` command

use anyhow::{Context, Result};

use super::load_settings;
use crate::cli::CheckArgs;
use harbour_libc::util::config;
use harbour_libc::{Field, InstallationRecord, Target};

pub fn execute(args: CheckArgs) -> Result<()> {
    let settings = load_settings()?;

    let triple = args.target.or(settings.toolchain.target);
    let target = match triple {
        Some(triple) => Target::parse(&triple)
            .with_context(|| format!("invalid target triple `{}`", triple))?,
        None => Target::host(),
    };

    let path = match args.path {
        Some(path) => path,
        None => {
            let cwd = std::env::current_dir().context("failed to determine current directory")?;
            config::project_libc_file_path(&cwd)
        }
    };

    let record = InstallationRecord::load(&path, &target)?;

    println!("{}: ok ({})", path.display(), target);
    for field in Field::ALL {
        let value = match record.get(field) {
            Some(dir) => dir.display().to_string(),
            None => "(not needed)".to_string(),
        };
        println!("  {:<17} {}", field.key(), value);
    }

    Ok(())
}
