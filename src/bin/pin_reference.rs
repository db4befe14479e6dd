//! Pins the golden reference output for an artifact bundle.
//!
//! Predicts the canonical example patient and writes `reference_output.json`
//! into the bundle directory. With `--manifest-version`, first (re)writes
//! `manifest.json` binding the current bundle files.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin pin_reference -- [--artifacts <dir>] [--manifest-version <v>]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use glucorisk::config::Settings;
use glucorisk::reference::{pin_reference, write_manifest};

#[derive(Debug, Parser)]
#[command(name = "pin_reference", about = "Pin the golden reference output of a bundle")]
struct Cli {
    /// Artifact bundle directory (overrides GLUCORISK_ARTIFACTS_DIR)
    #[arg(long, value_name = "DIR")]
    artifacts: Option<PathBuf>,

    /// Write manifest.json with this bundle version before pinning
    #[arg(long, value_name = "VERSION")]
    manifest_version: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(dir) = cli.artifacts {
        settings.artifacts_dir = dir;
    }
    let _guard = glucorisk::logging::init(&settings).context("failed to initialize logging")?;
    let dir = settings.artifacts_dir.clone();

    if let Some(version) = cli.manifest_version {
        write_manifest(&dir, Some(version))
            .with_context(|| format!("failed to write manifest for {dir:?}"))?;
    }

    let pipeline = glucorisk::open_pipeline(&settings)
        .with_context(|| format!("failed to load artifacts from {dir:?}"))?;
    let reference = pin_reference(&pipeline, &dir).context("failed to pin reference output")?;

    println!("{}", serde_json::to_string_pretty(&reference)?);
    Ok(())
}
