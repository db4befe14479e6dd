//! Glucorisk: diabetes risk prediction from the command line.
//!
//! Reads one JSON patient object, or an array of them, from a file or stdin
//! and prints the prediction as JSON on stdout.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use glucorisk::config::Settings;
use glucorisk::{PatientInput, PredictionResult};

#[derive(Debug, Parser)]
#[command(name = "glucorisk", version, about = "Diabetes risk prediction")]
struct Cli {
    /// Artifact bundle directory (overrides GLUCORISK_ARTIFACTS_DIR)
    #[arg(long, value_name = "DIR")]
    artifacts: Option<PathBuf>,

    /// Print the bundle health report and exit
    #[arg(long)]
    health: bool,

    /// JSON file with one patient or an array of patients; stdin if omitted
    input: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Request {
    Batch(Vec<PatientInput>),
    Single(PatientInput),
}

#[derive(Debug, Serialize)]
struct BatchItem {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(dir) = cli.artifacts {
        settings.artifacts_dir = dir;
    }
    let _guard = glucorisk::logging::init(&settings).context("failed to initialize logging")?;

    tracing::info!("Starting Glucorisk...");
    let pipeline = glucorisk::open_pipeline(&settings)
        .with_context(|| format!("failed to load artifacts from {:?}", settings.artifacts_dir))?;

    if cli.health {
        println!("{}", serde_json::to_string_pretty(&pipeline.health())?);
        return Ok(());
    }

    let body = read_input(cli.input.as_ref())?;
    let request: Request =
        serde_json::from_str(&body).context("input is not a patient object or array")?;

    match request {
        Request::Single(input) => {
            let result = pipeline.predict_input(&input)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Request::Batch(inputs) => {
            let items: Vec<BatchItem> = pipeline
                .predict_inputs(&inputs)
                .into_iter()
                .enumerate()
                .map(|(index, outcome)| match outcome {
                    Ok(result) => BatchItem {
                        index,
                        result: Some(result),
                        error: None,
                    },
                    Err(e) => BatchItem {
                        index,
                        result: None,
                        error: Some(e.to_string()),
                    },
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }

    tracing::info!("Glucorisk done.");
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))
        }
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("failed to read stdin")?;
            Ok(body)
        }
    }
}
