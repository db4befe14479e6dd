//! Tracing setup shared by the binaries.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::sanitize::SanitizingMakeWriter;
use crate::config::Settings;

/// Install the global subscriber. Keep the returned guard alive until exit.
///
/// Filtering follows `RUST_LOG`, default `info`. Every line is sanitized.
/// Settings warnings collected before this point are logged here.
///
/// # Errors
/// Returns an I/O error if the log file cannot be opened.
pub fn init(settings: &Settings) -> std::io::Result<WorkerGuard> {
    let (writer, guard) = match settings.log_destination() {
        Some(path) => tracing_appender::non_blocking(open_log_file(&path)?),
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    for warning in &settings.warnings {
        tracing::warn!("{}", warning);
    }
    Ok(guard)
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}
