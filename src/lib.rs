//! # Glucorisk
//!
//! Diabetes risk inference over a pre-trained classifier.
//!
//! This crate provides:
//! - Loading and validation of the exported training artifacts
//! - Preprocessing identical to training (label encoding, scaling, selection)
//! - Single and batch prediction with Low/Medium/High risk banding
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (patient record, preprocessing parameters, results)
//! - `ports`: Trait definitions (`Classifier`, `ArtifactStore`)
//! - `adapters`: Concrete implementations (model families, JSON store, log sanitizer)
//! - `application`: Encoder, assembler, predictor and the pipeline facade
//! - `config`, `logging`: Environment configuration and tracing setup for the binaries
//! - `reference`: Manifest writing and the pinned golden output of a bundle

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod reference;

#[cfg(test)]
mod testing;

pub use adapters::json_store::{load_artifacts, JsonArtifactStore};
pub use application::{HealthReport, PredictionPipeline};
pub use domain::{
    ArtifactLoadError, Gender, PatientInput, PatientRecord, PipelineError, PredictionResult,
    RiskLevel, SmokingHistory,
};
pub use ports::{ArtifactBundle, ArtifactStore, Classifier};

/// Load the bundle `settings` point at and build a pipeline over it.
///
/// # Errors
/// Returns `GlucoriskError::Artifact` if the bundle cannot be loaded.
pub fn open_pipeline(settings: &config::Settings) -> Result<PredictionPipeline> {
    let store = JsonArtifactStore::new(&settings.artifacts_dir)
        .require_manifest(settings.manifest_required());
    Ok(PredictionPipeline::from_store(&store)?)
}

/// Result type for Glucorisk operations
pub type Result<T> = std::result::Result<T, GlucoriskError>;

/// Main error type for Glucorisk
#[derive(Debug, thiserror::Error)]
pub enum GlucoriskError {
    #[error("Artifact loading failed: {0}")]
    Artifact(#[from] ArtifactLoadError),

    #[error("Prediction failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
