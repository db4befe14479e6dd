//! Error taxonomy shared across the pipeline.

use std::path::PathBuf;

/// Failure to produce a usable artifact bundle.
///
/// Fatal at startup: a process without a valid bundle must not serve
/// predictions.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("Artifact '{artifact}' not found at {path:?}")]
    Missing {
        artifact: &'static str,
        path: PathBuf,
    },

    #[error("Artifact '{artifact}' unreadable: {source}")]
    Unreadable {
        artifact: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact '{artifact}' malformed: {source}")]
    Malformed {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Inconsistent artifact bundle: {0}")]
    Inconsistent(String),

    #[error("Integrity check failed for '{artifact}': {reason}")]
    IntegrityMismatch { artifact: String, reason: String },
}

/// Per-request pipeline failure.
///
/// Everything except `InvalidProbability` and `Model` is caused by the
/// caller's input and is safe to report back verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("Unknown value '{value}' for feature '{field}'. Allowed values: {allowed:?}")]
    UnknownCategory {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Selected feature '{0}' cannot be derived from the patient record")]
    MissingFeature(String),

    #[error("Invalid patient data: {}", .0.join("; "))]
    InvalidRecord(Vec<String>),

    #[error("Model produced an invalid probability: {0}")]
    InvalidProbability(f64),

    #[error("Model evaluation failed: {0}")]
    Model(#[from] ModelError),
}

impl PipelineError {
    /// Whether the failure stems from the request rather than the bundle or model.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownCategory { .. } | Self::InvalidRecord(_))
    }
}

/// Failure inside a classifier adapter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Feature count mismatch: got {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Non-finite feature value at column {0}")]
    NonFinite(usize),

    /// Parameters that bypassed load-time validation and cannot be evaluated.
    #[error("Malformed model parameters: {0}")]
    Malformed(String),
}
