//! Domain layer: Core business types and logic.
//!
//! Pure Rust types with no I/O. All types validate their own invariants.

mod error;
mod patient;
mod prediction;
mod preprocessing;

pub use error::{ArtifactLoadError, ModelError, PipelineError};
pub use patient::{
    CategoricalField, FieldValue, Gender, PatientInput, PatientRecord, SmokingHistory,
    RECORD_FIELDS,
};
pub use prediction::{PredictionResult, RiskLevel, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};
pub use preprocessing::{EncoderTable, EncoderTables, FeatureLayout, FeatureVector, ScalerParams};
