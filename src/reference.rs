//! Golden reference output of an artifact bundle.
//!
//! `reference_output.json` records what the bundle predicts for the canonical
//! example patient, together with the bundle fingerprint it was pinned
//! against. Re-running the example after any change to the preprocessing
//! code must reproduce it exactly.

use std::fs;
use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::json_store::{BundleManifest, MANIFEST_FILE};
use crate::domain::{Gender, PatientInput, PatientRecord, RiskLevel, SmokingHistory};
use crate::PredictionPipeline;

pub const REFERENCE_FILE: &str = "reference_output.json";

/// Contents of `reference_output.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceOutput {
    pub bundle_version: Option<String>,
    pub bundle_fingerprint: String,
    pub pinned_at: DateTime<Utc>,
    pub record: PatientInput,
    pub prediction: u8,
    pub probability: f64,
    pub risk_level: RiskLevel,
}

/// The canonical example patient.
#[must_use]
pub fn example_record() -> PatientRecord {
    PatientRecord {
        gender: Gender::Female,
        age: 45.0,
        hypertension: false,
        heart_disease: false,
        smoking_history: SmokingHistory::Never,
        bmi: 25.5,
        hba1c_level: 5.7,
        blood_glucose_level: 140.0,
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> crate::Result<()> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    fs::write(path, body)?;
    Ok(())
}

/// Hash the bundle files in `dir` and (re)write `manifest.json`.
///
/// # Errors
/// Returns `GlucoriskError::Artifact` if a bundle file is missing or
/// unreadable, `Io` if the manifest cannot be written.
pub fn write_manifest(dir: &Path, version: Option<String>) -> crate::Result<BundleManifest> {
    let manifest = BundleManifest::for_dir(dir, version)?;
    write_json(&dir.join(MANIFEST_FILE), &manifest)?;
    tracing::info!(files = manifest.files.len(), "Wrote {}", MANIFEST_FILE);
    Ok(manifest)
}

/// Predict the example patient and write `reference_output.json` into `dir`.
///
/// # Errors
/// Returns `GlucoriskError::Pipeline` if the example fails to predict, `Io`
/// if the file cannot be written.
pub fn pin_reference(
    pipeline: &PredictionPipeline,
    dir: &Path,
) -> crate::Result<ReferenceOutput> {
    let record = example_record();
    let result = pipeline.predict_one(&record)?;

    let provenance = pipeline.bundle().provenance();
    let reference = ReferenceOutput {
        bundle_version: provenance.version.clone(),
        bundle_fingerprint: provenance.fingerprint.clone(),
        pinned_at: Utc::now().trunc_subsecs(0),
        record: PatientInput::from(&record),
        prediction: result.label,
        probability: result.probability,
        risk_level: result.risk_level,
    };
    write_json(&dir.join(REFERENCE_FILE), &reference)?;

    tracing::info!(
        model_type = pipeline.model_type(),
        risk_level = %result.risk_level,
        "Pinned {}",
        REFERENCE_FILE
    );
    Ok(reference)
}

/// Read a previously pinned `reference_output.json` from `dir`.
///
/// # Errors
/// Returns `GlucoriskError::Io` if the file cannot be read, `Serialization`
/// if it is not a reference document.
pub fn read_reference(dir: &Path) -> crate::Result<ReferenceOutput> {
    let body = fs::read_to_string(dir.join(REFERENCE_FILE))?;
    Ok(serde_json::from_str(&body)?)
}
