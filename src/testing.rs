//! Shared test fixtures.
//!
//! The fixture bundle carries the same parameters as the shipped `models/`
//! directory.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::adapters::json_store::{
    ENCODERS_FILE, FEATURE_INDICES_FILE, MODEL_FILE, SCALER_FILE, SELECTED_FEATURES_FILE,
};
use crate::adapters::models::ModelArtifact;
use crate::domain::{
    EncoderTable, EncoderTables, FeatureLayout, Gender, PatientRecord, ScalerParams,
    SmokingHistory,
};
use crate::ports::{ArtifactBundle, BundleProvenance, Classifier};

/// Fingerprint of the shipped `models/` bundle.
pub const SHIPPED_FINGERPRINT: &str =
    "42a291006c19eb8ad8e1c25f3d83e0add31275d89330ac1124161378d049fbc3";

pub const MODEL_JSON: &str = r#"{
  "family": "logistic_regression",
  "n_features": 7,
  "coefficients": [1.021847, 0.187312, 0.139806, -0.024518, 0.608253, 2.487129, 1.359034],
  "intercept": -5.018362
}"#;

pub const SCALER_JSON: &str = r#"{
  "feature_names": ["gender", "age", "hypertension", "heart_disease", "smoking_history", "bmi", "HbA1c_level", "blood_glucose_level"],
  "mean": [0.414435, 41.885856, 0.07485, 0.03942, 2.17965, 27.320767, 5.527507, 138.05806],
  "scale": [0.493052, 22.516728, 0.263149, 0.194593, 1.889249, 6.63675, 1.070666, 40.708123]
}"#;

pub const ENCODERS_JSON: &str = r#"{
  "gender": ["Female", "Male", "Other"],
  "smoking_history": ["No Info", "current", "ever", "former", "never", "not current"]
}"#;

pub const SELECTED_JSON: &str = r#"["age", "hypertension", "heart_disease", "smoking_history", "bmi", "HbA1c_level", "blood_glucose_level"]"#;

pub const INDICES_JSON: &str = r#"{"age": 0, "hypertension": 1, "heart_disease": 2, "smoking_history": 3, "bmi": 4, "HbA1c_level": 5, "blood_glucose_level": 6}"#;

/// Probability the fixture model assigns to [`example_record`].
pub const EXAMPLE_PROBABILITY: f64 = 0.009160925041852569;

/// Write the fixture bundle (without manifest) into `dir`.
pub fn write_fixture_dir(dir: &Path) {
    for (name, body) in [
        (MODEL_FILE, MODEL_JSON),
        (SCALER_FILE, SCALER_JSON),
        (ENCODERS_FILE, ENCODERS_JSON),
        (SELECTED_FEATURES_FILE, SELECTED_JSON),
        (FEATURE_INDICES_FILE, INDICES_JSON),
    ] {
        std::fs::write(dir.join(name), body).expect("write fixture file");
    }
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
    serde_json::from_str(json).expect("fixture JSON parses")
}

fn fixture_model() -> Box<dyn Classifier> {
    parse::<ModelArtifact>(MODEL_JSON)
        .into_classifier()
        .expect("fixture model is valid")
}

fn fixture_encoders() -> EncoderTables {
    EncoderTables::from_tables(parse::<BTreeMap<String, EncoderTable>>(ENCODERS_JSON))
        .expect("fixture encoders are valid")
}

/// The fixture bundle, built in memory.
pub fn fixture_bundle() -> Arc<ArtifactBundle> {
    Arc::new(
        ArtifactBundle::new(
            fixture_model(),
            parse(SCALER_JSON),
            fixture_encoders(),
            FeatureLayout::new(
                parse(SELECTED_JSON),
                &parse::<HashMap<String, usize>>(INDICES_JSON),
            )
            .expect("fixture layout is valid"),
            BundleProvenance::default(),
        )
        .expect("fixture bundle is consistent"),
    )
}

/// Fixture bundle with the encoder tables replaced.
pub fn bundle_with_encoders(encoders_json: &str) -> Arc<ArtifactBundle> {
    let encoders = EncoderTables::from_tables(parse(encoders_json)).expect("valid encoders");
    Arc::new(
        ArtifactBundle::new(
            fixture_model(),
            parse(SCALER_JSON),
            encoders,
            FeatureLayout::new(
                parse(SELECTED_JSON),
                &parse::<HashMap<String, usize>>(INDICES_JSON),
            )
            .expect("fixture layout is valid"),
            BundleProvenance::default(),
        )
        .expect("bundle is consistent"),
    )
}

/// Bundle around an arbitrary model and layout, with the fixture scaler and encoders.
pub fn bundle_with_layout(
    model: Box<dyn Classifier>,
    selected: &[&str],
    indices: &[(&str, usize)],
) -> Arc<ArtifactBundle> {
    let indices: HashMap<String, usize> = indices
        .iter()
        .map(|(name, i)| ((*name).to_string(), *i))
        .collect();
    let selected = selected.iter().map(|s| (*s).to_string()).collect();
    Arc::new(
        ArtifactBundle::new(
            model,
            parse::<ScalerParams>(SCALER_JSON),
            fixture_encoders(),
            FeatureLayout::new(selected, &indices).expect("valid layout"),
            BundleProvenance::default(),
        )
        .expect("bundle is consistent"),
    )
}

/// The canonical example patient.
pub fn example_record() -> PatientRecord {
    crate::reference::example_record()
}

/// A high-risk patient for the fixture model.
pub fn high_risk_record() -> PatientRecord {
    PatientRecord {
        gender: Gender::Male,
        age: 68.0,
        hypertension: true,
        heart_disease: true,
        smoking_history: SmokingHistory::Former,
        bmi: 34.0,
        hba1c_level: 8.2,
        blood_glucose_level: 260.0,
    }
}
