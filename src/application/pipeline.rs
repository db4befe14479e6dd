//! Prediction pipeline: record -> features -> model -> risk level.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{
    ArtifactLoadError, PatientInput, PatientRecord, PipelineError, PredictionResult,
};
use crate::ports::{ArtifactBundle, ArtifactStore};

use super::assembler::FeatureAssembler;
use super::predictor::Predictor;

/// Readiness report for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_type: &'static str,
    pub bundle_version: Option<String>,
    pub fingerprint: String,
}

/// Single and batch inference over one immutable artifact bundle.
///
/// Cheap to clone; every clone shares the same bundle.
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    bundle: Arc<ArtifactBundle>,
    assembler: FeatureAssembler,
    predictor: Predictor,
}

impl PredictionPipeline {
    #[must_use]
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self {
            assembler: FeatureAssembler::new(Arc::clone(&bundle)),
            predictor: Predictor::new(Arc::clone(&bundle)),
            bundle,
        }
    }

    /// Build a pipeline over the bundle `store` hands out.
    ///
    /// # Errors
    /// Whatever the store reports while loading.
    pub fn from_store<S: ArtifactStore + ?Sized>(store: &S) -> Result<Self, ArtifactLoadError> {
        Ok(Self::new(store.load()?))
    }

    /// A constructed pipeline always holds a fully validated bundle.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        true
    }

    #[must_use]
    pub fn model_type(&self) -> &'static str {
        self.bundle.model_type()
    }

    #[must_use]
    pub fn bundle(&self) -> &Arc<ArtifactBundle> {
        &self.bundle
    }

    #[must_use]
    pub fn health(&self) -> HealthReport {
        let provenance = self.bundle.provenance();
        HealthReport {
            status: "healthy",
            model_loaded: self.is_loaded(),
            model_type: self.model_type(),
            bundle_version: provenance.version.clone(),
            fingerprint: provenance.fingerprint.clone(),
        }
    }

    /// Predict one record.
    ///
    /// # Errors
    /// Any assembler, predictor or risk-band error, unchanged.
    pub fn predict_one(&self, record: &PatientRecord) -> Result<PredictionResult, PipelineError> {
        tracing::debug!("Step 1: Assembling features...");
        let features = self.assembler.assemble(record)?;

        tracing::debug!("Step 2: Running {}...", self.model_type());
        let (label, probability) = self.predictor.predict(&features)?;

        tracing::debug!("Step 3: Classifying risk...");
        PredictionResult::new(label, probability)
    }

    /// Parse a raw wire record and predict it.
    ///
    /// # Errors
    /// `UnknownCategory` or `InvalidRecord` from parsing, then as [`Self::predict_one`].
    pub fn predict_input(&self, input: &PatientInput) -> Result<PredictionResult, PipelineError> {
        let record = PatientRecord::try_from(input)?;
        self.predict_one(&record)
    }

    /// Predict every record independently; outcomes follow input order.
    pub fn predict_batch(
        &self,
        records: &[PatientRecord],
    ) -> Vec<Result<PredictionResult, PipelineError>> {
        let results = map_in_order(records, |r| self.predict_one(r));
        log_batch(&results);
        results
    }

    /// Batch form of [`Self::predict_input`].
    pub fn predict_inputs(
        &self,
        inputs: &[PatientInput],
    ) -> Vec<Result<PredictionResult, PipelineError>> {
        let results = map_in_order(inputs, |i| self.predict_input(i));
        log_batch(&results);
        results
    }
}

#[cfg(feature = "parallel")]
fn map_in_order<T, F>(items: &[T], f: F) -> Vec<Result<PredictionResult, PipelineError>>
where
    T: Sync,
    F: Fn(&T) -> Result<PredictionResult, PipelineError> + Sync + Send,
{
    use rayon::prelude::*;
    items.par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_in_order<T, F>(items: &[T], f: F) -> Vec<Result<PredictionResult, PipelineError>>
where
    F: Fn(&T) -> Result<PredictionResult, PipelineError>,
{
    items.iter().map(f).collect()
}

fn log_batch(results: &[Result<PredictionResult, PipelineError>]) {
    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(total = results.len(), failed, "Batch prediction complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::json_store::JsonArtifactStore;
    use crate::domain::{Gender, RiskLevel};
    use crate::reference::ReferenceOutput;
    use crate::testing::{
        bundle_with_encoders, example_record, fixture_bundle, high_risk_record,
        EXAMPLE_PROBABILITY, SHIPPED_FINGERPRINT,
    };
    use proptest::prelude::*;

    #[test]
    fn test_example_record() {
        let pipeline = PredictionPipeline::new(fixture_bundle());
        let result = pipeline.predict_one(&example_record()).expect("prediction");

        assert_eq!(result.label, 0);
        assert!((result.probability - EXAMPLE_PROBABILITY).abs() < 1e-12);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_high_risk_record() {
        let pipeline = PredictionPipeline::new(fixture_bundle());
        let result = pipeline.predict_one(&high_risk_record()).expect("prediction");

        assert_eq!(result.label, 1);
        assert!(result.probability > 0.99);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_golden_reference_output() {
        let reference: ReferenceOutput =
            serde_json::from_str(include_str!("../../models/reference_output.json"))
                .expect("reference output parses");
        let pipeline = PredictionPipeline::from_store(&JsonArtifactStore::new("models"))
            .expect("shipped bundle");

        assert_eq!(pipeline.health().fingerprint, reference.bundle_fingerprint);
        let result = pipeline.predict_input(&reference.record).expect("prediction");
        assert_eq!(result.label, reference.prediction);
        assert!((result.probability - reference.probability).abs() < 1e-12);
        assert_eq!(result.risk_level, reference.risk_level);
    }

    #[test]
    fn test_partial_batch_failure_keeps_order() {
        let pipeline = PredictionPipeline::new(fixture_bundle());
        let mut invalid = example_record();
        invalid.blood_glucose_level = 900.0;

        let out = pipeline.predict_batch(&[example_record(), invalid, high_risk_record()]);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].as_ref().map(|r| r.label), Ok(0));
        assert!(matches!(out[1], Err(PipelineError::InvalidRecord(_))));
        assert_eq!(out[2].as_ref().map(|r| r.label), Ok(1));
    }

    #[test]
    fn test_unknown_category_in_batch_is_per_item() {
        let bundle = bundle_with_encoders(
            r#"{
                "gender": ["Female", "Male"],
                "smoking_history": ["No Info", "current", "ever", "former", "never", "not current"]
            }"#,
        );
        let pipeline = PredictionPipeline::new(bundle);
        let mut other = example_record();
        other.gender = Gender::Other;

        let out = pipeline.predict_batch(&[example_record(), other, example_record()]);
        assert!(out[0].is_ok());
        match &out[1] {
            Err(PipelineError::UnknownCategory { field, value, .. }) => {
                assert_eq!(field, "gender");
                assert_eq!(value, "Other");
            }
            other => panic!("expected unknown category, got {other:?}"),
        }
        assert_eq!(out[0], out[2]);
    }

    #[test]
    fn test_raw_inputs_fail_per_item() {
        let pipeline = PredictionPipeline::new(fixture_bundle());
        let good = PatientInput::from(&example_record());
        let mut vaping = good.clone();
        vaping.smoking_history = "vaping".into();
        let mut flag = good.clone();
        flag.hypertension = 2;

        let out = pipeline.predict_inputs(&[good, vaping, flag]);
        assert!(out[0].is_ok());
        assert!(matches!(out[1], Err(PipelineError::UnknownCategory { .. })));
        assert!(matches!(out[2], Err(PipelineError::InvalidRecord(_))));
    }

    #[test]
    fn test_health_report() {
        let pipeline = PredictionPipeline::from_store(&JsonArtifactStore::new("models"))
            .expect("shipped bundle");
        let health = pipeline.health();

        assert_eq!(health.status, "healthy");
        assert!(health.model_loaded);
        assert_eq!(health.model_type, "LogisticRegression");
        assert_eq!(health.bundle_version.as_deref(), Some("1.0.0"));
        assert_eq!(health.fingerprint, SHIPPED_FINGERPRINT);

        let json = serde_json::to_value(&health).expect("serializes");
        assert_eq!(json["model_type"], "LogisticRegression");
    }

    fn arb_record() -> impl Strategy<Value = PatientRecord> {
        (
            prop_oneof![Just(Gender::Female), Just(Gender::Male), Just(Gender::Other)],
            0.0..=120.0f64,
            any::<bool>(),
            any::<bool>(),
            0usize..6,
            10.0..=100.0f64,
            3.5..=10.0f64,
            80.0..=300.0f64,
        )
            .prop_map(|(gender, age, hypertension, heart_disease, smoking, bmi, hba1c, glucose)| {
                use crate::domain::SmokingHistory::*;
                PatientRecord {
                    gender,
                    age,
                    hypertension,
                    heart_disease,
                    smoking_history: [NoInfo, Current, Ever, Former, Never, NotCurrent][smoking],
                    bmi,
                    hba1c_level: hba1c,
                    blood_glucose_level: glucose,
                }
            })
    }

    proptest! {
        #[test]
        fn prop_valid_records_predict_consistently(
            records in proptest::collection::vec(arb_record(), 1..8)
        ) {
            let pipeline = PredictionPipeline::new(fixture_bundle());
            let batch = pipeline.predict_batch(&records);
            prop_assert_eq!(batch.len(), records.len());

            for (record, batched) in records.iter().zip(&batch) {
                let one = pipeline.predict_one(record).expect("valid record predicts");
                let again = pipeline.predict_one(record).expect("valid record predicts");

                prop_assert!((0.0..=1.0).contains(&one.probability));
                prop_assert_eq!(one.risk_level, RiskLevel::classify(one.probability).expect("in range"));
                prop_assert_eq!(one.probability.to_bits(), again.probability.to_bits());
                prop_assert_eq!(batched.as_ref().expect("batch item ok"), &one);
            }
        }
    }
}
