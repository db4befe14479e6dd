//! Feature assembler: patient record to model-ready feature vector.
//!
//! Steps, in order:
//! 1. Reject out-of-domain numeric fields
//! 2. Encode categorical fields
//! 3. Read selected features in selected-feature order
//! 4. Standard-scale the features the scaler was fit on
//! 5. Place each value at its column from the feature index map

use std::sync::Arc;

use crate::domain::{FeatureVector, FieldValue, PatientRecord, PipelineError};
use crate::ports::ArtifactBundle;

use super::encoder::{EncodedCategories, FeatureEncoder};

/// Builds feature vectors in the exact column order the model expects.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    bundle: Arc<ArtifactBundle>,
    encoder: FeatureEncoder,
}

impl FeatureAssembler {
    #[must_use]
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        let encoder = FeatureEncoder::new(Arc::clone(&bundle));
        Self { bundle, encoder }
    }

    /// Assemble a fresh feature vector for `record`.
    ///
    /// # Errors
    /// - `InvalidRecord` if a numeric field is outside its domain
    /// - `UnknownCategory` if a categorical value was never seen in training
    /// - `MissingFeature` if a selected feature cannot be derived from a record
    pub fn assemble(&self, record: &PatientRecord) -> Result<FeatureVector, PipelineError> {
        record.validate().map_err(PipelineError::InvalidRecord)?;

        let codes = self.encoder.encode_record(record)?;

        let layout = self.bundle.layout();
        let scaler = self.bundle.scaler();
        let mut columns = vec![0.0; layout.len()];

        for (name, column) in layout.slots() {
            let raw = Self::raw_value(record, &codes, name)?;
            columns[column] = scaler.transform(name, raw);
        }

        tracing::debug!("Assembled {} features", columns.len());
        Ok(FeatureVector::from(columns))
    }

    fn raw_value(
        record: &PatientRecord,
        codes: &EncodedCategories,
        name: &str,
    ) -> Result<f64, PipelineError> {
        match record.field(name) {
            Some(FieldValue::Numeric(value)) => Ok(value),
            // Codes are small label-encoder indices; the model consumes them as reals.
            Some(FieldValue::Categorical(field, _)) => codes
                .get(field)
                .map(|code| code as f64)
                .ok_or_else(|| PipelineError::MissingFeature(name.to_string())),
            None => Err(PipelineError::MissingFeature(name.to_string())),
        }
    }
}
