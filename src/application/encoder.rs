//! Feature encoder: categorical labels to trained integer codes.

use std::sync::Arc;

use crate::domain::{CategoricalField, PatientRecord, PipelineError};
use crate::ports::ArtifactBundle;

/// Codes of a record's categorical fields.
///
/// `None` for fields the bundle has no encoder table for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodedCategories {
    gender: Option<i64>,
    smoking_history: Option<i64>,
}

impl EncodedCategories {
    #[must_use]
    pub fn get(&self, field: CategoricalField) -> Option<i64> {
        match field {
            CategoricalField::Gender => self.gender,
            CategoricalField::SmokingHistory => self.smoking_history,
        }
    }

    fn set(&mut self, field: CategoricalField, code: i64) {
        match field {
            CategoricalField::Gender => self.gender = Some(code),
            CategoricalField::SmokingHistory => self.smoking_history = Some(code),
        }
    }
}

/// Maps categorical values onto the codes the model was trained with.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    bundle: Arc<ArtifactBundle>,
}

impl FeatureEncoder {
    #[must_use]
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self { bundle }
    }

    /// Encode one categorical value.
    ///
    /// # Errors
    /// `UnknownCategory` for a value the training data never contained;
    /// `MissingFeature` if the bundle has no table for `field_name`.
    pub fn encode(&self, field_name: &str, raw_value: &str) -> Result<i64, PipelineError> {
        self.bundle.encoders().code(field_name, raw_value)
    }

    /// Encode every categorical field of `record` that has an encoder table.
    ///
    /// Fields are encoded whether or not the model selected them, so an
    /// unseen category is always reported.
    ///
    /// # Errors
    /// `UnknownCategory` for the first field whose value is not in its table.
    pub fn encode_record(
        &self,
        record: &PatientRecord,
    ) -> Result<EncodedCategories, PipelineError> {
        let mut encoded = EncodedCategories::default();
        for field in CategoricalField::ALL {
            if !self.bundle.encoders().has_field(field.name()) {
                continue;
            }
            let code = self.encode(field.name(), record.category(field))?;
            encoded.set(field, code);
        }
        Ok(encoded)
    }
}
