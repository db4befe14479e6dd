//! Predictor: feature vectors to (label, probability).

use std::sync::Arc;

use crate::domain::{FeatureVector, PipelineError};
use crate::ports::ArtifactBundle;

/// Runs the bundle's classifier on assembled feature vectors.
#[derive(Debug, Clone)]
pub struct Predictor {
    bundle: Arc<ArtifactBundle>,
}

impl Predictor {
    #[must_use]
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self { bundle }
    }

    /// Predict the class label and positive-class probability for one vector.
    ///
    /// # Errors
    /// `Model` on a dimension mismatch or non-finite input,
    /// `InvalidProbability` if the classifier returns a value outside `[0, 1]`.
    pub fn predict(&self, features: &FeatureVector) -> Result<(u8, f64), PipelineError> {
        let model = self.bundle.model();
        let x = features.as_slice();

        let probability = model.predict_proba(x)?;
        if !(0.0..=1.0).contains(&probability) {
            tracing::error!(
                model_type = model.model_type(),
                "Classifier returned probability outside [0, 1]: {}",
                probability
            );
            return Err(PipelineError::InvalidProbability(probability));
        }

        let label = model.predict(x)?;
        Ok((label, probability))
    }

    /// Predict every vector in order, stopping at the first failure.
    ///
    /// # Errors
    /// The first error any vector produces.
    pub fn predict_batch(
        &self,
        vectors: &[FeatureVector],
    ) -> Result<Vec<(u8, f64)>, PipelineError> {
        vectors.iter().map(|v| self.predict(v)).collect()
    }
}
