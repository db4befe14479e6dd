//! Classifier port: the single capability every model family exposes.
//!
//! Call sites never branch on the model family; each family is one adapter
//! implementing this trait.

use crate::domain::ModelError;

/// Decision threshold on the class-1 probability used for labels.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Trained binary classifier.
///
/// Implementations must be pure: identical input always yields identical
/// output, and no call mutates the model.
pub trait Classifier: Send + Sync {
    /// Model type name for diagnostics (e.g. `LogisticRegression`).
    fn model_type(&self) -> &'static str;

    /// Input dimensionality the model was fit on.
    fn n_features(&self) -> usize;

    /// Probability of the positive class (diabetes) for one feature vector.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if `features.len()` differs from
    /// `n_features()`, `ModelError::NonFinite` on NaN/infinite input, or
    /// `ModelError::Malformed` if the parameters cannot be evaluated.
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError>;

    /// Predicted class label (0 or 1).
    ///
    /// # Errors
    /// Same as [`Classifier::predict_proba`].
    fn predict(&self, features: &[f64]) -> Result<u8, ModelError> {
        let p = self.predict_proba(features)?;
        Ok(u8::from(p > DECISION_THRESHOLD))
    }
}
