//! Logistic regression adapter.

use serde::{Deserialize, Serialize};

use crate::domain::{ArtifactLoadError, ModelError};
use crate::ports::Classifier;

use super::check_input;

/// Binary logistic regression: `p = sigmoid(intercept + w . x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionModel {
    pub n_features: usize,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegressionModel {
    pub(crate) fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.coefficients.len() != self.n_features {
            return Err(ArtifactLoadError::Inconsistent(format!(
                "logistic regression declares {} features but has {} coefficients",
                self.n_features,
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(ArtifactLoadError::Inconsistent(
                "logistic regression parameters must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Linear decision value before the sigmoid.
    fn decision_function(&self, features: &[f64]) -> f64 {
        let mut z = self.intercept;
        for (w, x) in self.coefficients.iter().zip(features) {
            z += w * x;
        }
        z
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LogisticRegressionModel {
    fn model_type(&self) -> &'static str {
        "LogisticRegression"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_input(features, self.n_features)?;
        Ok(sigmoid(self.decision_function(features)))
    }
}
