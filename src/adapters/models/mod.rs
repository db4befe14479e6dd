//! Model adapters: one `Classifier` implementation per model family.
//!
//! The trained model artifact is a JSON document tagged by `family`:
//! - `logistic_regression`: linear coefficients and intercept
//! - `decision_tree`: flat node array in pre-order
//! - `random_forest`: list of decision trees, probabilities averaged

mod forest;
mod logistic;
mod tree;

use serde::{Deserialize, Serialize};

use crate::domain::{ArtifactLoadError, ModelError};
use crate::ports::Classifier;

pub use forest::RandomForestModel;
pub use logistic::LogisticRegressionModel;
pub use tree::{DecisionTreeModel, TreeNode};

/// Serialized form of the trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegressionModel),
    DecisionTree(DecisionTreeModel),
    RandomForest(RandomForestModel),
}

impl ModelArtifact {
    /// Validate the parameters and wrap them behind the `Classifier` port.
    ///
    /// # Errors
    /// Returns `ArtifactLoadError::Inconsistent` if the parameters cannot form
    /// a usable model.
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ArtifactLoadError> {
        Ok(match self {
            Self::LogisticRegression(m) => {
                m.validate()?;
                Box::new(m)
            }
            Self::DecisionTree(m) => {
                m.validate()?;
                Box::new(m)
            }
            Self::RandomForest(m) => {
                m.validate()?;
                Box::new(m)
            }
        })
    }
}

/// Common input check shared by every family.
pub(crate) fn check_input(features: &[f64], expected: usize) -> Result<(), ModelError> {
    if features.len() != expected {
        return Err(ModelError::DimensionMismatch {
            expected,
            got: features.len(),
        });
    }
    match features.iter().position(|x| !x.is_finite()) {
        Some(column) => Err(ModelError::NonFinite(column)),
        None => Ok(()),
    }
}
