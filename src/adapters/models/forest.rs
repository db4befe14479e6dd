//! Random forest adapter.

use serde::{Deserialize, Serialize};

use crate::domain::{ArtifactLoadError, ModelError};
use crate::ports::Classifier;

use super::{check_input, DecisionTreeModel};

/// Ensemble of decision trees; probability is the mean tree probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModel {
    pub n_features: usize,
    pub trees: Vec<DecisionTreeModel>,
}

impl RandomForestModel {
    pub(crate) fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.trees.is_empty() {
            return Err(ArtifactLoadError::Inconsistent(
                "random forest has no trees".into(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_features != self.n_features {
                return Err(ArtifactLoadError::Inconsistent(format!(
                    "tree {i} expects {} features, forest expects {}",
                    tree.n_features, self.n_features
                )));
            }
            tree.validate()?;
        }
        Ok(())
    }
}

impl Classifier for RandomForestModel {
    fn model_type(&self) -> &'static str {
        "RandomForestClassifier"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_input(features, self.n_features)?;
        if self.trees.is_empty() {
            return Err(ModelError::Malformed("random forest has no trees".into()));
        }
        // Summed in tree order so repeated calls are bit-identical.
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.leaf_probability(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}
