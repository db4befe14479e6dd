//! Decision tree adapter.

use serde::{Deserialize, Serialize};

use crate::domain::{ArtifactLoadError, ModelError};
use crate::ports::Classifier;

use super::check_input;

/// One node of a flattened binary decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, else `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights `[negative, positive]` of the training samples reaching this leaf.
    Leaf { value: [f64; 2] },
}

/// Decision tree classifier stored in pre-order (root at index 0).
///
/// Children always sit after their parent, so traversal terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeModel {
    pub n_features: usize,
    pub nodes: Vec<TreeNode>,
}

impl DecisionTreeModel {
    pub(crate) fn validate(&self) -> Result<(), ArtifactLoadError> {
        let fail = |msg: String| Err(ArtifactLoadError::Inconsistent(msg));

        if self.nodes.is_empty() {
            return fail("decision tree has no nodes".into());
        }

        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= self.n_features {
                        return fail(format!(
                            "node {i} splits on feature {feature}, model has {}",
                            self.n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return fail(format!("node {i} has a non-finite threshold"));
                    }
                    if left <= i || right <= i || left >= len || right >= len {
                        return fail(format!(
                            "node {i} children ({left}, {right}) must point forward within {len} nodes"
                        ));
                    }
                }
                TreeNode::Leaf { value: [neg, pos] } => {
                    let total = neg + pos;
                    let finite = neg.is_finite() && pos.is_finite();
                    if !finite || neg < 0.0 || pos < 0.0 || total <= 0.0 {
                        return fail(format!("leaf {i} has invalid class weights [{neg}, {pos}]"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Positive-class fraction of the leaf `features` falls into.
    ///
    /// Does not assume `validate` has run; a malformed tree is an error.
    pub(crate) fn leaf_probability(&self, features: &[f64]) -> Result<f64, ModelError> {
        let malformed = |msg: String| Err(ModelError::Malformed(msg));

        let mut idx = 0;
        loop {
            let Some(node) = self.nodes.get(idx) else {
                return malformed(format!(
                    "decision tree has no node {idx} ({} nodes)",
                    self.nodes.len()
                ));
            };
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let Some(&x) = features.get(feature) else {
                        return malformed(format!(
                            "node {idx} splits on feature {feature} of {}",
                            features.len()
                        ));
                    };
                    let next = if x <= threshold { left } else { right };
                    if next <= idx {
                        return malformed(format!("node {idx} points back to node {next}"));
                    }
                    idx = next;
                }
                TreeNode::Leaf { value: [neg, pos] } => {
                    let total = neg + pos;
                    if !(total > 0.0 && total.is_finite()) {
                        return malformed(format!("leaf {idx} has no class weight"));
                    }
                    return Ok(pos / total);
                }
            }
        }
    }
}

impl Classifier for DecisionTreeModel {
    fn model_type(&self) -> &'static str {
        "DecisionTreeClassifier"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_input(features, self.n_features)?;
        self.leaf_probability(features)
    }
}
