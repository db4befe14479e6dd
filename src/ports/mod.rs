//! Ports layer: Trait definitions for external operations.
//!
//! These traits define the boundaries between the pipeline and its
//! collaborators (trained model families, artifact storage).

mod artifact_store;
mod classifier;

pub use artifact_store::{ArtifactBundle, ArtifactStore, BundleProvenance};
pub use classifier::{Classifier, DECISION_THRESHOLD};
