//! Artifact store port: Loading of the immutable artifact bundle.
//!
//! The five training artifacts are only ever handed out together, as one
//! validated [`ArtifactBundle`].

use std::fmt;
use std::sync::Arc;

use crate::domain::{
    ArtifactLoadError, CategoricalField, EncoderTables, FeatureLayout, ScalerParams, RECORD_FIELDS,
};

use super::Classifier;

/// Identity of a loaded bundle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BundleProvenance {
    /// Version declared by the bundle manifest, if any.
    pub version: Option<String>,

    /// SHA-256 over the digests of the five artifacts (hex).
    pub fingerprint: String,
}

/// Trained model plus every preprocessing parameter it was fit with.
///
/// Constructed once, validated as a whole, then shared read-only.
pub struct ArtifactBundle {
    model: Box<dyn Classifier>,
    scaler: ScalerParams,
    encoders: EncoderTables,
    layout: FeatureLayout,
    provenance: BundleProvenance,
}

impl ArtifactBundle {
    /// Assemble a bundle, checking cross-artifact consistency.
    ///
    /// # Errors
    /// Returns `ArtifactLoadError::Inconsistent` if the scaler is malformed or
    /// was not fit on exactly the training columns, the layout width differs
    /// from the model's input width, or a selected categorical feature has no
    /// encoder table.
    pub fn new(
        model: Box<dyn Classifier>,
        scaler: ScalerParams,
        encoders: EncoderTables,
        layout: FeatureLayout,
        provenance: BundleProvenance,
    ) -> Result<Self, ArtifactLoadError> {
        scaler.validate()?;
        check_scaler_columns(&scaler)?;

        if layout.len() != model.n_features() {
            return Err(ArtifactLoadError::Inconsistent(format!(
                "{} selected features but {} expects {} inputs",
                layout.len(),
                model.model_type(),
                model.n_features()
            )));
        }

        for name in layout.selected() {
            let categorical = CategoricalField::ALL.iter().any(|f| f.name() == name);
            if categorical && !encoders.has_field(name) {
                return Err(ArtifactLoadError::Inconsistent(format!(
                    "selected categorical feature '{name}' has no encoder table"
                )));
            }
            if !RECORD_FIELDS.contains(&name) {
                tracing::warn!(
                    feature = name,
                    "Selected feature is not a patient record field; predictions will fail"
                );
            }
        }

        for field in CategoricalField::ALL {
            if !encoders.has_field(field.name()) {
                continue;
            }
            let missing: Vec<_> = field
                .labels()
                .iter()
                .filter(|label| encoders.code(field.name(), label).is_err())
                .collect();
            if !missing.is_empty() {
                tracing::warn!(
                    field = field.name(),
                    ?missing,
                    "Encoder table does not cover every category"
                );
            }
        }

        Ok(Self {
            model,
            scaler,
            encoders,
            layout,
            provenance,
        })
    }

    #[must_use]
    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    #[must_use]
    pub fn scaler(&self) -> &ScalerParams {
        &self.scaler
    }

    #[must_use]
    pub fn encoders(&self) -> &EncoderTables {
        &self.encoders
    }

    #[must_use]
    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    #[must_use]
    pub fn provenance(&self) -> &BundleProvenance {
        &self.provenance
    }

    /// Model type name for diagnostics.
    #[must_use]
    pub fn model_type(&self) -> &'static str {
        self.model.model_type()
    }
}

/// The scaler must have been fit on the training columns, no more and no fewer.
fn check_scaler_columns(scaler: &ScalerParams) -> Result<(), ArtifactLoadError> {
    let unknown: Vec<&str> = scaler
        .feature_names
        .iter()
        .map(String::as_str)
        .filter(|name| !RECORD_FIELDS.contains(name))
        .collect();
    let missing: Vec<&str> = RECORD_FIELDS
        .iter()
        .copied()
        .filter(|field| scaler.position(field).is_none())
        .collect();

    if unknown.is_empty() && missing.is_empty() {
        return Ok(());
    }
    Err(ArtifactLoadError::Inconsistent(format!(
        "scaler was not fit on the training columns (unknown: {unknown:?}, missing: {missing:?})"
    )))
}

impl fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("model_type", &self.model.model_type())
            .field("n_features", &self.model.n_features())
            .field("layout", &self.layout)
            .field("provenance", &self.provenance)
            .finish_non_exhaustive()
    }
}

/// Source of the artifact bundle.
///
/// A store loads at most once; later calls return the same bundle.
pub trait ArtifactStore: Send + Sync {
    /// Load (or return the already loaded) bundle.
    ///
    /// # Errors
    /// Returns `ArtifactLoadError` if any artifact is missing, unreadable,
    /// malformed, or inconsistent with the others.
    fn load(&self) -> Result<Arc<ArtifactBundle>, ArtifactLoadError>;

    /// Whether a bundle has been loaded. Never triggers a load.
    fn is_loaded(&self) -> bool;
}
