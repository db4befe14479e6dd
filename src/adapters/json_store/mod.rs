//! JSON artifact store: Implementation of `ArtifactStore` over a directory.
//!
//! The training step exports five JSON documents into one directory:
//!
//! | artifact          | file                     |
//! |-------------------|--------------------------|
//! | model             | `model.json`             |
//! | scaler            | `scaler.json`            |
//! | encoders          | `label_encoders.json`    |
//! | selected features | `selected_features.json` |
//! | feature indices   | `feature_indices.json`   |
//!
//! # Integrity
//!
//! An optional `manifest.json` binds the five files by SHA-256 and declares a
//! bundle version. When present, every file must be listed and match. When
//! the store is configured to require it (production), a missing manifest is
//! a load failure.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::models::ModelArtifact;
use crate::domain::{ArtifactLoadError, EncoderTable, EncoderTables, FeatureLayout, ScalerParams};
use crate::ports::{ArtifactBundle, ArtifactStore, BundleProvenance};

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const ENCODERS_FILE: &str = "label_encoders.json";
pub const SELECTED_FEATURES_FILE: &str = "selected_features.json";
pub const FEATURE_INDICES_FILE: &str = "feature_indices.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// The five bundle files, in fingerprint order.
pub const BUNDLE_FILES: [&str; 5] = [
    MODEL_FILE,
    SCALER_FILE,
    ENCODERS_FILE,
    SELECTED_FEATURES_FILE,
    FEATURE_INDICES_FILE,
];

/// Manifest binding the bundle files together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleManifest {
    #[serde(default)]
    pub version: Option<String>,
    /// File name -> lowercase hex SHA-256.
    pub files: BTreeMap<String, String>,
}

impl BundleManifest {
    /// Compute a manifest over the bundle files currently in `dir`.
    ///
    /// # Errors
    /// Returns `ArtifactLoadError` if a bundle file is missing or unreadable.
    pub fn for_dir(dir: &Path, version: Option<String>) -> Result<Self, ArtifactLoadError> {
        let files = RawBundle::read(dir)?
            .digests()
            .into_iter()
            .map(|(name, digest)| (name.to_string(), digest))
            .collect();
        Ok(Self { version, files })
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn sha256_hex(bytes: &[u8]) -> String {
    to_hex(&Sha256::digest(bytes))
}

/// Raw bytes of every bundle file, keyed by file name.
struct RawBundle {
    files: BTreeMap<&'static str, Vec<u8>>,
}

impl RawBundle {
    fn read(dir: &Path) -> Result<Self, ArtifactLoadError> {
        let mut files = BTreeMap::new();
        for name in BUNDLE_FILES {
            files.insert(name, read_file(dir, name)?);
        }
        Ok(Self { files })
    }

    fn parse<T: DeserializeOwned>(&self, name: &'static str) -> Result<T, ArtifactLoadError> {
        let bytes = self.files.get(name).map(Vec::as_slice).unwrap_or_default();
        serde_json::from_slice(bytes).map_err(|source| ArtifactLoadError::Malformed {
            artifact: name,
            source,
        })
    }

    fn digests(&self) -> Vec<(&'static str, String)> {
        BUNDLE_FILES
            .iter()
            .map(|name| {
                let bytes = self.files.get(name).map(Vec::as_slice).unwrap_or_default();
                (*name, sha256_hex(bytes))
            })
            .collect()
    }
}

fn read_file(dir: &Path, name: &'static str) -> Result<Vec<u8>, ArtifactLoadError> {
    let path = dir.join(name);
    if !path.is_file() {
        return Err(ArtifactLoadError::Missing {
            artifact: name,
            path,
        });
    }
    std::fs::read(&path).map_err(|source| ArtifactLoadError::Unreadable {
        artifact: name,
        source,
    })
}

fn verify_manifest(
    manifest: &BundleManifest,
    digests: &[(&'static str, String)],
) -> Result<(), ArtifactLoadError> {
    for (name, actual) in digests {
        let expected = manifest.files.get(*name).ok_or_else(|| {
            ArtifactLoadError::IntegrityMismatch {
                artifact: (*name).to_string(),
                reason: "file is not bound by the manifest".into(),
            }
        })?;
        if !expected.trim().eq_ignore_ascii_case(actual) {
            return Err(ArtifactLoadError::IntegrityMismatch {
                artifact: (*name).to_string(),
                reason: format!("sha256 {actual} does not match manifest {expected}"),
            });
        }
    }
    Ok(())
}

/// Fingerprint over the per-file digests, in `BUNDLE_FILES` order.
fn fingerprint(digests: &[(&'static str, String)]) -> String {
    let mut hasher = Sha256::new();
    for (name, digest) in digests {
        hasher.update(name.as_bytes());
        hasher.update(b":");
        hasher.update(digest.as_bytes());
        hasher.update(b"\n");
    }
    to_hex(&hasher.finalize())
}

/// Load and validate a bundle from `dir` without caching.
///
/// # Errors
/// Returns `ArtifactLoadError` if any file is missing, unreadable, malformed,
/// fails the manifest check, or is inconsistent with the others.
pub fn load_bundle(
    dir: &Path,
    require_manifest: bool,
) -> Result<ArtifactBundle, ArtifactLoadError> {
    tracing::info!("Loading artifact bundle from {:?}", dir);

    let raw = RawBundle::read(dir)?;
    let digests = raw.digests();

    let manifest_path = dir.join(MANIFEST_FILE);
    let manifest = if manifest_path.is_file() {
        let bytes = read_file(dir, MANIFEST_FILE)?;
        let manifest: BundleManifest =
            serde_json::from_slice(&bytes).map_err(|source| ArtifactLoadError::Malformed {
                artifact: MANIFEST_FILE,
                source,
            })?;
        verify_manifest(&manifest, &digests)?;
        Some(manifest)
    } else if require_manifest {
        tracing::error!("Bundle manifest required but not found at {:?}", manifest_path);
        return Err(ArtifactLoadError::Missing {
            artifact: MANIFEST_FILE,
            path: manifest_path,
        });
    } else {
        tracing::warn!("No bundle manifest at {:?}; file integrity not verified", manifest_path);
        None
    };

    let model: ModelArtifact = raw.parse(MODEL_FILE)?;
    let scaler: ScalerParams = raw.parse(SCALER_FILE)?;
    let encoders: BTreeMap<String, EncoderTable> = raw.parse(ENCODERS_FILE)?;
    let selected: Vec<String> = raw.parse(SELECTED_FEATURES_FILE)?;
    let indices: HashMap<String, usize> = raw.parse(FEATURE_INDICES_FILE)?;

    let provenance = BundleProvenance {
        version: manifest.and_then(|m| m.version),
        fingerprint: fingerprint(&digests),
    };

    let bundle = ArtifactBundle::new(
        model.into_classifier()?,
        scaler,
        EncoderTables::from_tables(encoders)?,
        FeatureLayout::new(selected, &indices)?,
        provenance,
    )?;

    tracing::info!(
        model_type = bundle.model_type(),
        n_features = bundle.layout().len(),
        version = bundle.provenance().version.as_deref().unwrap_or("unversioned"),
        fingerprint = %&bundle.provenance().fingerprint[..12],
        "Artifact bundle loaded"
    );

    Ok(bundle)
}

/// Load a bundle from `dir`, verifying the manifest if one is present.
///
/// # Errors
/// See [`load_bundle`].
pub fn load_artifacts(dir: impl AsRef<Path>) -> Result<ArtifactBundle, ArtifactLoadError> {
    load_bundle(dir.as_ref(), false)
}

/// Artifact store reading a training export directory.
///
/// Loads at most once; the bundle is then shared by every caller.
pub struct JsonArtifactStore {
    dir: PathBuf,
    require_manifest: bool,
    bundle: OnceLock<Arc<ArtifactBundle>>,
}

impl JsonArtifactStore {
    /// Create a store over `dir`. Nothing is read until [`ArtifactStore::load`].
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            require_manifest: false,
            bundle: OnceLock::new(),
        }
    }

    /// Require `manifest.json` to be present and valid.
    #[must_use]
    pub fn require_manifest(mut self, required: bool) -> Self {
        self.require_manifest = required;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactStore for JsonArtifactStore {
    fn load(&self) -> Result<Arc<ArtifactBundle>, ArtifactLoadError> {
        if let Some(bundle) = self.bundle.get() {
            return Ok(Arc::clone(bundle));
        }

        let loaded = Arc::new(load_bundle(&self.dir, self.require_manifest)?);
        // A concurrent loader may have won; keep whichever was stored first.
        Ok(Arc::clone(self.bundle.get_or_init(|| loaded)))
    }

    fn is_loaded(&self) -> bool {
        self.bundle.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{write_fixture_dir, SHIPPED_FINGERPRINT};
    use std::fs;
    use tempfile::tempdir;

    fn write_manifest(dir: &Path) {
        let manifest = BundleManifest::for_dir(dir, Some("test-1".into())).expect("manifest");
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec_pretty(&manifest).expect("serialize manifest"),
        )
        .expect("write manifest");
    }

    #[test]
    fn test_load_fixture_bundle() {
        let temp = tempdir().expect("tempdir");
        write_fixture_dir(temp.path());

        let bundle = load_bundle(temp.path(), false).expect("bundle should load");
        assert_eq!(bundle.model_type(), "LogisticRegression");
        assert_eq!(bundle.layout().len(), 7);
        assert!(bundle.provenance().version.is_none());
        assert_eq!(bundle.provenance().fingerprint.len(), 64);
    }

    #[test]
    fn test_missing_file_names_the_artifact() {
        let temp = tempdir().expect("tempdir");
        write_fixture_dir(temp.path());
        fs::remove_file(temp.path().join(SCALER_FILE)).expect("remove scaler");

        match load_bundle(temp.path(), false) {
            Err(ArtifactLoadError::Missing { artifact, .. }) => assert_eq!(artifact, SCALER_FILE),
            other => panic!("expected missing scaler, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let temp = tempdir().expect("tempdir");
        write_fixture_dir(temp.path());
        fs::write(temp.path().join(SELECTED_FEATURES_FILE), b"{not json").expect("write");

        assert!(matches!(
            load_bundle(temp.path(), false),
            Err(ArtifactLoadError::Malformed {
                artifact: SELECTED_FEATURES_FILE,
                ..
            })
        ));
    }

    #[test]
    fn test_layout_size_mismatch_is_inconsistent() {
        let temp = tempdir().expect("tempdir");
        write_fixture_dir(temp.path());
        fs::write(
            temp.path().join(SELECTED_FEATURES_FILE),
            br#"["age", "bmi", "HbA1c_level"]"#,
        )
        .expect("write");

        assert!(matches!(
            load_bundle(temp.path(), false),
            Err(ArtifactLoadError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_scaler_fit_on_other_columns_is_inconsistent() {
        let temp = tempdir().expect("tempdir");
        write_fixture_dir(temp.path());
        fs::write(
            temp.path().join(SCALER_FILE),
            br#"{"feature_names": ["insulin"], "mean": [1.0], "scale": [2.0]}"#,
        )
        .expect("write");

        match load_artifacts(temp.path()) {
            Err(ArtifactLoadError::Inconsistent(msg)) => assert!(msg.contains("insulin")),
            other => panic!("expected inconsistent scaler, got {other:?}"),
        }
    }

    #[test]
    fn test_manifest_binds_files() {
        let temp = tempdir().expect("tempdir");
        write_fixture_dir(temp.path());
        write_manifest(temp.path());

        let bundle = load_bundle(temp.path(), true).expect("signed bundle should load");
        assert_eq!(bundle.provenance().version.as_deref(), Some("test-1"));

        // Tamper after the manifest was written.
        fs::write(
            temp.path().join(FEATURE_INDICES_FILE),
            br#"{"blood_glucose_level": 0, "HbA1c_level": 1, "bmi": 2, "smoking_history": 3, "heart_disease": 4, "hypertension": 5, "age": 6}"#,
        )
        .expect("write");

        match load_bundle(temp.path(), false) {
            Err(ArtifactLoadError::IntegrityMismatch { artifact, .. }) => {
                assert_eq!(artifact, FEATURE_INDICES_FILE);
            }
            other => panic!("expected integrity mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_required_manifest_must_exist() {
        let temp = tempdir().expect("tempdir");
        write_fixture_dir(temp.path());

        assert!(matches!(
            load_bundle(temp.path(), true),
            Err(ArtifactLoadError::Missing {
                artifact: MANIFEST_FILE,
                ..
            })
        ));
    }

    #[test]
    fn test_store_loads_once() {
        let temp = tempdir().expect("tempdir");
        write_fixture_dir(temp.path());

        let store = JsonArtifactStore::new(temp.path());
        assert!(!store.is_loaded());

        let first = store.load().expect("load");
        assert!(store.is_loaded());

        // Files vanishing after load must not matter: no reload happens.
        fs::remove_file(temp.path().join(MODEL_FILE)).expect("remove model");
        let second = store.load().expect("cached");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_load_leaves_store_unloaded() {
        let temp = tempdir().expect("tempdir");
        let store = JsonArtifactStore::new(temp.path());
        assert!(store.load().is_err());
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_shipped_bundle_matches_manifest() {
        let store = JsonArtifactStore::new("models").require_manifest(true);
        let bundle = store.load().expect("shipped bundle should load");
        assert_eq!(bundle.provenance().version.as_deref(), Some("1.0.0"));
        assert_eq!(bundle.provenance().fingerprint, SHIPPED_FINGERPRINT);
    }

    #[test]
    fn test_fingerprint_is_single_sha256_over_digest_lines() {
        let temp = tempdir().expect("tempdir");
        write_fixture_dir(temp.path());

        let mut lines = String::new();
        for name in BUNDLE_FILES {
            let bytes = fs::read(temp.path().join(name)).expect("read bundle file");
            lines.push_str(&format!("{name}:{}\n", sha256_hex(&bytes)));
        }
        let expected = to_hex(&Sha256::digest(lines.as_bytes()));

        let bundle = load_bundle(temp.path(), false).expect("bundle should load");
        assert_eq!(bundle.provenance().fingerprint, expected);
    }
}
