//! Preprocessing parameters produced by the offline training step.
//!
//! All types here are plain data with load-time validation. They are
//! immutable once a bundle has been assembled.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::error::{ArtifactLoadError, PipelineError};

fn inconsistent(msg: impl Into<String>) -> ArtifactLoadError {
    ArtifactLoadError::Inconsistent(msg.into())
}

/// Standard-scaler parameters: `(x - mean) / scale` per fitted feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Features the scaler was fit on, in fit order.
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ScalerParams {
    /// Check internal consistency.
    ///
    /// # Errors
    /// Returns `Inconsistent` on length mismatches, duplicate names, or a
    /// zero/non-finite scale.
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        let n = self.feature_names.len();
        if self.mean.len() != n || self.scale.len() != n {
            return Err(inconsistent(format!(
                "scaler fitted on {n} features but has {} means and {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }

        let mut seen = BTreeSet::new();
        for (i, name) in self.feature_names.iter().enumerate() {
            if !seen.insert(name.as_str()) {
                return Err(inconsistent(format!("scaler lists '{name}' twice")));
            }
            if !self.mean[i].is_finite() {
                return Err(inconsistent(format!("scaler mean for '{name}' is not finite")));
            }
            if !self.scale[i].is_finite() || self.scale[i] == 0.0 {
                return Err(inconsistent(format!(
                    "scaler scale for '{name}' must be finite and non-zero, got {}",
                    self.scale[i]
                )));
            }
        }
        Ok(())
    }

    /// Position of `name` in the fitted feature list.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Scale `value` if `name` is a fitted feature; pass it through otherwise.
    #[must_use]
    pub fn transform(&self, name: &str, value: f64) -> f64 {
        match self.position(name) {
            Some(i) => (value - self.mean[i]) / self.scale[i],
            None => value,
        }
    }
}

/// One categorical encoding table on disk.
///
/// Either an explicit `{category: code}` map or a label-encoder class list
/// where a category's code is its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EncoderTable {
    Codes(BTreeMap<String, i64>),
    Classes(Vec<String>),
}

impl EncoderTable {
    fn into_codes(self, field: &str) -> Result<BTreeMap<String, i64>, ArtifactLoadError> {
        let codes = match self {
            Self::Codes(codes) => codes,
            Self::Classes(classes) => {
                let mut codes = BTreeMap::new();
                for (code, class) in (0_i64..).zip(classes) {
                    if codes.insert(class.clone(), code).is_some() {
                        return Err(inconsistent(format!(
                            "encoder '{field}' lists class '{class}' twice"
                        )));
                    }
                }
                codes
            }
        };

        let distinct: BTreeSet<i64> = codes.values().copied().collect();
        if distinct.len() != codes.len() {
            return Err(inconsistent(format!(
                "encoder '{field}' maps two categories to the same code"
            )));
        }
        Ok(codes)
    }
}

/// Categorical field name -> (category -> trained code).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncoderTables {
    tables: BTreeMap<String, BTreeMap<String, i64>>,
}

impl EncoderTables {
    /// Normalize on-disk tables into code maps.
    ///
    /// # Errors
    /// Returns `Inconsistent` if any table has duplicate classes or codes.
    pub fn from_tables(raw: BTreeMap<String, EncoderTable>) -> Result<Self, ArtifactLoadError> {
        let tables = raw
            .into_iter()
            .map(|(field, table)| {
                let codes = table.into_codes(&field)?;
                Ok((field, codes))
            })
            .collect::<Result<_, ArtifactLoadError>>()?;
        Ok(Self { tables })
    }

    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.tables.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Look up the trained code for `category`.
    ///
    /// # Errors
    /// `UnknownCategory` when the table has no entry for `category`, or
    /// `MissingFeature` when no table exists for `field`.
    pub fn code(&self, field: &str, category: &str) -> Result<i64, PipelineError> {
        let table = self
            .tables
            .get(field)
            .ok_or_else(|| PipelineError::MissingFeature(field.to_string()))?;

        table
            .get(category)
            .copied()
            .ok_or_else(|| PipelineError::UnknownCategory {
                field: field.to_string(),
                value: category.to_string(),
                allowed: table.keys().cloned().collect(),
            })
    }
}

/// Selected feature list plus the name -> column index map.
///
/// Stored as `(name, column)` pairs in selected-feature order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayout {
    slots: Vec<(String, usize)>,
}

impl FeatureLayout {
    /// Validate and combine the two layout artifacts.
    ///
    /// # Errors
    /// Returns `Inconsistent` unless the selected list has no duplicates,
    /// names exactly the keys of `indices`, and `indices` is a bijection onto
    /// `[0, len)`.
    pub fn new(
        selected: Vec<String>,
        indices: &HashMap<String, usize>,
    ) -> Result<Self, ArtifactLoadError> {
        let n = selected.len();
        if n == 0 {
            return Err(inconsistent("selected feature list is empty"));
        }
        if indices.len() != n {
            return Err(inconsistent(format!(
                "{n} selected features but feature index map has {} entries",
                indices.len()
            )));
        }

        let mut used = vec![false; n];
        let mut slots = Vec::with_capacity(n);
        for name in selected {
            let column = *indices.get(&name).ok_or_else(|| {
                inconsistent(format!("selected feature '{name}' missing from index map"))
            })?;
            if column >= n {
                return Err(inconsistent(format!(
                    "feature '{name}' mapped to column {column}, outside [0, {n})"
                )));
            }
            if std::mem::replace(&mut used[column], true) {
                return Err(inconsistent(format!(
                    "column {column} assigned to more than one feature"
                )));
            }
            slots.push((name, column));
        }

        Ok(Self { slots })
    }

    /// Model input dimensionality.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `(name, column)` pairs in selected-feature order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, usize)> {
        self.slots.iter().map(|(name, column)| (name.as_str(), *column))
    }

    /// Selected feature names, in selected-feature order.
    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(name, _)| name.as_str())
    }
}

/// Model-ready input: one value per column, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_map(pairs: &[(&str, usize)]) -> HashMap<String, usize> {
        pairs.iter().map(|(n, i)| ((*n).to_string(), *i)).collect()
    }

    #[test]
    fn test_scaler_transform_only_touches_fitted_features() {
        let scaler = ScalerParams {
            feature_names: vec!["age".into(), "bmi".into()],
            mean: vec![40.0, 25.0],
            scale: vec![20.0, 5.0],
        };
        scaler.validate().expect("valid scaler");

        assert!((scaler.transform("age", 60.0) - 1.0).abs() < f64::EPSILON);
        assert!((scaler.transform("bmi", 20.0) + 1.0).abs() < f64::EPSILON);
        assert!((scaler.transform("hypertension", 1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scaler_rejects_mismatched_lengths_and_zero_scale() {
        let short = ScalerParams {
            feature_names: vec!["age".into(), "bmi".into()],
            mean: vec![40.0],
            scale: vec![20.0, 5.0],
        };
        assert!(matches!(short.validate(), Err(ArtifactLoadError::Inconsistent(_))));

        let zero = ScalerParams {
            feature_names: vec!["age".into()],
            mean: vec![40.0],
            scale: vec![0.0],
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_encoder_accepts_class_lists_and_code_maps() {
        let raw: BTreeMap<String, EncoderTable> = serde_json::from_str(
            r#"{
                "gender": ["Female", "Male", "Other"],
                "smoking_history": {"never": 4, "current": 1}
            }"#,
        )
        .expect("parse tables");
        let tables = EncoderTables::from_tables(raw).expect("valid tables");

        assert_eq!(tables.code("gender", "Male"), Ok(1));
        assert_eq!(tables.code("smoking_history", "never"), Ok(4));
        assert!(matches!(
            tables.code("smoking_history", "former"),
            Err(PipelineError::UnknownCategory { .. })
        ));
        assert_eq!(
            tables.code("ethnicity", "x"),
            Err(PipelineError::MissingFeature("ethnicity".into()))
        );
    }

    #[test]
    fn test_encoder_rejects_duplicate_codes() {
        let mut raw = BTreeMap::new();
        raw.insert(
            "gender".to_string(),
            EncoderTable::Codes([("Female".to_string(), 0), ("Male".to_string(), 0)].into()),
        );
        assert!(EncoderTables::from_tables(raw).is_err());
    }

    #[test]
    fn test_layout_requires_bijection() {
        let selected = vec!["age".to_string(), "bmi".to_string()];

        let ok = FeatureLayout::new(selected.clone(), &index_map(&[("bmi", 0), ("age", 1)]))
            .expect("valid layout");
        assert_eq!(ok.slots().collect::<Vec<_>>(), vec![("age", 1), ("bmi", 0)]);

        let duplicate = FeatureLayout::new(selected.clone(), &index_map(&[("age", 0), ("bmi", 0)]));
        assert!(duplicate.is_err());

        let out_of_range =
            FeatureLayout::new(selected.clone(), &index_map(&[("age", 0), ("bmi", 2)]));
        assert!(out_of_range.is_err());

        let size_mismatch = FeatureLayout::new(selected, &index_map(&[("age", 0)]));
        assert!(size_mismatch.is_err());
    }
}
