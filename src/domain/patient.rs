//! Patient record types for diabetes risk prediction.
//!
//! Two shapes exist: [`PatientInput`] mirrors the wire JSON (free-form strings
//! for categories, integer flags), while [`PatientRecord`] is the validated,
//! strongly typed form the pipeline consumes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Categorical fields that need a label encoder before reaching the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoricalField {
    Gender,
    SmokingHistory,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 2] = [Self::Gender, Self::SmokingHistory];

    /// Column name used by the training step.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::SmokingHistory => "smoking_history",
        }
    }

    /// Training-time labels of every variant, in declaration order.
    #[must_use]
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Self::Gender => &["Female", "Male", "Other"],
            Self::SmokingHistory => &[
                "No Info",
                "current",
                "ever",
                "former",
                "never",
                "not current",
            ],
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn unknown(field: CategoricalField, value: &str) -> PipelineError {
    PipelineError::UnknownCategory {
        field: field.name().to_string(),
        value: value.to_string(),
        allowed: field.labels().iter().map(|s| (*s).to_string()).collect(),
    }
}

/// Patient gender as recorded in the training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Gender {
    /// Label the encoder tables were fit on.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
            Self::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Female" => Ok(Self::Female),
            "Male" => Ok(Self::Male),
            "Other" => Ok(Self::Other),
            other => Err(unknown(CategoricalField::Gender, other)),
        }
    }
}

/// Smoking history categories (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingHistory {
    #[serde(rename = "No Info")]
    NoInfo,
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "ever")]
    Ever,
    #[serde(rename = "former")]
    Former,
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "not current")]
    NotCurrent,
}

impl SmokingHistory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NoInfo => "No Info",
            Self::Current => "current",
            Self::Ever => "ever",
            Self::Former => "former",
            Self::Never => "never",
            Self::NotCurrent => "not current",
        }
    }
}

impl FromStr for SmokingHistory {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "No Info" => Ok(Self::NoInfo),
            "current" => Ok(Self::Current),
            "ever" => Ok(Self::Ever),
            "former" => Ok(Self::Former),
            "never" => Ok(Self::Never),
            "not current" => Ok(Self::NotCurrent),
            other => Err(unknown(CategoricalField::SmokingHistory, other)),
        }
    }
}

/// Raw patient data as received from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub gender: String,
    pub age: f64,
    pub hypertension: i64,
    pub heart_disease: i64,
    pub smoking_history: String,
    pub bmi: f64,
    #[serde(rename = "HbA1c_level")]
    pub hba1c_level: f64,
    pub blood_glucose_level: f64,
}

/// Validated patient record.
///
/// Field names on the wire match the training columns
/// (`HbA1c_level` keeps its training-column casing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub gender: Gender,
    /// Age in years, [0, 120]
    pub age: f64,
    pub hypertension: bool,
    pub heart_disease: bool,
    pub smoking_history: SmokingHistory,
    /// Body mass index, [10, 100]
    pub bmi: f64,
    /// Glycated hemoglobin in %, [3.5, 10]
    #[serde(rename = "HbA1c_level")]
    pub hba1c_level: f64,
    /// Blood glucose in mg/dL, [80, 300]
    pub blood_glucose_level: f64,
}

/// A single record field, as seen by the feature assembler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Categorical(CategoricalField, &'static str),
    Numeric(f64),
}

/// Every field a record can provide, in training column order.
pub const RECORD_FIELDS: [&str; 8] = [
    "gender",
    "age",
    "hypertension",
    "heart_disease",
    "smoking_history",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
];

/// Declared numeric domains, inclusive on both ends.
const NUMERIC_DOMAINS: [(&str, f64, f64); 4] = [
    ("age", 0.0, 120.0),
    ("bmi", 10.0, 100.0),
    ("HbA1c_level", 3.5, 10.0),
    ("blood_glucose_level", 80.0, 300.0),
];

fn flag(name: &str, value: i64, errors: &mut Vec<String>) -> bool {
    match value {
        0 => false,
        1 => true,
        other => {
            errors.push(format!("{name} {other} must be 0 or 1"));
            false
        }
    }
}

impl PatientRecord {
    /// Look up a field by its training column name.
    ///
    /// Returns `None` for names the record cannot provide.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "gender" => FieldValue::Categorical(CategoricalField::Gender, self.gender.label()),
            "smoking_history" => FieldValue::Categorical(
                CategoricalField::SmokingHistory,
                self.smoking_history.label(),
            ),
            "age" => FieldValue::Numeric(self.age),
            "hypertension" => FieldValue::Numeric(f64::from(u8::from(self.hypertension))),
            "heart_disease" => FieldValue::Numeric(f64::from(u8::from(self.heart_disease))),
            "bmi" => FieldValue::Numeric(self.bmi),
            "HbA1c_level" => FieldValue::Numeric(self.hba1c_level),
            "blood_glucose_level" => FieldValue::Numeric(self.blood_glucose_level),
            _ => return None,
        };
        Some(value)
    }

    /// Label of a categorical field.
    #[must_use]
    pub fn category(&self, field: CategoricalField) -> &'static str {
        match field {
            CategoricalField::Gender => self.gender.label(),
            CategoricalField::SmokingHistory => self.smoking_history.label(),
        }
    }

    /// Validate that all numeric features are within their declared domains.
    ///
    /// # Errors
    /// Returns every violated constraint; nothing is clamped.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let values = [self.age, self.bmi, self.hba1c_level, self.blood_glucose_level];
        let errors: Vec<String> = NUMERIC_DOMAINS
            .iter()
            .zip(values)
            .filter(|((_, lo, hi), v)| !(lo..=hi).contains(&v))
            .map(|((name, lo, hi), v)| format!("{name} {v} out of range [{lo}, {hi}]"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl TryFrom<&PatientInput> for PatientRecord {
    type Error = PipelineError;

    fn try_from(input: &PatientInput) -> Result<Self, Self::Error> {
        let gender = input.gender.parse::<Gender>()?;
        let smoking_history = input.smoking_history.parse::<SmokingHistory>()?;

        let mut errors = Vec::new();
        let hypertension = flag("hypertension", input.hypertension, &mut errors);
        let heart_disease = flag("heart_disease", input.heart_disease, &mut errors);

        let record = Self {
            gender,
            age: input.age,
            hypertension,
            heart_disease,
            smoking_history,
            bmi: input.bmi,
            hba1c_level: input.hba1c_level,
            blood_glucose_level: input.blood_glucose_level,
        };
        if let Err(more) = record.validate() {
            errors.extend(more);
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(PipelineError::InvalidRecord(errors))
        }
    }
}

impl TryFrom<PatientInput> for PatientRecord {
    type Error = PipelineError;

    fn try_from(input: PatientInput) -> Result<Self, Self::Error> {
        Self::try_from(&input)
    }
}

impl From<&PatientRecord> for PatientInput {
    fn from(record: &PatientRecord) -> Self {
        Self {
            gender: record.gender.label().to_string(),
            age: record.age,
            hypertension: i64::from(record.hypertension),
            heart_disease: i64::from(record.heart_disease),
            smoking_history: record.smoking_history.label().to_string(),
            bmi: record.bmi,
            hba1c_level: record.hba1c_level,
            blood_glucose_level: record.blood_glucose_level,
        }
    }
}
