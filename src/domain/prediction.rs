//! Prediction result types.
//!
//! Represents the output of the diabetes classifier and its risk banding.

use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Probability at or above which a prediction is Medium risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.3;

/// Probability at or above which a prediction is High risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Discrete risk band derived from the diabetes probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// p < 0.3
    Low,
    /// 0.3 <= p < 0.7
    Medium,
    /// p >= 0.7
    High,
}

impl RiskLevel {
    /// Map a class-1 probability onto a risk band.
    ///
    /// Each band includes its lower bound: exactly 0.3 is `Medium`, exactly
    /// 0.7 is `High`.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidProbability` for values outside [0, 1]
    /// or NaN.
    pub fn classify(probability: f64) -> Result<Self, PipelineError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(PipelineError::InvalidProbability(probability));
        }

        Ok(if probability < MEDIUM_RISK_THRESHOLD {
            Self::Low
        } else if probability < HIGH_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::High
        })
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - no significant indicators",
            Self::Medium => "Medium risk - follow-up screening recommended",
            Self::High => "High risk - clinical consultation advised",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Outcome of a single prediction.
///
/// Request-scoped: never cached, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class (0 = no diabetes, 1 = diabetes)
    #[serde(rename = "prediction")]
    pub label: u8,

    /// Probability of diabetes (class 1), in [0, 1]
    pub probability: f64,

    pub risk_level: RiskLevel,
}

impl PredictionResult {
    /// Build a result from the model outputs, banding the probability.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidProbability` if the probability is not
    /// in [0, 1].
    pub fn new(label: u8, probability: f64) -> Result<Self, PipelineError> {
        let risk_level = RiskLevel::classify(probability)?;
        Ok(Self {
            label,
            probability,
            risk_level,
        })
    }

    /// Whether the model predicted diabetes.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}
