//! Score normalizer
//!
//! Converts a raw anomaly score into a failure probability with a logistic
//! curve:
//!
//! ```text
//! p = 1 / (1 + exp(-k * s))
//! ```
//!
//! `s` uses the model convention of [`crate::model::AnomalyModel`]: positive
//! scores are more anomalous than the decision boundary, so `p` rises with
//! anomalousness and `s = 0` maps to exactly `0.5`. `k` is the sharpness.
//!
//! Absolute-value sigmoids, linear threshold scaling and binary
//! inlier/outlier constants are intentionally not offered.

use crate::error::ScoringError;
use serde::{Deserialize, Serialize};

/// Default logistic slope. With isolation-forest scores in (-0.5, 0.5) this
/// spreads probabilities over roughly [0.007, 0.993].
pub const DEFAULT_SHARPNESS: f64 = 10.0;

/// Maps raw anomaly scores onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreNormalizer {
    sharpness: f64,
}

impl ScoreNormalizer {
    /// Create a normalizer, rejecting a sharpness that is not finite and > 0
    pub fn new(sharpness: f64) -> Result<Self, ScoringError> {
        if !sharpness.is_finite() || sharpness <= 0.0 {
            return Err(ScoringError::InvalidSharpness(sharpness));
        }
        Ok(Self { sharpness })
    }

    /// Logistic slope in use
    pub fn sharpness(&self) -> f64 {
        self.sharpness
    }

    /// Convert a raw score into a failure probability
    pub fn normalize(&self, score: f64) -> Result<f64, ScoringError> {
        if !score.is_finite() {
            return Err(ScoringError::NonFiniteScore(score));
        }

        // k * s may overflow to +-inf; exp saturates to 0 or inf and the
        // quotient to 1 or 0, never NaN.
        let x = self.sharpness * score;
        let p = 1.0 / (1.0 + (-x).exp());

        Ok(p.clamp(0.0, 1.0))
    }
}

impl Default for ScoreNormalizer {
    fn default() -> Self {
        Self {
            sharpness: DEFAULT_SHARPNESS,
        }
    }
}
