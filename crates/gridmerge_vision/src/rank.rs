//! # Rank Estimation
//!
//! Linear softmax model over standardized `RankFeatures`:
//!
//! ```text
//! z = (features - means) / scales
//! p = softmax(weights · z + bias)        7 classes, one per rank
//! rank = argmax(p) + 1, confidence = max(p)
//! ```
//!
//! The model is trained offline and shipped as TOML:
//!
//! ```toml
//! means   = [13 values]
//! scales  = [13 values]
//! weights = [[13 values], ... 7 rows]
//! bias    = [7 values]
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use gridmerge_core::constants::EMPTY_RANK;
use gridmerge_core::{Rank, UnitId, MAX_RANK, MIN_RANK};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{VisionError, VisionResult};
use crate::features::{RankFeatures, FEATURE_COUNT};

/// Number of rank classes.
pub const RANK_CLASSES: usize = MAX_RANK as usize;

/// Default confidence below which an estimate is flagged uncertain.
pub const DEFAULT_RANK_CONFIDENCE: f32 = 0.55;

/// Rank prediction for one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankEstimate {
    /// Predicted rank. 0 for empty cells.
    pub rank: Rank,
    /// Probability of the predicted rank.
    pub confidence: f32,
    threshold: f32,
}

impl RankEstimate {
    /// Creates an estimate judged against `threshold`.
    #[must_use]
    pub fn new(rank: Rank, confidence: f32, threshold: f32) -> Self {
        Self {
            rank,
            confidence: confidence.clamp(0.0, 1.0),
            threshold,
        }
    }

    /// True when confidence is under the threshold. Still usable.
    #[inline]
    #[must_use]
    pub fn is_uncertain(&self) -> bool {
        self.confidence < self.threshold
    }
}

/// Serialized softmax rank model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankModel {
    /// Per-feature mean used for standardization.
    pub means: Vec<f32>,
    /// Per-feature scale used for standardization.
    pub scales: Vec<f32>,
    /// One weight row per rank class.
    pub weights: Vec<Vec<f32>>,
    /// One bias per rank class.
    pub bias: Vec<f32>,
}

impl RankModel {
    /// Parses and validates a model.
    ///
    /// # Errors
    ///
    /// `VisionError::InvalidModel` on bad TOML or wrong shapes.
    pub fn from_toml_str(text: &str) -> VisionResult<Self> {
        let model: Self = toml::from_str(text).map_err(|e| VisionError::InvalidModel(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Loads a model file.
    ///
    /// # Errors
    ///
    /// `VisionError::Io` if unreadable, otherwise as `from_toml_str`.
    pub fn load(path: impl AsRef<Path>) -> VisionResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| VisionError::io(path, &e))?;
        let model = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "rank model loaded");
        Ok(model)
    }

    /// Checks vector and matrix dimensions.
    ///
    /// # Errors
    ///
    /// `VisionError::InvalidModel` describing the first mismatch.
    pub fn validate(&self) -> VisionResult<()> {
        let check_len = |name: &str, got: usize, want: usize| {
            if got == want {
                Ok(())
            } else {
                Err(VisionError::InvalidModel(format!("{name}: expected {want} values, got {got}")))
            }
        };
        check_len("means", self.means.len(), FEATURE_COUNT)?;
        check_len("scales", self.scales.len(), FEATURE_COUNT)?;
        check_len("weights", self.weights.len(), RANK_CLASSES)?;
        check_len("bias", self.bias.len(), RANK_CLASSES)?;
        for (i, row) in self.weights.iter().enumerate() {
            check_len(&format!("weights[{i}]"), row.len(), FEATURE_COUNT)?;
        }
        Ok(())
    }

    /// Class probabilities for `features`, index 0 is rank 1.
    #[must_use]
    pub fn probabilities(&self, features: &RankFeatures) -> [f32; RANK_CLASSES] {
        let z: Vec<f32> = features
            .as_slice()
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (mean, scale))| if *scale == 0.0 { 0.0 } else { (x - mean) / scale })
            .collect();

        let mut logits = [0.0_f32; RANK_CLASSES];
        for (logit, (row, bias)) in logits.iter_mut().zip(self.weights.iter().zip(&self.bias)) {
            *logit = row.iter().zip(&z).map(|(w, v)| w * v).sum::<f32>() + bias;
        }

        let peak = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut total = 0.0;
        for logit in &mut logits {
            *logit = (*logit - peak).exp();
            total += *logit;
        }
        for p in &mut logits {
            *p /= total;
        }
        logits
    }

    /// Most likely rank and its probability.
    #[must_use]
    pub fn predict(&self, features: &RankFeatures) -> (Rank, f32) {
        let probs = self.probabilities(features);
        let (index, confidence) = probs
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, p)| if *p > best.1 { (i, *p) } else { best });
        ((index as Rank + MIN_RANK).min(MAX_RANK), confidence)
    }
}

/// Per-cell rank estimation with safe fallbacks.
#[derive(Clone, Debug)]
pub struct RankEstimator {
    model: Option<Arc<RankModel>>,
    threshold: f32,
}

impl RankEstimator {
    /// Creates an estimator. With no model every occupied cell is rank 1.
    #[must_use]
    pub fn new(model: Option<Arc<RankModel>>, threshold: f32) -> Self {
        Self { model, threshold }
    }

    /// True if a model is loaded.
    #[must_use]
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Confidence under which an estimate is uncertain.
    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Estimates the rank of the unit in `cell`.
    ///
    /// Empty cells get rank 0. Unknown cells, unreadable crops and a missing
    /// model get rank 1 with zero confidence.
    #[must_use]
    pub fn estimate(&self, cell: Option<&RgbImage>, unit: &UnitId) -> RankEstimate {
        if unit.is_empty() {
            return RankEstimate::new(EMPTY_RANK, 0.0, self.threshold);
        }
        let fallback = RankEstimate::new(MIN_RANK, 0.0, self.threshold);
        if unit.is_unknown() {
            return fallback;
        }
        let (Some(model), Some(cell)) = (self.model.as_deref(), cell) else {
            return fallback;
        };
        match RankFeatures::extract(cell) {
            Some(features) => {
                let (rank, confidence) = model.predict(&features);
                RankEstimate::new(rank, confidence, self.threshold)
            }
            None => fallback,
        }
    }
}
