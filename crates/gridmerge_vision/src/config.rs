//! Recognition settings (`[recognition]` in the bot config).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classifier::DEFAULT_MSE_THRESHOLD;
use crate::rank::DEFAULT_RANK_CONFIDENCE;

/// Where perception assets live and how strict matching is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Maximum accepted color distance.
    pub mse_threshold: f32,
    /// Rank confidence under which an estimate is uncertain.
    pub rank_confidence_threshold: f32,
    /// Directory holding the active deck's unit assets.
    pub active_deck_dir: PathBuf,
    /// Rank model file. Without one every unit is rank 1.
    pub rank_model_path: Option<PathBuf>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            mse_threshold: DEFAULT_MSE_THRESHOLD,
            rank_confidence_threshold: DEFAULT_RANK_CONFIDENCE,
            active_deck_dir: PathBuf::from("assets/active"),
            rank_model_path: None,
        }
    }
}
