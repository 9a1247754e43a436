//! # Bot Configuration
//!
//! One TOML file, loaded once at startup. Every table is optional and
//! falls back to its defaults:
//!
//! ```toml
//! [policy]
//! dps_unit = "demon_hunter"
//! target_rank = 2
//!
//! [recognition]
//! mse_threshold = 2000.0
//! active_deck_dir = "assets/active"
//!
//! [layout]
//! origin_x = 153
//! origin_y = 945
//! swipe_duration_ms = 1000
//!
//! [cycle]
//! event_capacity = 1024
//! ```

use std::path::Path;
use std::time::Duration;

use gridmerge_policy::PolicyConfig;
use gridmerge_vision::{GridLayout, RecognitionConfig};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Screen geometry and swipe timing (`[layout]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Left edge of cell (0,0).
    pub origin_x: u32,
    /// Top edge of cell (0,0).
    pub origin_y: u32,
    /// Cell width in pixels.
    pub cell_width: u32,
    /// Cell height in pixels.
    pub cell_height: u32,
    /// Spacing between neighbouring cells.
    pub gap: u32,
    /// How long one merge swipe takes.
    pub swipe_duration_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let grid = GridLayout::default();
        Self {
            origin_x: grid.origin_x,
            origin_y: grid.origin_y,
            cell_width: grid.cell_width,
            cell_height: grid.cell_height,
            gap: grid.gap,
            swipe_duration_ms: 1000,
        }
    }
}

impl LayoutConfig {
    /// The grid geometry part.
    #[must_use]
    pub fn grid(&self) -> GridLayout {
        GridLayout {
            origin_x: self.origin_x,
            origin_y: self.origin_y,
            cell_width: self.cell_width,
            cell_height: self.cell_height,
            gap: self.gap,
        }
    }

    /// Swipe duration.
    #[inline]
    #[must_use]
    pub fn swipe_duration(&self) -> Duration {
        Duration::from_millis(self.swipe_duration_ms)
    }
}

/// Decision cycle settings (`[cycle]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Capacity of the bot event channel.
    pub event_capacity: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self { event_capacity: 1024 }
    }
}

/// The whole bot configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Merge policy knobs.
    pub policy: PolicyConfig,
    /// Perception assets and thresholds.
    pub recognition: RecognitionConfig,
    /// Screen geometry.
    pub layout: LayoutConfig,
    /// Cycle settings.
    pub cycle: CycleConfig,
}

impl BotConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and the validation
    /// error for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, &e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            dps_unit = %config.policy.dps_unit,
            target_rank = config.policy.target_rank,
            "bot config loaded"
        );
        Ok(config)
    }

    /// Checks every table.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;

        let recognition = &self.recognition;
        if !(recognition.mse_threshold.is_finite() && recognition.mse_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "recognition.mse_threshold must be positive, got {}",
                recognition.mse_threshold
            )));
        }
        if !(0.0..=1.0).contains(&recognition.rank_confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "recognition.rank_confidence_threshold must be in [0, 1], got {}",
                recognition.rank_confidence_threshold
            )));
        }
        if self.layout.cell_width == 0 || self.layout.cell_height == 0 {
            return Err(ConfigError::Invalid("layout cell size must be non-zero".to_string()));
        }
        if self.layout.grid().extent().is_none() {
            return Err(ConfigError::Invalid(
                "layout grid extends past the largest screen coordinate".to_string(),
            ));
        }
        if self.cycle.event_capacity == 0 {
            return Err(ConfigError::Invalid("cycle.event_capacity must be non-zero".to_string()));
        }
        Ok(())
    }
}
