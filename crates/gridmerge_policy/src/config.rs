//! # Policy Configuration
//!
//! The `[policy]` table of the bot config:
//!
//! ```toml
//! [policy]
//! dps_unit = "demon_hunter"
//! target_rank = 1
//! require_shaman = false
//! protected_units = ["zealot", "crystal", "bruser"]
//! priority_units = ["chemist", "bombardier", "summoner", "knight_statue"]
//! saturation_threshold = 11
//! min_age = 0
//! seed = 0
//! ```

use gridmerge_core::unit::names;
use gridmerge_core::{Rank, UnitId, MAX_RANK, MIN_RANK};
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// Knobs of the merge policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Primary damage dealer. Merged eagerly, kept from high-level merges.
    pub dps_unit: UnitId,
    /// Rank merged first once the board is nearly full.
    pub target_rank: Rank,
    /// Co-op mode: leave demon hunters to the partner.
    pub require_shaman: bool,
    /// Units never merged at rank 3 and above by the fallback step.
    pub protected_units: Vec<UnitId>,
    /// Units merged whenever a pair exists.
    pub priority_units: Vec<UnitId>,
    /// Demon hunter count at which the policy waits.
    pub saturation_threshold: u32,
    /// Slots younger than this many cycles are not merge candidates.
    pub min_age: u32,
    /// Seed of the policy RNG.
    pub seed: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            dps_unit: UnitId::new(names::DEMON_HUNTER),
            target_rank: 1,
            require_shaman: false,
            protected_units: [names::ZEALOT, names::CRYSTAL, names::BRUSER]
                .into_iter()
                .map(UnitId::new)
                .collect(),
            priority_units: [names::CHEMIST, names::BOMBARDIER, names::SUMMONER, names::KNIGHT_STATUE]
                .into_iter()
                .map(UnitId::new)
                .collect(),
            saturation_threshold: 11,
            min_age: 0,
            seed: 0,
        }
    }
}

impl PolicyConfig {
    /// Checks the config before the policy is built.
    ///
    /// # Errors
    ///
    /// `PolicyError::InvalidConfig` for an empty or sentinel DPS unit or a
    /// target rank outside 1..=7.
    pub fn validate(&self) -> PolicyResult<()> {
        if self.dps_unit.as_str().is_empty() {
            return Err(PolicyError::InvalidConfig("dps_unit is empty".to_string()));
        }
        if self.dps_unit.is_sentinel() {
            return Err(PolicyError::InvalidConfig(format!(
                "dps_unit cannot be the '{}' sentinel",
                self.dps_unit
            )));
        }
        if !(MIN_RANK..=MAX_RANK).contains(&self.target_rank) {
            return Err(PolicyError::InvalidConfig(format!(
                "target_rank {} outside {MIN_RANK}..={MAX_RANK}",
                self.target_rank
            )));
        }
        if let Some(unit) = self
            .protected_units
            .iter()
            .chain(&self.priority_units)
            .find(|u| u.is_sentinel())
        {
            return Err(PolicyError::InvalidConfig(format!("'{unit}' cannot be listed as a unit")));
        }
        Ok(())
    }

    /// True when the DPS unit is the demon hunter.
    #[must_use]
    pub fn dps_is_demon_hunter(&self) -> bool {
        self.dps_unit == names::DEMON_HUNTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PolicyConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.dps_is_demon_hunter());
        assert_eq!(config.saturation_threshold, 11);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: PolicyConfig = toml::from_str("dps_unit = \"zealot.png\"\ntarget_rank = 2").unwrap();
        assert_eq!(config.dps_unit, "zealot");
        assert_eq!(config.target_rank, 2);
        assert_eq!(config.priority_units.len(), 4);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let mut config = PolicyConfig {
            target_rank: 8,
            ..PolicyConfig::default()
        };
        assert!(matches!(config.validate(), Err(PolicyError::InvalidConfig(_))));

        config.target_rank = 0;
        assert!(config.validate().is_err());

        config.target_rank = 1;
        config.dps_unit = UnitId::empty();
        assert!(config.validate().is_err());

        config.dps_unit = UnitId::new("");
        assert!(config.validate().is_err());
    }
}
