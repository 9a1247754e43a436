//! # Unit Identity
//!
//! Units are keyed by the stem of their reference asset file name
//! (`dryad.png` -> `dryad`). Two sentinels exist: `empty` and `unknown`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ASSET_EXTENSION, EMPTY_UNIT, UNKNOWN_UNIT};

/// Upgrade tier of a unit. 0 only for empty slots, otherwise 1..=7.
pub type Rank = u8;

/// Identifier of a unit type.
///
/// Normalized on construction: surrounding whitespace and a trailing
/// `.png` are removed, so config values and asset names compare equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct UnitId(String);

impl UnitId {
    /// Creates a unit id, normalizing asset-style names.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        let stem = trimmed
            .strip_suffix(ASSET_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(trimmed);
        if stem.len() == name.len() {
            Self(name)
        } else {
            Self(stem.to_string())
        }
    }

    /// The free-slot sentinel.
    #[must_use]
    pub fn empty() -> Self {
        Self(EMPTY_UNIT.to_string())
    }

    /// The unreadable-cell sentinel.
    #[must_use]
    pub fn unknown() -> Self {
        Self(UNKNOWN_UNIT.to_string())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the free-slot sentinel.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == EMPTY_UNIT
    }

    /// True for the unreadable-cell sentinel.
    #[inline]
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_UNIT
    }

    /// True for either sentinel.
    #[inline]
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.is_empty() || self.is_unknown()
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UnitId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<UnitId> for String {
    fn from(value: UnitId) -> Self {
        value.0
    }
}

impl AsRef<str> for UnitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for UnitId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for UnitId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Unit ids the merge policy refers to by name.
pub mod names {
    /// Copies the unit it is merged into.
    pub const HARLEQUIN: &str = "harlequin";
    /// Upgrades through same-rank combos.
    pub const DRYAD: &str = "dryad";
    /// Mana production unit, one is always kept.
    pub const CHEMIST: &str = "chemist";
    /// Production unit, four are always kept.
    pub const CAULDRON: &str = "cauldron";
    /// Kept in pairs.
    pub const KNIGHT_STATUE: &str = "knight_statue";
    /// High-priority merge unit.
    pub const BOMBARDIER: &str = "bombardier";
    /// High-priority merge unit.
    pub const SUMMONER: &str = "summoner";
    /// Default DPS unit.
    pub const DEMON_HUNTER: &str = "demon_hunter";
    /// Protected from high-level merges by default.
    pub const ZEALOT: &str = "zealot";
    /// Protected from high-level merges by default.
    pub const CRYSTAL: &str = "crystal";
    /// Protected from high-level merges by default.
    pub const BRUSER: &str = "bruser";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_suffix_is_stripped() {
        assert_eq!(UnitId::new("dryad.png"), UnitId::new("dryad"));
        assert_eq!(UnitId::new(" demon_hunter.png "), "demon_hunter");
        // Only a real ".png" extension is stripped
        assert_eq!(UnitId::new("xpng"), "xpng");
    }

    #[test]
    fn test_sentinels() {
        assert!(UnitId::empty().is_empty());
        assert!(UnitId::new("empty.png").is_empty());
        assert!(UnitId::unknown().is_sentinel());
        assert!(!UnitId::new("chemist").is_sentinel());
    }
}
