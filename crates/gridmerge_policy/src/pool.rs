//! Working copy of the census the policy narrows within one decision.
//!
//! Lives only inside `MergePolicy::decide`; it is rebuilt from the census
//! every cycle and dropped afterwards.

use gridmerge_core::constants::{EMPTY_UNIT, UNKNOWN_UNIT};
use gridmerge_core::{Census, UnitSeries, MAX_RANK};

/// Merge candidates by `(unit, rank)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MergePool {
    series: UnitSeries,
}

impl MergePool {
    /// Copies the census series minus both sentinels.
    pub(crate) fn from_census(census: &Census) -> Self {
        Self {
            series: census
                .series()
                .filter_by(Some(&[EMPTY_UNIT, UNKNOWN_UNIT][..]), None, true),
        }
    }

    pub(crate) fn series(&self) -> &UnitSeries {
        &self.series
    }

    /// Removes every entry of `unit`.
    pub(crate) fn strip(&mut self, unit: &str) {
        self.series = self.series.without_unit(unit);
    }

    /// Holds back `times` instances of `unit`, highest rank first (lowest
    /// with `keep_lowest`).
    pub(crate) fn protect(&mut self, unit: &str, times: usize, keep_lowest: bool) {
        for _ in 0..times {
            self.series = self.series.preserve_one(unit, keep_lowest);
        }
    }

    /// Keeps only mergeable entries: a pair exists and the rank is not maxed.
    pub(crate) fn narrow(&mut self) {
        self.series = self.series.retain(|key, count| count >= 2 && key.rank < MAX_RANK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmerge_core::GridState;

    fn pool(units: &[(&str, u8)]) -> MergePool {
        MergePool::from_census(&Census::aggregate(&GridState::with_units(0, units)))
    }

    #[test]
    fn test_sentinels_stripped() {
        let p = pool(&[("unknown", 1), ("unknown", 1), ("dryad", 1)]);
        assert_eq!(p.series().total(), 1);
        assert_eq!(p.series().get("empty", 0), 0);
    }

    #[test]
    fn test_chemist_protection_takes_highest_rank() {
        let mut p = pool(&[("chemist", 1), ("chemist", 1), ("chemist", 1), ("chemist", 4)]);
        p.protect("chemist", 1, false);
        assert_eq!(p.series().get("chemist", 4), 0, "rank 4 chemist is held back first");
        assert_eq!(p.series().get("chemist", 1), 3);
    }

    #[test]
    fn test_cauldron_protection_takes_lowest_ranks() {
        let mut p = pool(&[
            ("cauldron", 1),
            ("cauldron", 1),
            ("cauldron", 2),
            ("cauldron", 3),
            ("cauldron", 3),
            ("cauldron", 5),
        ]);
        p.protect("cauldron", 4, true);
        assert_eq!(p.series().get("cauldron", 3), 1);
        assert_eq!(p.series().get("cauldron", 5), 1);
        assert_eq!(p.series().total_for("cauldron"), 2);
    }

    #[test]
    fn test_narrow_drops_singles_and_max_rank() {
        let mut p = pool(&[
            ("dryad", 2),
            ("dryad", 2),
            ("zealot", 7),
            ("zealot", 7),
            ("chemist", 3),
        ]);
        p.narrow();
        assert_eq!(p.series().len(), 1);
        assert_eq!(p.series().get("dryad", 2), 2);
    }
}
