//! # Census
//!
//! Count views over a `GridState`:
//!
//! - **per-unit counts**: how many slots hold each unit, any rank
//! - **unit series**: how many slots hold each `(unit, rank)` pair
//!
//! `UnitSeries` is a plain value. Every query returns a new series and
//! leaves the receiver untouched, so the policy can narrow a working copy
//! step by step without ever touching the census it came from.

use std::collections::BTreeMap;

use crate::grid::GridState;
use crate::unit::{Rank, UnitId};

/// Key of one series entry.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    /// Unit type.
    pub unit: UnitId,
    /// Upgrade tier.
    pub rank: Rank,
}

impl SeriesKey {
    /// Creates a key.
    #[must_use]
    pub fn new(unit: impl Into<UnitId>, rank: Rank) -> Self {
        Self {
            unit: unit.into(),
            rank,
        }
    }
}

/// Mapping from `(unit, rank)` to a count.
///
/// Zero counts are never stored. Iteration order is by unit id, then rank.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitSeries {
    counts: BTreeMap<SeriesKey, u32>,
}

impl UnitSeries {
    /// Creates an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` to the entry at `(unit, rank)`.
    pub fn insert(&mut self, unit: impl Into<UnitId>, rank: Rank, count: u32) {
        if count == 0 {
            return;
        }
        *self.counts.entry(SeriesKey::new(unit, rank)).or_insert(0) += count;
    }

    /// Count at `(unit, rank)`, 0 when absent.
    #[must_use]
    pub fn get(&self, unit: &str, rank: Rank) -> u32 {
        self.counts
            .iter()
            .find(|(key, _)| key.rank == rank && key.unit == unit)
            .map_or(0, |(_, count)| *count)
    }

    /// Number of distinct entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if there are no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over `(key, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&SeriesKey, u32)> {
        self.counts.iter().map(|(key, count)| (key, *count))
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Sum of counts for `unit`, any rank.
    #[must_use]
    pub fn total_for(&self, unit: &str) -> u32 {
        self.counts
            .iter()
            .filter(|(key, _)| key.unit == unit)
            .map(|(_, count)| *count)
            .sum()
    }

    /// Ranks present for `unit`, ascending.
    #[must_use]
    pub fn ranks_of(&self, unit: &str) -> Vec<Rank> {
        self.counts
            .keys()
            .filter(|key| key.unit == unit)
            .map(|key| key.rank)
            .collect()
    }

    /// Selects entries by unit and rank.
    ///
    /// An entry is selected when it matches the unit list AND the rank list.
    /// A `None` predicate matches everything; an empty list matches nothing.
    /// With `exclude` set, the complement within `self` is returned instead,
    /// so the two calls always partition the series.
    #[must_use]
    pub fn filter_by<U: AsRef<str>>(&self, units: Option<&[U]>, ranks: Option<&[Rank]>, exclude: bool) -> Self {
        self.retain(|key, _| {
            let unit_match = units.map_or(true, |units| units.iter().any(|u| key.unit == u.as_ref()));
            let rank_match = ranks.map_or(true, |ranks| ranks.contains(&key.rank));
            (unit_match && rank_match) != exclude
        })
    }

    /// Entries whose unit is in `units`.
    #[must_use]
    pub fn select_units<U: AsRef<str>>(&self, units: &[U]) -> Self {
        self.filter_by(Some(units), None, false)
    }

    /// Entries whose rank is in `ranks`.
    #[must_use]
    pub fn select_ranks(&self, ranks: &[Rank]) -> Self {
        self.filter_by::<&str>(None, Some(ranks), false)
    }

    /// All entries except those of `unit`.
    #[must_use]
    pub fn without_unit(&self, unit: &str) -> Self {
        self.filter_by(Some(&[unit][..]), None, true)
    }

    /// Entries for which `keep` returns true.
    #[must_use]
    pub fn retain(&self, mut keep: impl FnMut(&SeriesKey, u32) -> bool) -> Self {
        Self {
            counts: self
                .counts
                .iter()
                .filter(|(key, count)| keep(key, **count))
                .map(|(key, count)| (key.clone(), *count))
                .collect(),
        }
    }

    /// Holds back one instance of `target` from the series.
    ///
    /// Decrements the entry at the highest rank present for `target` (the
    /// lowest with `keep_lowest`). An entry reaching zero is dropped. If
    /// `target` is absent the series is returned unchanged.
    #[must_use]
    pub fn preserve_one(&self, target: &str, keep_lowest: bool) -> Self {
        let ranks = self.ranks_of(target);
        let chosen = if keep_lowest { ranks.first() } else { ranks.last() };
        let Some(&rank) = chosen else {
            return self.clone();
        };

        let mut out = self.clone();
        let key = SeriesKey::new(target, rank);
        if let Some(count) = out.counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                out.counts.remove(&key);
            }
        }
        out
    }
}

impl FromIterator<(SeriesKey, u32)> for UnitSeries {
    fn from_iter<I: IntoIterator<Item = (SeriesKey, u32)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (key, count) in iter {
            series.insert(key.unit, key.rank, count);
        }
        series
    }
}

/// What to count when aggregating a grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CensusOptions {
    /// Count free slots as unit `empty` (rank 0).
    pub include_empty: bool,
    /// Leave slots younger than this out of the series. 0 disables.
    pub min_age: u32,
}

/// Derived counts over one `GridState`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Census {
    unit_counts: BTreeMap<UnitId, u32>,
    series: UnitSeries,
    empty_slots: u32,
}

impl Census {
    /// Counts every occupied slot.
    #[must_use]
    pub fn aggregate(grid: &GridState) -> Self {
        Self::aggregate_with(grid, CensusOptions::default())
    }

    /// Like `aggregate`, but the series skips slots younger than `min_age`.
    ///
    /// Per-unit counts stay complete.
    #[must_use]
    pub fn aggregate_with_min_age(grid: &GridState, min_age: u32) -> Self {
        Self::aggregate_with(
            grid,
            CensusOptions {
                include_empty: false,
                min_age,
            },
        )
    }

    /// Counts a grid with explicit options.
    #[must_use]
    pub fn aggregate_with(grid: &GridState, options: CensusOptions) -> Self {
        let mut census = Self::default();
        for slot in grid.iter() {
            if slot.is_empty() {
                census.empty_slots += 1;
                if !options.include_empty {
                    continue;
                }
            }
            *census.unit_counts.entry(slot.unit.clone()).or_insert(0) += 1;
            if slot.age >= options.min_age {
                census.series.insert(slot.unit.clone(), slot.rank, 1);
            }
        }
        census
    }

    /// Per-`(unit, rank)` counts.
    #[inline]
    #[must_use]
    pub fn series(&self) -> &UnitSeries {
        &self.series
    }

    /// Per-unit counts.
    #[inline]
    #[must_use]
    pub fn unit_counts(&self) -> &BTreeMap<UnitId, u32> {
        &self.unit_counts
    }

    /// Slots holding `unit`, any rank.
    #[must_use]
    pub fn unit_count(&self, unit: &str) -> u32 {
        self.unit_counts
            .iter()
            .find(|(id, _)| **id == unit)
            .map_or(0, |(_, count)| *count)
    }

    /// Free slots on the grid, whether or not they were counted as units.
    #[inline]
    #[must_use]
    pub fn empty_slots(&self) -> u32 {
        self.empty_slots
    }
}
