//! # Grid State Builder
//!
//! Turns 15 per-cell results into an immutable `GridState`, carrying slot
//! ages over from the previous cycle.
//!
//! ```text
//! prev (unit, rank) == curr (unit, rank)  ──►  age = prev.age + 1
//! otherwise, or no previous state         ──►  age = 0
//! ```

use gridmerge_core::{GridPos, GridSlot, GridState, UnitId};

use crate::classifier::Classification;
use crate::rank::RankEstimate;

/// Classifier and estimator output for one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct CellResult {
    /// Which unit the cell shows.
    pub classification: Classification,
    /// Which rank it has.
    pub rank: RankEstimate,
}

impl CellResult {
    /// A free cell.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            classification: Classification::empty(0.0, 0.0),
            rank: RankEstimate::new(0, 0.0, 0.0),
        }
    }

    /// Converts into a slot at `pos` with age 0.
    #[must_use]
    pub fn to_slot(&self, pos: GridPos) -> GridSlot {
        GridSlot::new(
            pos,
            self.classification.unit.clone(),
            self.rank.rank,
            self.classification.score,
            self.rank.confidence,
        )
    }
}

/// Assembles a `GridState` for `cycle`.
///
/// `cells` is read in row-major order. Positions it does not cover are
/// empty, so an empty slice is the "no slots" signal of a failed capture
/// and yields an all-empty grid.
#[must_use]
pub fn build_grid(cycle: u64, cells: &[CellResult], previous: Option<&GridState>) -> GridState {
    GridState::from_fn(cycle, |pos| {
        let slot = match cells.get(pos.index()) {
            Some(cell) => cell.to_slot(pos),
            None => GridSlot::new(pos, UnitId::empty(), 0, 0.0, 0.0),
        };
        let age = previous.map_or(0, |prev| next_age(prev.slot(pos), &slot));
        slot.with_age(age)
    })
}

/// Age of `current` given the slot it replaces.
#[inline]
#[must_use]
pub fn next_age(previous: &GridSlot, current: &GridSlot) -> u32 {
    if previous.same_occupant(current) {
        previous.age.saturating_add(1)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(unit: &str, rank: u8) -> CellResult {
        CellResult {
            classification: Classification::matched(UnitId::new(unit), 10.0, 2000.0),
            rank: RankEstimate::new(rank, 0.9, 0.55),
        }
    }

    #[test]
    fn test_no_slots_signal_is_all_empty() {
        let grid = build_grid(4, &[], None);
        assert_eq!(grid.empty_count(), 15);
        assert!(grid.iter().all(|s| s.age == 0 && s.rank == 0));
    }

    #[test]
    fn test_empty_cells_keep_rank_zero() {
        let grid = build_grid(0, &[cell("empty", 3)], None);
        assert_eq!(grid.slots()[0].rank, 0);
    }
}
