//! # Grid Snapshots
//!
//! One `GridState` per decision cycle: exactly 15 slots in row-major order.
//!
//! ```text
//!          col 0   col 1   col 2   col 3   col 4
//! row 0  [  0  ] [  1  ] [  2  ] [  3  ] [  4  ]
//! row 1  [  5  ] [  6  ] [  7  ] [  8  ] [  9  ]
//! row 2  [ 10  ] [ 11  ] [ 12  ] [ 13  ] [ 14  ]
//! ```
//!
//! Slots are addressed by `GridPos`; a slot's index is its position in the
//! row-major order above. Age counts consecutive cycles a slot kept the same
//! `(unit, rank)` and is the only defense against single-frame flicker.

use std::fmt;

use crate::constants::{EMPTY_RANK, GRID_COLS, GRID_ROWS, GRID_SLOTS, MAX_RANK, MIN_RANK};
use crate::unit::{Rank, UnitId};

/// Position of a slot on the battle grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPos {
    row: u8,
    col: u8,
}

impl GridPos {
    /// Creates a position, `None` if outside the 3x5 grid.
    #[inline]
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < GRID_ROWS && col < GRID_COLS {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Position of the `index`-th slot in row-major order.
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < GRID_SLOTS {
            Some(Self {
                row: (index / GRID_COLS as usize) as u8,
                col: (index % GRID_COLS as usize) as u8,
            })
        } else {
            None
        }
    }

    /// Row-major index of this position.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.row as usize * GRID_COLS as usize + self.col as usize
    }

    /// Row (0..3).
    #[inline]
    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Column (0..5).
    #[inline]
    #[must_use]
    pub const fn col(self) -> u8 {
        self.col
    }

    /// All 15 positions in row-major order.
    pub fn all() -> impl Iterator<Item = GridPos> {
        (0..GRID_SLOTS).filter_map(Self::from_index)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// One classified cell of the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSlot {
    /// Where the slot sits.
    pub pos: GridPos,
    /// Recognized unit, or a sentinel.
    pub unit: UnitId,
    /// Upgrade tier. 0 iff `unit` is empty.
    pub rank: Rank,
    /// Color distance of the winning reference (lower is better, +inf when unreadable).
    pub match_score: f32,
    /// Rank model confidence in [0, 1].
    pub rank_confidence: f32,
    /// Consecutive cycles with the same `(unit, rank)` at this position.
    pub age: u32,
}

impl GridSlot {
    /// Creates a slot, enforcing the rank invariant.
    ///
    /// Empty slots always carry rank 0; any other unit gets its rank
    /// clamped into 1..=7.
    #[must_use]
    pub fn new(pos: GridPos, unit: UnitId, rank: Rank, match_score: f32, rank_confidence: f32) -> Self {
        let rank = if unit.is_empty() {
            EMPTY_RANK
        } else {
            rank.clamp(MIN_RANK, MAX_RANK)
        };
        Self {
            pos,
            unit,
            rank,
            match_score,
            rank_confidence: rank_confidence.clamp(0.0, 1.0),
            age: 0,
        }
    }

    /// An empty slot at `pos`.
    #[must_use]
    pub fn empty(pos: GridPos) -> Self {
        Self::new(pos, UnitId::empty(), EMPTY_RANK, 0.0, 0.0)
    }

    /// Returns the slot with its age set.
    #[must_use]
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    /// True for free slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unit.is_empty()
    }

    /// True if both slots hold the same `(unit, rank)`.
    #[inline]
    #[must_use]
    pub fn same_occupant(&self, other: &GridSlot) -> bool {
        self.rank == other.rank && self.unit == other.unit
    }
}

/// Summary figures over one grid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridStats {
    /// Non-empty slots (unknown included).
    pub total_units: u32,
    /// Free slots.
    pub empty_slots: u32,
    /// Unreadable slots.
    pub unknown_slots: u32,
    /// Mean slot age.
    pub mean_age: f32,
    /// Occupied slots whose rank confidence is under the threshold.
    pub low_confidence: u32,
}

/// Immutable snapshot of the board for one decision cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct GridState {
    slots: [GridSlot; GRID_SLOTS],
    cycle: u64,
}

impl GridState {
    /// Builds a grid by asking `slot_at` for every position in row-major order.
    ///
    /// The returned slot's `pos` is overwritten with the requested position,
    /// so the 15 positions are always unique.
    pub fn from_fn(cycle: u64, mut slot_at: impl FnMut(GridPos) -> GridSlot) -> Self {
        let slots = std::array::from_fn(|index| {
            // from_index cannot fail for index < GRID_SLOTS
            let pos = GridPos::from_index(index).unwrap_or(GridPos { row: 0, col: 0 });
            let mut slot = slot_at(pos);
            slot.pos = pos;
            slot
        });
        Self { slots, cycle }
    }

    /// A grid with every slot empty and age 0.
    #[must_use]
    pub fn empty(cycle: u64) -> Self {
        Self::from_fn(cycle, GridSlot::empty)
    }

    /// Fills slots in row-major order from `units`; the rest stay empty.
    ///
    /// Entries past the 15th are ignored.
    #[must_use]
    pub fn with_units(cycle: u64, units: &[(&str, Rank)]) -> Self {
        Self::from_fn(cycle, |pos| match units.get(pos.index()) {
            Some((unit, rank)) => GridSlot::new(pos, UnitId::new(*unit), *rank, 0.0, 1.0),
            None => GridSlot::empty(pos),
        })
    }

    /// Cycle number this snapshot belongs to.
    #[inline]
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// All slots in row-major order.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[GridSlot] {
        &self.slots
    }

    /// The slot at `pos`.
    #[inline]
    #[must_use]
    pub fn slot(&self, pos: GridPos) -> &GridSlot {
        &self.slots[pos.index()]
    }

    /// Iterates over all slots.
    pub fn iter(&self) -> impl Iterator<Item = &GridSlot> {
        self.slots.iter()
    }

    /// Positions holding `(unit, rank)`, in row-major order.
    #[must_use]
    pub fn positions_of(&self, unit: &str, rank: Rank) -> Vec<GridPos> {
        self.slots
            .iter()
            .filter(|s| s.rank == rank && s.unit == unit)
            .map(|s| s.pos)
            .collect()
    }

    /// Number of free slots.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_empty()).count()
    }

    /// Number of slots holding `unit`, any rank.
    #[must_use]
    pub fn unit_count(&self, unit: &str) -> usize {
        self.slots.iter().filter(|s| s.unit == unit).count()
    }

    /// Mean age over all slots.
    #[must_use]
    pub fn mean_age(&self) -> f32 {
        let total: u64 = self.slots.iter().map(|s| u64::from(s.age)).sum();
        total as f32 / GRID_SLOTS as f32
    }

    /// Summary figures; `low_confidence` counts occupied slots under `rank_threshold`.
    #[must_use]
    pub fn stats(&self, rank_threshold: f32) -> GridStats {
        let mut stats = GridStats {
            mean_age: self.mean_age(),
            ..GridStats::default()
        };
        for slot in &self.slots {
            if slot.is_empty() {
                stats.empty_slots += 1;
                continue;
            }
            stats.total_units += 1;
            if slot.unit.is_unknown() {
                stats.unknown_slots += 1;
            }
            if slot.rank_confidence < rank_threshold {
                stats.low_confidence += 1;
            }
        }
        stats
    }
}
