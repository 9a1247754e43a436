//! # GRIDMERGE Core
//!
//! Value types shared by perception, policy and the decision cycle.
//!
//! ## Architecture Rules
//!
//! 1. **Snapshots are immutable** - a `GridState` is built once per cycle and never mutated
//! 2. **Counts are derived** - `Census` is always recomputed from a `GridState`
//! 3. **Pure transforms** - series filters return new values, the input is untouched
//!
//! ## Example
//!
//! ```rust,ignore
//! use gridmerge_core::{Census, GridState};
//!
//! let grid = GridState::with_units(0, &[("chemist", 1), ("chemist", 1)]);
//! let census = Census::aggregate(&grid);
//! let chemists = census.series().filter_by(Some(&["chemist"]), None, false);
//! assert_eq!(chemists.total(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod census;
pub mod constants;
pub mod grid;
pub mod sync;
pub mod unit;

pub use census::{Census, CensusOptions, SeriesKey, UnitSeries};
pub use constants::{GRID_COLS, GRID_ROWS, GRID_SLOTS, MAX_RANK, MIN_RANK};
pub use grid::{GridPos, GridSlot, GridState, GridStats};
pub use sync::{SnapshotCell, SnapshotReader};
pub use unit::{Rank, UnitId};
