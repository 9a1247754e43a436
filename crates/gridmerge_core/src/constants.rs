//! # Board Constants
//!
//! Fixed dimensions of the battle grid and the rank scale.
//! Changing any of these invalidates every reference asset and rank model.

// =============================================================================
// GRID GEOMETRY
// =============================================================================

/// Rows on the battle grid.
pub const GRID_ROWS: u8 = 3;

/// Columns on the battle grid.
pub const GRID_COLS: u8 = 5;

/// Total number of slots (row-major, row 0..2, col 0..4).
pub const GRID_SLOTS: usize = GRID_ROWS as usize * GRID_COLS as usize;

// =============================================================================
// RANKS
// =============================================================================

/// Lowest rank a placed unit can have.
pub const MIN_RANK: u8 = 1;

/// Maxed rank. Units at this rank can no longer be merged.
pub const MAX_RANK: u8 = 7;

/// Rank carried by empty slots.
pub const EMPTY_RANK: u8 = 0;

// =============================================================================
// SENTINEL UNITS
// =============================================================================

/// Unit id of a free slot.
pub const EMPTY_UNIT: &str = "empty";

/// Unit id of a cell whose image could not be read.
pub const UNKNOWN_UNIT: &str = "unknown";

/// File extension of reference assets. Stripped when deriving unit ids.
pub const ASSET_EXTENSION: &str = "png";
