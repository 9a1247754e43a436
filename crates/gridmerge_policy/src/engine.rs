//! # Merge Policy Engine
//!
//! Turns one grid and its census into at most one merge.
//!
//! ## Pipeline
//!
//! ```text
//!  1. pool = census series - {empty, unknown}
//!  2. dryad combos (harlequin+dryad, dryad+dps), harlequin copies dps  ─► merge
//!  3. demon hunter saturation                                          ─► wait
//!  4. hold back 1 chemist (highest), 4 cauldrons (lowest)
//!  5. odd knight statues: harlequin copies one                         ─► merge
//!     hold back 2 knight statues (highest)
//!  6. narrow: count >= 2, rank < 7
//!  7. priority units + dps                                             ─► merge
//!  8. <= 2 empty slots: target rank, else high-level fallback          ─► merge
//!  9. need more units
//! ```
//!
//! Combo merges run before narrowing because narrowing drops the single
//! catalysts they need. Holding back protected units before narrowing keeps
//! them out of every random pick.
//!
//! The engine performs no I/O. The caller executes the returned action.

use gridmerge_core::unit::names;
use gridmerge_core::{Census, GridPos, GridState, Rank, UnitId, UnitSeries, MAX_RANK};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::action::{Decision, MergeAction, MergeReason, NoAction};
use crate::config::PolicyConfig;
use crate::error::PolicyResult;
use crate::pool::MergePool;

/// Cauldrons always kept on the board.
const CAULDRON_RESERVE: usize = 4;

/// Chemists always kept on the board.
const CHEMIST_RESERVE: usize = 1;

/// Knight statues always kept on the board.
const KNIGHT_RESERVE: usize = 2;

/// Empty slots at or below which the board counts as full.
const FULL_BOARD_EMPTY_SLOTS: u32 = 2;

/// Lowest rank the high-level fallback protects.
const HIGH_LEVEL_MIN_RANK: Rank = 3;

/// Stateful merge policy: config plus a seeded RNG.
#[derive(Clone, Debug)]
pub struct MergePolicy {
    config: PolicyConfig,
    rng: ChaCha8Rng,
}

impl MergePolicy {
    /// Validates `config` and seeds the RNG from it.
    ///
    /// # Errors
    ///
    /// `PolicyError::InvalidConfig` if the config does not validate.
    pub fn new(config: PolicyConfig) -> PolicyResult<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self { config, rng })
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Census of `grid` as this policy wants it (honours `min_age`).
    #[must_use]
    pub fn census_for(&self, grid: &GridState) -> Census {
        Census::aggregate_with_min_age(grid, self.config.min_age)
    }

    /// Runs the pipeline once.
    ///
    /// Never fails: missing prerequisites skip their step, and an empty or
    /// inconsistent census ends in a `NoAction`.
    pub fn decide(&mut self, grid: &GridState, census: &Census) -> Decision {
        let mut pool = MergePool::from_census(census);
        let dps = self.config.dps_unit.clone();

        if let Some(action) = self.dryad_combo(grid, pool.series(), &dps) {
            return Self::issue(action);
        }

        if self.config.dps_is_demon_hunter() {
            if let Some(action) = self.harlequin_copy(grid, pool.series(), &dps, MergeReason::HarlequinCopy) {
                return Self::issue(action);
            }
            // Every demon hunter on the board counts here, whatever its age
            let hunters = census.unit_count(names::DEMON_HUNTER);
            if hunters >= self.config.saturation_threshold {
                warn!(hunters, cycle = grid.cycle(), "board full of demon hunters, waiting");
                return Decision::NoAction(NoAction::Wait);
            }
            if self.config.require_shaman {
                pool.strip(names::DEMON_HUNTER);
            }
        }

        pool.protect(names::CHEMIST, CHEMIST_RESERVE, false);
        pool.protect(names::CAULDRON, CAULDRON_RESERVE, true);

        if pool.series().total_for(names::KNIGHT_STATUE) % 2 == 1 {
            let knight = UnitId::new(names::KNIGHT_STATUE);
            if let Some(action) = self.harlequin_copy(grid, pool.series(), &knight, MergeReason::KnightParity) {
                return Self::issue(action);
            }
            debug!("odd knight statue count, no harlequin to copy one");
        }
        pool.protect(names::KNIGHT_STATUE, KNIGHT_RESERVE, false);

        pool.narrow();

        let mut priority = self.config.priority_units.clone();
        priority.push(dps.clone());
        let candidates = pool.series().select_units(priority.as_slice());
        if let Some(action) = self.merge_random(grid, &candidates, MergeReason::Priority) {
            return Self::issue(action);
        }

        if census.empty_slots() <= FULL_BOARD_EMPTY_SLOTS {
            let low = pool.series().select_ranks(&[self.config.target_rank]);
            if let Some(action) = self.merge_random(grid, &low, MergeReason::TargetRank) {
                return Self::issue(action);
            }

            let mut guarded = self.config.protected_units.clone();
            guarded.push(dps);
            let high_ranks: Vec<Rank> = (HIGH_LEVEL_MIN_RANK..=MAX_RANK).collect();
            let high = pool.series().filter_by(Some(guarded.as_slice()), Some(high_ranks.as_slice()), true);
            if let Some(action) = self.merge_random(grid, &high, MergeReason::HighLevel) {
                return Self::issue(action);
            }
            debug!(cycle = grid.cycle(), "board full, nothing left to merge");
            return Decision::NoAction(NoAction::NothingToMerge);
        }

        debug!(cycle = grid.cycle(), empty = census.empty_slots(), "need more units");
        Decision::NoAction(NoAction::NeedMoreUnits)
    }

    /// Same-rank harlequin+dryad first, then dryad+dps, lowest rank first.
    fn dryad_combo(&mut self, grid: &GridState, series: &UnitSeries, dps: &UnitId) -> Option<MergeAction> {
        for rank in series.ranks_of(names::DRYAD) {
            if series.get(names::HARLEQUIN, rank) > 0 {
                let action = self.merge_across(grid, names::HARLEQUIN, names::DRYAD, rank, MergeReason::DryadCombo);
                if action.is_some() {
                    return action;
                }
            }
            if *dps != names::DRYAD && series.get(dps.as_str(), rank) > 0 {
                let action = self.merge_across(grid, names::DRYAD, dps.as_str(), rank, MergeReason::DryadCombo);
                if action.is_some() {
                    return action;
                }
            }
        }
        None
    }

    /// Harlequin dragged onto a same-rank `target`, lowest rank first.
    fn harlequin_copy(
        &mut self,
        grid: &GridState,
        series: &UnitSeries,
        target: &UnitId,
        reason: MergeReason,
    ) -> Option<MergeAction> {
        if *target == names::HARLEQUIN {
            return None;
        }
        for rank in series.ranks_of(names::HARLEQUIN) {
            if series.get(target.as_str(), rank) > 0 {
                let action = self.merge_across(grid, names::HARLEQUIN, target.as_str(), rank, reason);
                if action.is_some() {
                    return action;
                }
            }
        }
        None
    }

    /// One random `special` dragged onto one random `normal`, both at `rank`.
    fn merge_across(
        &mut self,
        grid: &GridState,
        special: &str,
        normal: &str,
        rank: Rank,
        reason: MergeReason,
    ) -> Option<MergeAction> {
        let from = *self.candidates(grid, special, rank).choose(&mut self.rng)?;
        let to = *self.candidates(grid, normal, rank).choose(&mut self.rng)?;
        Some(MergeAction {
            position_a: from,
            position_b: to,
            unit_a: UnitId::new(special),
            unit_b: UnitId::new(normal),
            rank,
            reason,
        })
    }

    /// Two random instances of one random entry of `series`.
    fn merge_random(&mut self, grid: &GridState, series: &UnitSeries, reason: MergeReason) -> Option<MergeAction> {
        let mut entries: Vec<(UnitId, Rank)> = series
            .iter()
            .filter(|(_, count)| *count >= 2)
            .map(|(key, _)| (key.unit.clone(), key.rank))
            .collect();
        entries.shuffle(&mut self.rng);

        for (unit, rank) in entries {
            let positions = self.candidates(grid, unit.as_str(), rank);
            let pair: Vec<GridPos> = positions.choose_multiple(&mut self.rng, 2).copied().collect();
            if let [a, b] = pair[..] {
                return Some(MergeAction {
                    position_a: a,
                    position_b: b,
                    unit_a: unit.clone(),
                    unit_b: unit,
                    rank,
                    reason,
                });
            }
        }
        None
    }

    /// Positions of `(unit, rank)` old enough to be trusted.
    fn candidates(&self, grid: &GridState, unit: &str, rank: Rank) -> Vec<GridPos> {
        grid.iter()
            .filter(|s| s.rank == rank && s.age >= self.config.min_age && s.unit == unit)
            .map(|s| s.pos)
            .collect()
    }

    fn issue(action: MergeAction) -> Decision {
        log_merge(&action);
        Decision::Merge(action)
    }
}

/// Logs a merge, louder for higher ranks.
fn log_merge(action: &MergeAction) {
    let (a, b, reason) = (action.position_a, action.position_b, action.reason.tag());
    if action.rank > 4 {
        warn!(%a, %b, reason, "{action}");
    } else if action.rank > 2 {
        debug!(%a, %b, reason, "{action}");
    } else {
        info!(%a, %b, reason, "{action}");
    }
}
