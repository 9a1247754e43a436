//! # Decision Cycle
//!
//! One synchronous pass from screenshot to swipe:
//! ```text
//! Cycle N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. CAPTURE                                                          │
//! │    ├─ 15 cell crops, row-major                                      │
//! │    ├─ grid not visible  -> no cells (all-empty grid)                │
//! │    └─ transport failure -> all-empty grid, report, stop             │
//! │                                                                     │
//! │ 2. PERCEIVE                                                         │
//! │    └─ classify + rank every cell, age against cycle N-1             │
//! │                                                                     │
//! │ 3. CENSUS + DECIDE                                                  │
//! │    └─ merge policy picks at most one merge                          │
//! │                                                                     │
//! │ 4. ACT                                                              │
//! │    └─ swipe position_a onto position_b (fire and forget)            │
//! │                                                                     │
//! │ 5. PUBLISH                                                          │
//! │    ├─ atomic swap of the immutable cycle snapshot                   │
//! │    └─ bot event, stats                                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Capture and actuator failures are returned in the `CycleReport`. The
//! loop never ends on a bad frame; the next cycle starts from scratch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gridmerge_core::{Census, GridState, GridStats, SnapshotCell, SnapshotReader, GRID_SLOTS};
use gridmerge_policy::{Decision, MergeAction, MergePolicy, NoAction};
use gridmerge_vision::Perception;
use tracing::{debug, info, warn};

use crate::config::BotConfig;
use crate::error::{ActuatorError, BotResult, CaptureError};
use crate::events::{self, BotEvent, EventPublisher, EventSubscriber};
use crate::integration::traits::{Actuator, Capture};
use crate::stats::CycleStats;

/// Unknown cells above which recognition is reported as degraded.
pub const UNKNOWN_SLOT_LIMIT: u32 = 5;

/// Uncertain rank estimates above which recognition is reported as degraded.
pub const LOW_CONFIDENCE_LIMIT: u32 = 3;

/// Share of occupied slots under which the board is reported as sparse.
pub const SPARSE_BOARD_UTILIZATION: f32 = 0.3;

/// Something off about a perceived grid. Reported, never acted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecognitionWarning {
    /// More than `UNKNOWN_SLOT_LIMIT` cells matched no reference.
    ManyUnknown(u32),
    /// More than `LOW_CONFIDENCE_LIMIT` ranks are uncertain.
    LowConfidence(u32),
    /// Fewer than `SPARSE_BOARD_UTILIZATION` of the slots are occupied.
    SparseBoard(u32),
}

/// Checks a grid's figures against the recognition limits.
#[must_use]
pub fn recognition_warnings(stats: &GridStats) -> Vec<RecognitionWarning> {
    let mut warnings = Vec::new();
    if stats.unknown_slots > UNKNOWN_SLOT_LIMIT {
        warnings.push(RecognitionWarning::ManyUnknown(stats.unknown_slots));
    }
    if stats.low_confidence > LOW_CONFIDENCE_LIMIT {
        warnings.push(RecognitionWarning::LowConfidence(stats.low_confidence));
    }
    if (stats.total_units as f32) < SPARSE_BOARD_UTILIZATION * GRID_SLOTS as f32 {
        warnings.push(RecognitionWarning::SparseBoard(stats.total_units));
    }
    warnings
}

/// What one cycle saw and decided. Immutable once published.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleSnapshot {
    /// Grid perceived this cycle.
    pub grid: GridState,
    /// Census the policy decided on.
    pub census: Census,
    /// Policy decision; `None` when the capture failed.
    pub decision: Option<Decision>,
}

impl CycleSnapshot {
    /// Snapshot published before the first cycle runs.
    #[must_use]
    pub fn initial() -> Self {
        let grid = GridState::empty(0);
        let census = Census::aggregate(&grid);
        Self {
            grid,
            census,
            decision: None,
        }
    }
}

impl Default for CycleSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}

/// How a cycle ended.
#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// A merge was chosen and the swipe was sent.
    Merged(MergeAction),
    /// The board is saturated; nothing was done.
    Waiting,
    /// No merge for another reason.
    Idle(NoAction),
    /// No screenshot this cycle.
    CaptureFailed(CaptureError),
    /// A merge was chosen but the swipe failed.
    ActuatorFailed {
        /// The undelivered merge.
        action: MergeAction,
        /// Transport error.
        error: ActuatorError,
    },
}

/// Result of `DecisionCycle::run_once`.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleReport {
    /// Cycle number.
    pub cycle: u64,
    /// How the cycle ended.
    pub outcome: CycleOutcome,
    /// Figures over the perceived grid.
    pub grid_stats: GridStats,
    /// Wall time of the cycle.
    pub elapsed: Duration,
}

impl CycleReport {
    /// The issued merge, if the swipe went out.
    #[must_use]
    pub fn merge(&self) -> Option<&MergeAction> {
        match &self.outcome {
            CycleOutcome::Merged(action) => Some(action),
            _ => None,
        }
    }

    /// True when capture or actuator failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.outcome,
            CycleOutcome::CaptureFailed(_) | CycleOutcome::ActuatorFailed { .. }
        )
    }
}

/// The bot's main loop body.
///
/// Owns the transports, perception and policy. Everything a UI needs is
/// published through `latest()` and the event bus.
pub struct DecisionCycle<C, A> {
    /// Screenshot side.
    capture: C,
    /// Swipe side.
    actuator: A,
    /// Cells to grid.
    perception: Perception,
    /// Grid to decision.
    policy: MergePolicy,
    /// Latest published snapshot.
    latest: Arc<SnapshotCell<CycleSnapshot>>,
    /// Snapshot of the previous cycle, for slot ages.
    previous: Option<Arc<CycleSnapshot>>,
    /// Outgoing notifications.
    events: EventPublisher,
    /// Accumulated cycle statistics.
    stats: CycleStats,
    /// Next cycle number.
    cycle: u64,
}

impl<C: Capture, A: Actuator> DecisionCycle<C, A> {
    /// Assembles a cycle from ready-made parts.
    #[must_use]
    pub fn new(capture: C, actuator: A, perception: Perception, policy: MergePolicy, events: EventPublisher) -> Self {
        Self {
            capture,
            actuator,
            perception,
            policy,
            latest: Arc::new(SnapshotCell::new(CycleSnapshot::initial())),
            previous: None,
            events,
            stats: CycleStats::new(),
            cycle: 0,
        }
    }

    /// Loads perception assets and the policy from `config`.
    ///
    /// Returns the cycle and the observer end of its event channel.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config or a missing reference catalog.
    pub fn from_config(config: &BotConfig, capture: C, actuator: A) -> BotResult<(Self, EventSubscriber)> {
        config.validate()?;
        let perception = Perception::load(&config.recognition)?;
        let policy = MergePolicy::new(config.policy.clone())?;
        let (publisher, subscriber) = events::channel(config.cycle.event_capacity);
        Ok((Self::new(capture, actuator, perception, policy, publisher), subscriber))
    }

    /// Runs one capture-to-swipe pass.
    pub fn run_once(&mut self) -> CycleReport {
        let started = Instant::now();
        let cycle = self.cycle;
        self.cycle += 1;

        let cells = match self.capture.capture_cells() {
            Ok(cells) => cells,
            Err(error) => {
                warn!(cycle, %error, "capture failed");
                let grid = GridState::empty(cycle);
                let census = Census::aggregate(&grid);
                let grid_stats = self.publish(CycleSnapshot {
                    grid,
                    census,
                    decision: None,
                });
                self.events.publish(BotEvent::CaptureFailed {
                    cycle,
                    error: error.to_string(),
                });
                return self.finish(cycle, CycleOutcome::CaptureFailed(error), grid_stats, started);
            }
        };

        let grid = self
            .perception
            .perceive(cycle, cells.as_deref(), self.previous.as_deref().map(|s| &s.grid));
        let census = self.policy.census_for(&grid);
        let decision = self.policy.decide(&grid, &census);

        let outcome = match &decision {
            Decision::Merge(action) => match self.actuator.swipe(action.position_a, action.position_b) {
                Ok(()) => {
                    self.events.publish(BotEvent::MergeIssued {
                        cycle,
                        action: action.clone(),
                    });
                    CycleOutcome::Merged(action.clone())
                }
                Err(error) => {
                    warn!(cycle, %error, merge = %action, "swipe failed");
                    self.events.publish(BotEvent::ActuatorFailed {
                        cycle,
                        rank: action.rank,
                        error: error.to_string(),
                    });
                    CycleOutcome::ActuatorFailed {
                        action: action.clone(),
                        error,
                    }
                }
            },
            Decision::NoAction(NoAction::Wait) => {
                self.events.publish(BotEvent::Waiting { cycle });
                CycleOutcome::Waiting
            }
            Decision::NoAction(reason) => {
                self.events.publish(BotEvent::Idle { cycle, reason: *reason });
                CycleOutcome::Idle(*reason)
            }
        };

        let grid_stats = self.publish(CycleSnapshot {
            grid,
            census,
            decision: Some(decision),
        });
        log_recognition(cycle, &grid_stats);
        self.finish(cycle, outcome, grid_stats, started)
    }

    /// Runs `cycles` passes back to back, pausing `interval` between them.
    ///
    /// Logs the accumulated statistics when done.
    pub fn run(&mut self, cycles: u64, interval: Duration) -> Vec<CycleReport> {
        info!(cycles, interval_ms = interval.as_millis(), "decision loop started");
        let mut reports = Vec::new();
        for i in 0..cycles {
            if i > 0 && !interval.is_zero() {
                std::thread::sleep(interval);
            }
            reports.push(self.run_once());
        }
        self.stats.log_summary();
        reports
    }

    /// Re-reads the reference catalog after a deck change.
    ///
    /// # Errors
    ///
    /// Fails if the catalog cannot be reloaded; the old one stays active.
    pub fn reload_catalog(&mut self) -> BotResult<()> {
        self.perception.reload_catalog()?;
        Ok(())
    }

    /// Full screenshot from the capture transport.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    pub fn screenshot(&mut self) -> Result<image::RgbImage, CaptureError> {
        self.capture.capture_screen()
    }

    /// The published snapshot cell, for sharing with other threads.
    #[must_use]
    pub fn latest(&self) -> Arc<SnapshotCell<CycleSnapshot>> {
        Arc::clone(&self.latest)
    }

    /// A reader over the published snapshots.
    #[must_use]
    pub fn reader(&self) -> SnapshotReader<CycleSnapshot> {
        self.latest.reader()
    }

    /// Accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Number of cycles run so far.
    #[inline]
    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.cycle
    }

    /// The merge policy.
    #[must_use]
    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    /// Mutable access to the transports.
    pub fn transports_mut(&mut self) -> (&mut C, &mut A) {
        (&mut self.capture, &mut self.actuator)
    }

    fn publish(&mut self, snapshot: CycleSnapshot) -> GridStats {
        let stats = snapshot
            .grid
            .stats(self.perception.estimator().threshold());
        let snapshot = Arc::new(snapshot);
        self.latest.publish_arc(Arc::clone(&snapshot));
        self.previous = Some(snapshot);
        stats
    }

    fn finish(&mut self, cycle: u64, outcome: CycleOutcome, grid_stats: GridStats, started: Instant) -> CycleReport {
        let report = CycleReport {
            cycle,
            outcome,
            grid_stats,
            elapsed: started.elapsed(),
        };
        self.stats.record(&report);
        self.stats.events_dropped = self.events.dropped();
        debug!(
            cycle,
            units = grid_stats.total_units,
            empty = grid_stats.empty_slots,
            unknown = grid_stats.unknown_slots,
            low_confidence = grid_stats.low_confidence,
            elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
            "cycle complete"
        );
        report
    }
}

fn log_recognition(cycle: u64, stats: &GridStats) {
    for warning in recognition_warnings(stats) {
        match warning {
            RecognitionWarning::ManyUnknown(count) => {
                warn!(cycle, unknown = count, "many unrecognized cells, check the reference catalog");
            }
            RecognitionWarning::LowConfidence(count) => {
                warn!(cycle, low_confidence = count, "rank estimates are uncertain");
            }
            RecognitionWarning::SparseBoard(count) => {
                debug!(cycle, units = count, "board sparsely occupied");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total_units: u32, unknown_slots: u32, low_confidence: u32) -> GridStats {
        GridStats {
            total_units,
            empty_slots: GRID_SLOTS as u32 - total_units,
            unknown_slots,
            mean_age: 0.0,
            low_confidence,
        }
    }

    #[test]
    fn test_clean_full_board_has_no_warnings() {
        assert!(recognition_warnings(&stats(12, 5, 3)).is_empty());
    }

    #[test]
    fn test_recognition_limits() {
        assert_eq!(
            recognition_warnings(&stats(10, 6, 4)),
            vec![RecognitionWarning::ManyUnknown(6), RecognitionWarning::LowConfidence(4)]
        );
        // 4 of 15 occupied is under 30%, 5 is not
        assert_eq!(
            recognition_warnings(&stats(4, 0, 0)),
            vec![RecognitionWarning::SparseBoard(4)]
        );
        assert!(recognition_warnings(&stats(5, 0, 0)).is_empty());
    }
}
