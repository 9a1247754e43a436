//! Running counters over decision cycles.

use std::collections::BTreeMap;
use std::time::Duration;

use gridmerge_policy::MergeReason;
use tracing::info;

use crate::cycle::{CycleOutcome, CycleReport};

/// Cycles slower than this are counted as over budget.
pub const CYCLE_BUDGET: Duration = Duration::from_millis(500);

/// Accumulator for cycle statistics.
#[derive(Clone, Debug)]
pub struct CycleStats {
    /// Total cycles recorded.
    pub cycles: u64,
    /// Merges issued, by policy step.
    pub merges: BTreeMap<MergeReason, u64>,
    /// Cycles that ended in a saturation wait.
    pub waits: u64,
    /// Cycles with nothing to merge or room left.
    pub idles: u64,
    /// Cycles without a screenshot.
    pub capture_failures: u64,
    /// Merges whose swipe failed.
    pub actuator_failures: u64,
    /// Sum of cycle durations.
    pub total_us_sum: u64,
    /// Min cycle duration.
    pub min_cycle_us: u64,
    /// Max cycle duration.
    pub max_cycle_us: u64,
    /// Cycles slower than `CYCLE_BUDGET`.
    pub cycles_over_budget: u64,
    /// Events the observers never saw because their channel was full.
    pub events_dropped: u64,
}

impl CycleStats {
    /// Creates a new accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cycles: 0,
            merges: BTreeMap::new(),
            waits: 0,
            idles: 0,
            capture_failures: 0,
            actuator_failures: 0,
            total_us_sum: 0,
            min_cycle_us: u64::MAX,
            max_cycle_us: 0,
            cycles_over_budget: 0,
            events_dropped: 0,
        }
    }

    /// Records one cycle.
    pub fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        match &report.outcome {
            CycleOutcome::Merged(action) => {
                *self.merges.entry(action.reason).or_insert(0) += 1;
            }
            CycleOutcome::Waiting => self.waits += 1,
            CycleOutcome::Idle(_) => self.idles += 1,
            CycleOutcome::CaptureFailed(_) => self.capture_failures += 1,
            CycleOutcome::ActuatorFailed { .. } => self.actuator_failures += 1,
        }

        let us = u64::try_from(report.elapsed.as_micros()).unwrap_or(u64::MAX);
        self.total_us_sum = self.total_us_sum.saturating_add(us);
        self.min_cycle_us = self.min_cycle_us.min(us);
        self.max_cycle_us = self.max_cycle_us.max(us);
        if report.elapsed > CYCLE_BUDGET {
            self.cycles_over_budget += 1;
        }
    }

    /// Merges issued for one reason.
    #[must_use]
    pub fn merges_for(&self, reason: MergeReason) -> u64 {
        self.merges.get(&reason).copied().unwrap_or(0)
    }

    /// Merges issued overall.
    #[must_use]
    pub fn total_merges(&self) -> u64 {
        self.merges.values().sum()
    }

    /// Returns average cycle time in milliseconds.
    #[must_use]
    pub fn avg_cycle_ms(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.cycles as f64) / 1000.0
    }

    /// Share of cycles that delivered a merge.
    #[must_use]
    pub fn merge_ratio(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        self.total_merges() as f64 / self.cycles as f64
    }

    /// Non-zero merge counts as `tag=count` pairs, in pipeline order.
    #[must_use]
    pub fn reason_breakdown(&self) -> String {
        MergeReason::ALL
            .into_iter()
            .filter_map(|reason| match self.merges_for(reason) {
                0 => None,
                n => Some(format!("{}={n}", reason.tag())),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Logs a one-line summary at info level.
    pub fn log_summary(&self) {
        let min_ms = if self.cycles == 0 { 0.0 } else { self.min_cycle_us as f64 / 1000.0 };
        info!(
            cycles = self.cycles,
            merges = self.total_merges(),
            by_reason = %self.reason_breakdown(),
            waits = self.waits,
            idles = self.idles,
            capture_failures = self.capture_failures,
            actuator_failures = self.actuator_failures,
            events_dropped = self.events_dropped,
            avg_ms = self.avg_cycle_ms(),
            min_ms,
            max_ms = self.max_cycle_us as f64 / 1000.0,
            over_budget = self.cycles_over_budget,
            "cycle summary"
        );
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}
