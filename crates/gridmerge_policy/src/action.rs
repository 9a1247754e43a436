//! Decisions produced by the merge policy.

use std::fmt;

use gridmerge_core::{GridPos, Rank, UnitId};

/// Which policy step produced a merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MergeReason {
    /// Harlequin or the DPS unit fed into a same-rank dryad combo.
    DryadCombo,
    /// Harlequin copied the DPS unit.
    HarlequinCopy,
    /// Harlequin copied a knight statue to restore an even count.
    KnightParity,
    /// A priority unit pair.
    Priority,
    /// Board nearly full, merged at the target rank.
    TargetRank,
    /// Board nearly full, nothing at the target rank, merged higher.
    HighLevel,
}

impl MergeReason {
    /// Every reason, in pipeline order.
    pub const ALL: [MergeReason; 6] = [
        Self::DryadCombo,
        Self::HarlequinCopy,
        Self::KnightParity,
        Self::Priority,
        Self::TargetRank,
        Self::HighLevel,
    ];

    /// Short stable tag for logs and stats.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::DryadCombo => "dryad_combo",
            Self::HarlequinCopy => "harlequin_copy",
            Self::KnightParity => "knight_parity",
            Self::Priority => "priority",
            Self::TargetRank => "target_rank",
            Self::HighLevel => "high_level",
        }
    }
}

impl fmt::Display for MergeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Swipe `position_a` onto `position_b`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeAction {
    /// Slot dragged from.
    pub position_a: GridPos,
    /// Slot dropped onto.
    pub position_b: GridPos,
    /// Unit at `position_a`.
    pub unit_a: UnitId,
    /// Unit at `position_b`.
    pub unit_b: UnitId,
    /// Shared rank of both units.
    pub rank: Rank,
    /// Policy step that chose this merge.
    pub reason: MergeReason,
}

impl fmt::Display for MergeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rank {} {} -> {}", self.rank, self.unit_a, self.unit_b)
    }
}

/// Why the policy chose not to merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoAction {
    /// The board is saturated with demon hunters; hold off.
    Wait,
    /// The board still has room; let more units spawn.
    NeedMoreUnits,
    /// The board is nearly full but no pair qualifies.
    NothingToMerge,
}

impl NoAction {
    /// Human readable reason.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::NeedMoreUnits => "need more units",
            Self::NothingToMerge => "nothing to merge",
        }
    }
}

impl fmt::Display for NoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Outcome of one policy run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Execute this merge.
    Merge(MergeAction),
    /// Do nothing this cycle.
    NoAction(NoAction),
}

impl Decision {
    /// The merge, if any.
    #[must_use]
    pub fn merge(&self) -> Option<&MergeAction> {
        match self {
            Self::Merge(action) => Some(action),
            Self::NoAction(_) => None,
        }
    }

    /// True for a wait signal.
    #[must_use]
    pub fn is_wait(&self) -> bool {
        matches!(self, Self::NoAction(NoAction::Wait))
    }
}
