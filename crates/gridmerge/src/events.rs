//! # Bot Events
//!
//! One-way notifications from the decision cycle to whoever watches it.
//!
//! ```text
//! DecisionCycle ── EventPublisher ──[ bounded ]── EventSubscriber ── UI / log
//!                        │
//!                        └─ dropped counter (channel full)
//! ```
//!
//! The cycle never blocks on an observer. When the channel is full the
//! event is discarded and counted; `CycleStats` reports the count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use gridmerge_core::Rank;
use gridmerge_policy::{MergeAction, NoAction};

/// Default channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// What happened in a decision cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum BotEvent {
    // =========================================================================
    // Decisions
    // =========================================================================
    /// A merge was chosen and the swipe was sent.
    MergeIssued {
        /// Cycle number.
        cycle: u64,
        /// The merge.
        action: MergeAction,
    },

    /// The board is saturated; the policy holds off.
    Waiting {
        /// Cycle number.
        cycle: u64,
    },

    /// No merge this cycle for a reason other than saturation.
    Idle {
        /// Cycle number.
        cycle: u64,
        /// Why nothing was merged.
        reason: NoAction,
    },

    // =========================================================================
    // Failures
    // =========================================================================
    /// No screenshot this cycle.
    CaptureFailed {
        /// Cycle number.
        cycle: u64,
        /// Transport error message.
        error: String,
    },

    /// A merge was chosen but the swipe failed.
    ActuatorFailed {
        /// Cycle number.
        cycle: u64,
        /// Rank of the merge that was not delivered.
        rank: Rank,
        /// Transport error message.
        error: String,
    },
}

impl BotEvent {
    /// Cycle the event belongs to.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        match self {
            Self::MergeIssued { cycle, .. }
            | Self::Waiting { cycle }
            | Self::Idle { cycle, .. }
            | Self::CaptureFailed { cycle, .. }
            | Self::ActuatorFailed { cycle, .. } => *cycle,
        }
    }

    /// The delivered merge, if this event reports one.
    #[must_use]
    pub fn merge(&self) -> Option<&MergeAction> {
        match self {
            Self::MergeIssued { action, .. } => Some(action),
            _ => None,
        }
    }

    /// True for transport failures.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::CaptureFailed { .. } | Self::ActuatorFailed { .. })
    }
}

/// Opens a bounded event channel holding at most `capacity` undelivered events.
#[must_use]
pub fn channel(capacity: usize) -> (EventPublisher, EventSubscriber) {
    let (sender, receiver) = bounded(capacity);
    (
        EventPublisher {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        EventSubscriber { receiver },
    )
}

/// Cycle side of the channel.
#[derive(Clone, Debug)]
pub struct EventPublisher {
    sender: Sender<BotEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventPublisher {
    /// Publishes without blocking.
    ///
    /// Returns `false` when the event was not delivered. Events lost to a
    /// full channel are counted in `dropped`; with no subscriber left
    /// nothing is counted.
    pub fn publish(&self, event: BotEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(cycle = event.cycle(), "event channel full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Events discarded because the channel was full.
    #[inline]
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Observer side of the channel. Clones share one queue.
#[derive(Clone, Debug)]
pub struct EventSubscriber {
    receiver: Receiver<BotEvent>,
}

impl EventSubscriber {
    /// Takes every pending event, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<BotEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes the oldest pending event.
    #[inline]
    #[must_use]
    pub fn try_next(&self) -> Option<BotEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}
