//! # Snapshot Publication
//!
//! The decision cycle runs on one worker thread. Anything else (a UI
//! poller, a stats reporter) only ever sees the latest *finished* cycle.
//!
//! ```text
//! Worker:   build GridState ──► publish(Arc) ──► build next ...
//!                                   │
//! Readers:              load() ◄────┘  (clone of the Arc, never a borrow)
//! ```
//!
//! Published values are immutable. A reader holding an old `Arc` keeps a
//! consistent view even while the worker publishes newer ones.

mod snapshot;

pub use snapshot::{SnapshotCell, SnapshotReader};
