//! # GRIDMERGE Merge Policy
//!
//! Deterministic heuristic that picks at most one merge per cycle.
//!
//! ## Design Principles
//!
//! 1. **One decision per cycle** - combo, protection, priority and fullness
//!    steps run in a fixed order and the first merge found wins
//! 2. **Never fails** - a missing prerequisite skips its step; an empty
//!    board ends in `NoAction`
//! 3. **No I/O** - the policy returns a `MergeAction`, the caller swipes
//! 4. **Reproducible** - "random" picks come from a seeded `ChaCha8Rng`
//!
//! ## Example
//!
//! ```rust,ignore
//! use gridmerge_policy::{Decision, MergePolicy, PolicyConfig};
//!
//! let mut policy = MergePolicy::new(PolicyConfig::default())?;
//! let census = policy.census_for(&grid);
//! if let Decision::Merge(action) = policy.decide(&grid, &census) {
//!     actuator.swipe(action.position_a, action.position_b)?;
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
mod pool;

pub use action::{Decision, MergeAction, MergeReason, NoAction};
pub use config::PolicyConfig;
pub use engine::MergePolicy;
pub use error::{PolicyError, PolicyResult};
