//! # GRIDMERGE Vision
//!
//! Perception for the merge bot: screenshot crops in, `GridState` out.
//!
//! ## Design Principles
//!
//! 1. **Ambiguity is absorbed** - an unreadable cell is `unknown`, an
//!    unmatched one is `empty`; neither fails the cycle
//! 2. **Independent cells** - each of the 15 cells is classified on its own,
//!    so the pipeline can fan out over rayon
//! 3. **Static assets** - catalog and rank model load once; a deck change
//!    reloads the catalog explicitly
//! 4. **Age over trust** - a slot's age, not a single frame, tells the
//!    policy how stable a reading is
//!
//! ## Example
//!
//! ```rust,ignore
//! use gridmerge_vision::{GridLayout, Perception, RecognitionConfig};
//!
//! let perception = Perception::load(&RecognitionConfig::default())?;
//! let cells = GridLayout::default().crop_cells(&screenshot);
//! let grid = perception.perceive(cycle, cells.as_deref(), previous.as_ref());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod builder;
pub mod catalog;
pub mod classifier;
pub mod color;
pub mod config;
pub mod deck;
pub mod error;
pub mod features;
pub mod layout;
pub mod pipeline;
pub mod rank;
pub mod template;

pub use builder::{build_grid, next_age, CellResult};
pub use catalog::{ReferenceCatalog, UnitReference};
pub use classifier::{CellClassifier, Classification, DEFAULT_MSE_THRESHOLD};
pub use config::RecognitionConfig;
pub use deck::{activate_deck, MIN_DECK_SIZE};
pub use error::{VisionError, VisionResult};
pub use features::{RankFeatures, FEATURE_COUNT};
pub use layout::GridLayout;
pub use pipeline::Perception;
pub use rank::{RankEstimate, RankEstimator, RankModel, DEFAULT_RANK_CONFIDENCE};
pub use template::{correlation, prepare_template, TEMPLATE_SIZE};
