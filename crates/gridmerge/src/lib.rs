//! # GRIDMERGE
//!
//! The merge bot: perception, policy and device I/O in one loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            DECISION CYCLE                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐   │
//! │  │   Capture       │────>│   Vision        │────>│   Policy        │   │
//! │  │                 │     │                 │     │                 │   │
//! │  │  • Screenshot   │     │  • Classify     │     │  • Census       │   │
//! │  │  • Crop cells   │     │  • Rank         │     │  • Combos       │   │
//! │  │                 │     │  • Age          │     │  • Protection   │   │
//! │  └─────────────────┘     └─────────────────┘     └────────┬────────┘   │
//! │                                                           │            │
//! │  ┌─────────────────┐     ┌─────────────────┐              │            │
//! │  │   Observers     │<────│   Snapshot +    │<─────────────┤            │
//! │  │   (UI, logs)    │     │   Event bus     │              v            │
//! │  └─────────────────┘     └─────────────────┘     ┌─────────────────┐   │
//! │                                                  │   Actuator      │   │
//! │                                                  │   (swipe)       │   │
//! │                                                  └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML bot configuration
//! - `cycle`: One capture-to-swipe pass and snapshot publication
//! - `events`: Bot event channel
//! - `integration`: Capture/Actuator traits and transport adapters
//! - `screencap`: Raw framebuffer decoding
//! - `stats`: Cycle statistics

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod cycle;
pub mod error;
pub mod events;
pub mod integration;
pub mod screencap;
pub mod stats;

// Re-export the units
pub use gridmerge_core as grid;
pub use gridmerge_policy as policy;
pub use gridmerge_vision as vision;

// Re-export commonly used types
pub use config::{BotConfig, CycleConfig, LayoutConfig};
pub use cycle::{recognition_warnings, CycleOutcome, CycleReport, CycleSnapshot, DecisionCycle, RecognitionWarning};
pub use error::{ActuatorError, BotError, BotResult, CaptureError, ConfigError, ScreencapError};
pub use events::{BotEvent, EventPublisher, EventSubscriber};
pub use integration::{Actuator, Capture, ScreenCapture, ScreenSource, TouchActuator, TouchInput};
pub use screencap::{decode_screencap, RawScreencap};
pub use stats::CycleStats;
