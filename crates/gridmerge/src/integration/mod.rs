//! # Device Integration
//!
//! The decision cycle talks to the device through two traits only.
//!
//! ```text
//!                 ┌──────────────┐   ScreenCapture<S>   ┌──────────────┐
//!   Capture  ←─── │ ScreenSource │ ←── crop by layout ──│  raw bytes / │
//!                 └──────────────┘                      │  mirroring   │
//!                 ┌──────────────┐   TouchActuator<T>   │  client ...  │
//!   Actuator ←─── │  TouchInput  │ ←── cell centers  ───│              │
//!                 └──────────────┘                      └──────────────┘
//! ```
//!
//! Transports implement `ScreenSource` / `TouchInput` in screen pixels;
//! the adapters here turn them into grid-level `Capture` / `Actuator`.
//! Which transport runs is a startup choice, the cycle never knows.

pub mod actuator;
pub mod capture;
pub mod traits;

pub use actuator::TouchActuator;
pub use capture::ScreenCapture;
pub use traits::{Actuator, Capture, ScreenSource, TouchInput};
