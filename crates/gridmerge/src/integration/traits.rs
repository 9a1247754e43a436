//! # Integration Traits
//!
//! What a device transport must provide for the bot to run on it.
//!
//! All calls are synchronous and already resolved when they return.
//! Retries and reconnects belong to the implementation, not the cycle.

use std::time::Duration;

use gridmerge_core::GridPos;
use image::RgbImage;

use crate::error::{ActuatorError, CaptureError};

// ============================================================================
// GRID LEVEL - consumed by the decision cycle
// ============================================================================

/// Supplies the battle grid as cell images.
pub trait Capture: Send {
    /// The 15 cell crops in row-major order.
    ///
    /// `Ok(None)` means the screenshot succeeded but the grid is not on
    /// screen; the cycle then builds an all-empty grid. `Err` means no
    /// screenshot at all.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError` when the transport fails.
    fn capture_cells(&mut self) -> Result<Option<Vec<RgbImage>>, CaptureError>;

    /// The full screen, on demand.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError` when the transport fails.
    fn capture_screen(&mut self) -> Result<RgbImage, CaptureError>;
}

/// Drags one grid slot onto another.
pub trait Actuator: Send {
    /// Swipes from `from` to `to`.
    ///
    /// Fire and forget: `Ok` means the gesture was sent, not that the game
    /// registered a merge. The next cycle's grid confirms it.
    ///
    /// # Errors
    ///
    /// Returns `ActuatorError` when the gesture could not be sent.
    fn swipe(&mut self, from: GridPos, to: GridPos) -> Result<(), ActuatorError>;
}

// ============================================================================
// SCREEN LEVEL - implemented by transports
// ============================================================================

/// Produces full screenshots.
pub trait ScreenSource: Send {
    /// Takes a screenshot.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError` when the transport fails.
    fn screenshot(&mut self) -> Result<RgbImage, CaptureError>;
}

/// Sends raw touch gestures in screen pixels.
pub trait TouchInput: Send {
    /// Swipes between two screen points over `duration`.
    ///
    /// # Errors
    ///
    /// Returns `ActuatorError` when the gesture could not be sent.
    fn swipe(&mut self, from: (u32, u32), to: (u32, u32), duration: Duration) -> Result<(), ActuatorError>;
}

impl<C: Capture + ?Sized> Capture for Box<C> {
    fn capture_cells(&mut self) -> Result<Option<Vec<RgbImage>>, CaptureError> {
        (**self).capture_cells()
    }

    fn capture_screen(&mut self) -> Result<RgbImage, CaptureError> {
        (**self).capture_screen()
    }
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn swipe(&mut self, from: GridPos, to: GridPos) -> Result<(), ActuatorError> {
        (**self).swipe(from, to)
    }
}
