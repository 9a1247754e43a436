//! # Bot Error Types
//!
//! Failures at the edges of the decision cycle.
//!
//! Capture and actuator errors never abort the loop. The cycle turns them
//! into a `CycleReport` and the next cycle starts from a fresh capture.

use std::path::Path;

use gridmerge_policy::PolicyError;
use gridmerge_vision::VisionError;
use thiserror::Error;

/// Screenshot acquisition failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The device or transport is gone.
    #[error("capture device disconnected: {0}")]
    Disconnected(String),

    /// The transport answered with bytes that are not a screenshot.
    #[error("bad screenshot: {0}")]
    Screencap(#[from] ScreencapError),

    /// Anything else the transport reports.
    #[error("capture failed: {0}")]
    Transport(String),
}

/// A swipe could not be delivered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// The device or transport is gone.
    #[error("input device disconnected: {0}")]
    Disconnected(String),

    /// Anything else the transport reports.
    #[error("swipe failed: {0}")]
    Transport(String),
}

/// Raw framebuffer bytes could not be decoded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreencapError {
    /// Fewer bytes than the smallest header.
    #[error("screencap truncated: {len} bytes")]
    Truncated {
        /// Bytes received.
        len: usize,
    },

    /// Header dimensions do not match the payload size.
    #[error("screencap payload mismatch: {width}x{height} needs {expected} bytes, got {actual}")]
    PayloadMismatch {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Payload bytes required by the header.
        expected: usize,
        /// Payload bytes available.
        actual: usize,
    },

    /// Pixel format other than RGBA_8888 / RGBX_8888.
    #[error("unsupported screencap pixel format {0}")]
    UnsupportedFormat(u32),

    /// Zero width or height.
    #[error("empty screencap {width}x{height}")]
    Empty {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
}

/// The bot configuration could not be loaded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("cannot read config {path}: {reason}")]
    Io {
        /// Config file path.
        path: String,
        /// Underlying error message.
        reason: String,
    },

    /// Not valid TOML, or a field has the wrong type.
    #[error("cannot parse config: {0}")]
    Parse(String),

    /// `[policy]` failed validation.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// A value outside `[policy]` is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Wraps an I/O error with the path it happened at.
    #[must_use]
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Startup failed: bad config or missing perception assets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BotError {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Perception assets could not be loaded.
    #[error(transparent)]
    Vision(#[from] VisionError),

    /// Policy rejected its configuration.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Result alias for bot startup.
pub type BotResult<T> = Result<T, BotError>;
