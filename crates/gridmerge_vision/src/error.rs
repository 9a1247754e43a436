//! # Vision Error Types
//!
//! Errors raised while loading perception assets.
//!
//! Per-cell classification never returns these; an unreadable cell becomes
//! `unknown` and the cycle goes on.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while setting up perception.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisionError {
    /// Filesystem access failed.
    #[error("i/o error at {path}: {reason}")]
    Io {
        /// File or directory involved.
        path: String,
        /// Underlying error message.
        reason: String,
    },

    /// An asset could not be decoded as an image.
    #[error("cannot decode image {path}: {reason}")]
    Decode {
        /// Offending file.
        path: String,
        /// Decoder message.
        reason: String,
    },

    /// Rank model file is not valid TOML or has the wrong layout.
    #[error("invalid rank model: {0}")]
    InvalidModel(String),

    /// Too few unit assets were copied into the active deck.
    #[error("deck too small: copied {copied}, need at least {required}")]
    DeckTooSmall {
        /// Assets actually copied.
        copied: usize,
        /// Minimum deck size.
        required: usize,
    },

    /// The reference catalog holds no usable references.
    #[error("reference catalog at {0} is empty")]
    EmptyCatalog(String),
}

impl VisionError {
    /// Wraps an I/O error with the path it happened at.
    #[must_use]
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    /// Wraps an image decoding error.
    #[must_use]
    pub fn decode(path: &Path, err: &image::ImageError) -> Self {
        Self::Decode {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result alias for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;
