//! # Policy Error Types
//!
//! The policy itself never fails at decision time; errors only come from
//! validating its configuration.

use thiserror::Error;

/// Errors that can occur in the policy system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Invalid policy configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
