//! Error types for the relocation harness

use thiserror::Error;

use crate::driver::Anomaly;
use crate::point::{Identity, Point};

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, RelocationError>;

/// Error types that can occur while building, updating or checking an index
#[derive(Error, Debug)]
pub enum RelocationError {
    #[error("Consistency error: no bucket at old coordinate {old} for identity {id}")]
    Consistency { id: Identity, old: Point },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid point: {reason}")]
    InvalidPoint { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invariant violated: {0}")]
    InvariantViolated(Anomaly),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl RelocationError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        RelocationError::InvalidConfig {
            reason: reason.into(),
        }
    }
}
