//! Error taxonomy
//!
//! Validation and storage failures are surfaced to callers. Analysis engine
//! failures never leave the dispatcher: they are absorbed into a local fallback.

use std::time::Duration;

use thiserror::Error;

/// Bad input shape or values; user-correctable
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    EmptyField(&'static str),

    #[error("quantity must be non-negative, got {0}")]
    NegativeQuantity(f64),

    #[error("quantity must be a finite number")]
    NonFiniteQuantity,

    #[error("limit must be a positive integer")]
    ZeroLimit,
}

/// Persistence medium unavailable or corrupt
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record log corrupted at line {line}: {reason}")]
    Corrupted { line: usize, reason: String },

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the external analysis engine
#[derive(Debug, Error)]
pub enum AnalysisEngineError {
    #[error("failed to start analysis engine: {0}")]
    Spawn(std::io::Error),

    #[error("analysis engine timed out after {0:?}")]
    Timeout(Duration),

    #[error("analysis engine exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },

    #[error("analysis engine returned malformed output: {0}")]
    Malformed(String),

    #[error("IO error talking to analysis engine: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the feeding service
#[derive(Debug, Error)]
pub enum FeedingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FeedingError {
    pub fn is_validation(&self) -> bool {
        matches!(self, FeedingError::Validation(_))
    }
}

/// Result type for record store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for feeding service operations
pub type FeedingResult<T> = Result<T, FeedingError>;
