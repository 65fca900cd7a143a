//! Error types for lumen-probe-core operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading schemas or resolving user input
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid schema {path:?}: {reason}")]
    InvalidSchema { path: PathBuf, reason: String },

    #[error("unknown prediction type: {0} (expected: daily, yearly, or lifetime)")]
    UnknownPredictionType(String),

    #[error("unknown language: {0} (expected: en, zh, zh-tw, or es)")]
    UnknownLanguage(String),
}

impl ProbeError {
    /// Create an error for a schema file that could not be used
    pub fn invalid_schema(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        ProbeError::InvalidSchema {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, ProbeError>;
