//! Error types shared across Applicator crates.

use std::path::PathBuf;

/// Top-level error type for Applicator operations.
///
/// `Validation` failures are raised before anything is read or written.
/// `FileFormat` failures abort a run. `MappingRow` values are produced for
/// rows the mapping resolver drops; they are logged and collected, never
/// propagated out of a run.
#[derive(Debug, thiserror::Error)]
pub enum ApplicatorError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("File format error in {}: {message}", path.display())]
    FileFormat { path: PathBuf, message: String },

    #[error("Mapping row {row} dropped: {message}")]
    MappingRow { row: usize, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Keyframe sink error: {message}")]
    Sink { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ApplicatorError.
pub type ApplicatorResult<T> = Result<T, ApplicatorError>;

impl ApplicatorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn file_format(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::FileFormat {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn mapping_row(row: usize, msg: impl Into<String>) -> Self {
        Self::MappingRow {
            row,
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }

    /// Whether the error was raised before any input was read.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
