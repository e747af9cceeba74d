//! Error types for platoon response analysis

use thiserror::Error;

/// Errors that can occur while loading, configuring or encoding an analysis.
///
/// The detection stages themselves never fail: short or gappy data produces
/// missing values and fewer events instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to parse recording: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Column {column} has {got} samples, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
