//! Error types for the otu-significance library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum SigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid abundance value '{value}' at row {row}, column {col}")]
    InvalidAbundance {
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Metadata field '{0}' not found")]
    MissingField(String),

    #[error("Sample '{0}' not found")]
    UnknownSample(String),

    #[error("Unknown test name '{0}'")]
    UnknownTest(String),

    #[error("Paired sample lists differ in length: {before} before vs {after} after")]
    PairedLengthMismatch { before: usize, after: usize },

    #[error("Value '{value}' in field '{field}' cannot be converted to a number")]
    NonNumericGradient { field: String, value: String },

    #[error("Empty data: {0}")]
    EmptyData(String),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, SigError>;
