//! Custom error types for the survey processing stages.
//!
//! This module provides the error hierarchy using `thiserror` for
//! context-carrying errors throughout stages 1 and 2.
//!
//! Only structural problems are errors. Data-level oddities (unparseable
//! numbers while bucketing, values missing from a mapping, columns with no
//! duplicates) are absorbed by the components themselves and never surface
//! here.

use thiserror::Error;

/// The main error type for the processing stages.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// The input file of a stage does not exist.
    #[error("Input file not found: {0}")]
    InputNotFound(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A bucket specification is malformed.
    #[error("Invalid bucket spec for '{column}': {reason}")]
    InvalidBucketSpec { column: String, reason: String },

    /// The table has no columns to work on.
    #[error("Dataset has no columns")]
    EmptyTable,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable, machine-readable code for the error kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputNotFound(_) => "INPUT_NOT_FOUND",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidBucketSpec { .. } => "INVALID_BUCKET_SPEC",
            Self::EmptyTable => "EMPTY_TABLE",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ProcessingError::InputNotFound("raw.csv".to_string()).error_code(),
            "INPUT_NOT_FOUND"
        );
        assert_eq!(
            ProcessingError::ColumnNotFound("edad".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_with_context_preserves_code() {
        let error = ProcessingError::ColumnNotFound("diascita".to_string())
            .with_context("While bucketizing");
        assert!(error.to_string().contains("While bucketizing"));
        assert!(error.to_string().contains("diascita"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_io_context() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        let err = io.context("Reading survey").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().starts_with("Reading survey"));
    }
}
