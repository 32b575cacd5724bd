//! Error types for the encal-learning crate.
//!
//! This module defines [`LearningError`], the error type used throughout
//! the crate. All public API functions return [`Result<T>`](Result).
//!
//! # Example
//!
//! ```no_run
//! use encal_learning::{LearningError, PipelineConfig};
//!
//! fn configure() -> Result<(), LearningError> {
//!     let config = PipelineConfig::builder()
//!         .target_column("FE_FinalNR")
//!         .build()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for training operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the pipeline.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data provided for training.
    ///
    /// Common causes:
    /// - A feature column contains missing values (Stage 2 output is dense)
    /// - The target column is not integer coded
    /// - The training partition is empty
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The specified target column was not found in the DataFrame.
    ///
    /// Column names are case-sensitive.
    #[error("Target column '{0}' not found")]
    TargetNotFound(String),

    /// Fitting or evaluating the classifier failed.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<LearningError>,
    },
}

impl LearningError {
    /// Wrap the error with a description of what was being done.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        LearningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable, machine-readable code for the error kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::TargetNotFound(_) => "TARGET_NOT_FOUND",
            Self::TrainingFailed(_) => "TRAINING_FAILED",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }
}

/// Result type alias for training operations.
pub type Result<T> = std::result::Result<T, LearningError>;

/// Extension trait for adding context to results.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| LearningError::Polars(e).with_context(context))
    }
}
