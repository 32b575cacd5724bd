//! Configuration for the training pipeline.
//!
//! # Example
//!
//! ```
//! use encal_learning::PipelineConfig;
//!
//! let config = PipelineConfig::builder()
//!     .target_column("FE_FinalNR")
//!     .max_depth(5)
//!     .random_seed(42)
//!     .build()
//!     .expect("valid config");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{LearningError, Result};

/// Configuration for the Stage 3 training pipeline.
///
/// Use [`PipelineConfig::builder()`] to construct a validated configuration.
///
/// # Validation
///
/// [`build()`](PipelineConfigBuilder::build) checks that:
/// - `target_column` is not empty
/// - `train_fraction` and `val_fraction_within_train` are in `[0.0, 1.0]`
/// - `max_depth` is at least 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name of the class label column (default: `FE_FinalNR`).
    pub target_column: String,

    /// Share of each class that goes to training plus validation (default: 0.8).
    pub train_fraction: f64,

    /// Share of the training portion held out for validation (default: 0.2).
    pub val_fraction_within_train: f64,

    /// Seed for the split shuffles and the tree's feature order (default: 42).
    pub random_seed: u64,

    /// Maximum depth of the decision tree (default: 5).
    pub max_depth: usize,

    /// Number of features listed in the importance report (default: 10).
    pub top_features: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: "FE_FinalNR".to_string(),
            train_fraction: 0.8,
            val_fraction_within_train: 0.2,
            random_seed: 42,
            max_depth: 5,
            top_features: 10,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Check every setting, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.target_column.trim().is_empty() {
            return Err(LearningError::InvalidConfig(
                "target_column must not be empty".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.train_fraction) {
            return Err(LearningError::InvalidConfig(
                "train_fraction must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.val_fraction_within_train) {
            return Err(LearningError::InvalidConfig(
                "val_fraction_within_train must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.max_depth == 0 {
            return Err(LearningError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`PipelineConfig`].
///
/// Created via [`PipelineConfig::builder()`]. All setters return `self` to
/// allow method chaining.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the target column name.
    #[must_use]
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.config.target_column = column.into();
        self
    }

    /// Set the train-plus-validation share of each class (default: 0.8).
    ///
    /// [`build()`](Self::build) returns an error outside `[0.0, 1.0]`.
    #[must_use]
    pub fn train_fraction(mut self, fraction: f64) -> Self {
        self.config.train_fraction = fraction;
        self
    }

    /// Set the validation share of the training portion (default: 0.2).
    ///
    /// [`build()`](Self::build) returns an error outside `[0.0, 1.0]`.
    #[must_use]
    pub fn val_fraction_within_train(mut self, fraction: f64) -> Self {
        self.config.val_fraction_within_train = fraction;
        self
    }

    /// Set the random seed for reproducibility (default: 42).
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the maximum tree depth (default: 5).
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set how many features the importance report lists (default: 10).
    #[must_use]
    pub fn top_features(mut self, n: usize) -> Self {
        self.config.top_features = n;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] when a setting is out of range.
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.target_column, "FE_FinalNR");
        assert_eq!(config.train_fraction, 0.8);
        assert_eq!(config.val_fraction_within_train, 0.2);
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.top_features, 10);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::builder()
            .target_column("cal1")
            .max_depth(3)
            .random_seed(7)
            .build()
            .unwrap();

        assert_eq!(config.target_column, "cal1");
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.random_seed, 7);
    }

    #[test]
    fn test_fraction_bounds() {
        assert!(PipelineConfig::builder().train_fraction(0.0).build().is_ok());
        assert!(PipelineConfig::builder().train_fraction(1.0).build().is_ok());

        let result = PipelineConfig::builder().train_fraction(1.5).build();
        assert!(result.unwrap_err().to_string().contains("train_fraction"));

        let result = PipelineConfig::builder()
            .val_fraction_within_train(-0.1)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_depth_and_target() {
        assert!(PipelineConfig::builder().max_depth(0).build().is_err());
        assert!(PipelineConfig::builder().target_column(" ").build().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: PipelineConfig = serde_json::from_str(r#"{ "max_depth": 3 }"#).unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.target_column, "FE_FinalNR");
    }
}
