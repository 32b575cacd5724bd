//! Training pipeline implementation.
//!
//! The pipeline runs these steps in order:
//!
//! 1. **Preparation** - Read the target labels and build the feature matrix
//! 2. **Splitting** - Stratified train/validation/test partitions
//! 3. **Training** - Fit the decision tree on the train partition
//! 4. **Evaluation** - Accuracy and confusion matrix on the test partition
//!
//! # Example
//!
//! ```rust,ignore
//! use encal_learning::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::builder()
//!     .config(PipelineConfig::builder().target_column("FE_FinalNR").build()?)
//!     .build()?;
//!
//! let result = pipeline.train(&encoded)?;
//! println!("Accuracy: {:.3}", result.accuracy);
//! ```

use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{LearningError, Result, ResultExt};
use crate::features::{FeatureMatrix, target_labels};
use crate::metrics::{accuracy, confusion_matrix, rank_importances};
use crate::splitter::stratified_split;
use crate::tree::DecisionTreeClassifier;
use crate::types::TrainingResult;

/// The Stage 3 training pipeline.
///
/// Use [`Pipeline::builder()`] to construct a pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Split, fit and evaluate on an encoded table.
    ///
    /// # Errors
    ///
    /// - [`LearningError::TargetNotFound`] if the target column is absent
    /// - [`LearningError::InvalidData`] if the features have missing values or
    ///   the train partition is empty
    pub fn train(&self, df: &DataFrame) -> Result<TrainingResult> {
        let target = self.config.target_column.as_str();
        info!("Starting training on {:?}, target '{}'", df.shape(), target);

        info!("Step 1: Preparing features...");
        let labels = target_labels(df, target)?;
        let features = FeatureMatrix::from_frame(df, target).context("Preparing features")?;
        debug!("{} features after one-hot expansion", features.n_features());

        info!("Step 2: Splitting by class...");
        let split = stratified_split(
            &labels,
            self.config.train_fraction,
            self.config.val_fraction_within_train,
            self.config.random_seed,
        )?;
        info!(
            "Split sizes: {} train, {} validation, {} test",
            split.train.len(),
            split.validation.len(),
            split.test.len()
        );
        if split.train.is_empty() {
            return Err(LearningError::InvalidData(
                "the train partition is empty".to_string(),
            ));
        }

        let select = |rows: &[usize]| -> Vec<i64> { rows.iter().map(|&r| labels[r]).collect() };

        info!("Step 3: Fitting decision tree (max_depth {})...", self.config.max_depth);
        let mut model = DecisionTreeClassifier::new(self.config.max_depth, self.config.random_seed);
        model
            .fit(&features.select_rows(&split.train), &select(&split.train))
            .context("Fitting decision tree")?;

        info!("Step 4: Evaluating...");
        let test_labels = select(&split.test);
        let test_predictions = model.predict(&features.select_rows(&split.test))?;
        let test_accuracy = accuracy(&test_labels, &test_predictions);

        let validation_accuracy = if split.validation.is_empty() {
            None
        } else {
            let predicted = model.predict(&features.select_rows(&split.validation))?;
            Some(accuracy(&select(&split.validation), &predicted))
        };

        let confusion = confusion_matrix(&test_labels, &test_predictions);
        let feature_importance = rank_importances(model.feature_names(), model.feature_importances());

        info!("Training complete: test accuracy {:.3}", test_accuracy);
        Ok(TrainingResult {
            split,
            model,
            test_labels,
            test_predictions,
            accuracy: test_accuracy,
            validation_accuracy,
            confusion_matrix: confusion,
            feature_importance,
        })
    }
}

/// Builder for [`Pipeline`].
#[derive(Debug, Default)]
#[must_use]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(Pipeline { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn encoded() -> DataFrame {
        let n = 20;
        let folio: Vec<String> = (0..n).map(|i| format!("F{:02}", i)).collect();
        let edad: Vec<i64> = (0..n).map(|i| i % 5).collect();
        let cal1: Vec<i64> = (0..n).map(|i| i / 10).collect();
        let target: Vec<i64> = cal1.iter().map(|c| c * 2).collect();
        df! {
            "folio" => folio,
            "edad" => edad,
            "cal1" => cal1,
            "FE_FinalNR" => target,
        }
        .unwrap()
    }

    #[test]
    fn test_train_learns_the_signal() {
        let result = Pipeline::builder().build().unwrap().train(&encoded()).unwrap();

        // Two classes of 10 rows: (7, 1, 2) each.
        assert_eq!(result.split.train.len(), 14);
        assert_eq!(result.split.validation.len(), 2);
        assert_eq!(result.split.test.len(), 4);
        assert_eq!(result.test_labels, vec![0, 0, 2, 2]);
        assert_eq!(result.accuracy, 1.0);
        assert_eq!(result.confusion_matrix.labels, vec![0, 2]);
        assert_eq!(result.top_features(1)[0].feature, "cal1");
        assert!(result.top_features(100).len() > 2);
    }

    #[test]
    fn test_missing_target() {
        let config = PipelineConfig::builder().target_column("nope").build().unwrap();
        let err = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .train(&encoded())
            .unwrap_err();
        assert_eq!(err.error_code(), "TARGET_NOT_FOUND");
    }

    #[test]
    fn test_empty_train_partition() {
        let config = PipelineConfig::builder().train_fraction(0.0).build().unwrap();
        let err = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .train(&encoded())
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");
    }

    #[test]
    fn test_invalid_config() {
        let mut config = PipelineConfig::default();
        config.max_depth = 0;
        assert!(Pipeline::builder().config(config).build().is_err());
    }
}
