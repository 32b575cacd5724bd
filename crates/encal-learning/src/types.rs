//! Result types returned by the training pipeline.

use serde::{Deserialize, Serialize};

use crate::metrics::{ConfusionMatrix, FeatureImportance};
use crate::splitter::StratifiedSplit;
use crate::tree::DecisionTreeClassifier;

/// Result of a training pipeline run.
///
/// Returned by [`Pipeline::train()`](crate::Pipeline::train).
///
/// # Example
///
/// ```ignore
/// let result = pipeline.train(&df)?;
///
/// println!("Accuracy: {:.3}", result.accuracy);
/// for f in result.top_features(10) {
///     println!("{}: {:.4}", f.feature, f.importance);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TrainingResult {
    /// Row indices of each partition and the per-class counts.
    pub split: StratifiedSplit,

    /// The fitted classifier.
    pub model: DecisionTreeClassifier,

    /// Test-set labels, in the order of `split.test`.
    pub test_labels: Vec<i64>,

    /// Predictions for the test set, aligned with `test_labels`.
    pub test_predictions: Vec<i64>,

    /// Accuracy on the test set.
    pub accuracy: f64,

    /// Accuracy on the validation set, `None` when it is empty.
    pub validation_accuracy: Option<f64>,

    /// Confusion matrix on the test set.
    pub confusion_matrix: ConfusionMatrix,

    /// All features ranked by importance, highest first.
    pub feature_importance: Vec<FeatureImportance>,
}

impl TrainingResult {
    /// The `n` most important features.
    pub fn top_features(&self, n: usize) -> &[FeatureImportance] {
        &self.feature_importance[..n.min(self.feature_importance.len())]
    }
}
