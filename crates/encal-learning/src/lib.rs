//! encal-learning: decision-tree training for the encoded ENCal survey.
//!
//! Stage 3 of the survey preparation. Takes the integer-coded table written
//! by Stage 2, splits it per class into train, validation and test
//! partitions, fits a depth-limited CART classifier and evaluates it.
//!
//! # Features
//!
//! - **Stratified Splitting**: per-class floor arithmetic, seeded shuffles
//! - **Native CART**: Gini splits, seeded feature order, normalized importances
//! - **Evaluation**: accuracy and a confusion matrix over the label union
//! - **Renderings**: the fitted tree as indented text or JSON
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use encal_learning::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .target_column("FE_FinalNR")
//!     .max_depth(5)
//!     .random_seed(42)
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.train(&encoded)?;
//!
//! println!("{}", result.confusion_matrix);
//! println!("Accuracy: {:.3}", result.accuracy);
//! std::fs::write("decision_tree.txt", result.model.render_text()?)?;
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`](error::Result):
//!
//! - [`LearningError::InvalidConfig`] - Invalid pipeline configuration
//! - [`LearningError::TargetNotFound`] - The target column is absent
//! - [`LearningError::InvalidData`] - Missing feature values or a non-integer target
//! - [`LearningError::TrainingFailed`] - Predicting with an unfitted tree
//!
//! # Thread Safety
//!
//! [`Pipeline`] holds only its configuration and is `Send + Sync`.

pub mod config;
pub mod error;
pub mod features;
pub mod metrics;
pub mod pipeline;
pub mod splitter;
pub mod tree;
pub mod types;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{LearningError, Result as LearningResult, ResultExt};
pub use features::{FeatureMatrix, target_labels};
pub use metrics::{ConfusionMatrix, FeatureImportance, accuracy, confusion_matrix};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use splitter::{ClassDistribution, StratifiedSplit, stratified_split};
pub use tree::{DecisionTreeClassifier, TreeNode};
pub use types::TrainingResult;
