//! CART decision tree classifier.
//!
//! Splits minimise the weighted Gini impurity of the two children. Candidate
//! thresholds are midpoints between consecutive distinct values of a feature,
//! and rows with `value <= threshold` go left. At every node the features are
//! visited in an order shuffled by the seeded generator; a candidate replaces
//! the current best only when strictly better, so the visit order settles
//! ties and a given seed always yields the same tree.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::debug;

use crate::error::{LearningError, Result};
use crate::features::FeatureMatrix;

/// A node of a fitted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        class: i64,
        n_samples: usize,
        impurity: f64,
        /// Training rows per class, aligned with the classifier's classes.
        class_counts: Vec<usize>,
    },
    Split {
        feature: usize,
        feature_name: String,
        threshold: f64,
        n_samples: usize,
        impurity: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn n_samples(&self) -> usize {
        match self {
            TreeNode::Leaf { n_samples, .. } | TreeNode::Split { n_samples, .. } => *n_samples,
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Gini impurity of a node with the given class counts.
fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| (c as f64 / n).powi(2))
        .sum::<f64>()
}

/// Most frequent class index, the lowest one on ties.
fn majority(counts: &[usize]) -> usize {
    let mut best = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = i;
        }
    }
    best
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// Weighted child impurity, `n_left * gini_left + n_right * gini_right`.
    weighted_impurity: f64,
}

/// Decision tree classifier over integer class labels.
///
/// # Example
///
/// ```rust,ignore
/// let mut tree = DecisionTreeClassifier::new(5, 42);
/// tree.fit(&x_train, &y_train)?;
/// let predictions = tree.predict(&x_test)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
    classes: Vec<i64>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
    root: Option<TreeNode>,
}

impl DecisionTreeClassifier {
    /// Create an unfitted classifier.
    pub fn new(max_depth: usize, seed: u64) -> Self {
        Self {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed,
            classes: Vec::new(),
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
            root: None,
        }
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    #[must_use]
    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    /// Fit the tree to `x` and `y`.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidData`] when `x` has no rows or its row
    /// count differs from the number of labels.
    pub fn fit(&mut self, x: &FeatureMatrix, y: &[i64]) -> Result<&mut Self> {
        if x.n_rows() != y.len() {
            return Err(LearningError::InvalidData(format!(
                "{} feature rows for {} labels",
                x.n_rows(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(LearningError::InvalidData(
                "cannot fit a tree on zero rows".to_string(),
            ));
        }

        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let encoded: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_else(|pos| pos))
            .collect();

        self.classes = classes;
        self.feature_names = x.names().to_vec();

        let mut importances = vec![0.0; x.n_features()];
        let mut rng = StdRng::seed_from_u64(self.seed);
        let rows: Vec<usize> = (0..y.len()).collect();
        let root = self.build_node(x, &encoded, &rows, 0, &mut rng, &mut importances);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for importance in &mut importances {
                *importance /= total;
            }
        }

        debug!(
            "Fitted tree: depth {}, {} leaves",
            root.depth(),
            root.n_leaves()
        );
        self.feature_importances = importances;
        self.root = Some(root);
        Ok(self)
    }

    fn build_node(
        &self,
        x: &FeatureMatrix,
        y: &[usize],
        rows: &[usize],
        depth: usize,
        rng: &mut StdRng,
        importances: &mut [f64],
    ) -> TreeNode {
        let n = rows.len();
        let mut counts = vec![0usize; self.classes.len()];
        for &row in rows {
            counts[y[row]] += 1;
        }
        let impurity = gini(&counts, n);

        let is_leaf = depth >= self.max_depth
            || n < self.min_samples_split
            || n < 2 * self.min_samples_leaf
            || impurity <= 0.0;

        let best = if is_leaf {
            None
        } else {
            self.best_split(x, y, rows, rng)
        };

        match best {
            Some(split) if split.weighted_impurity < impurity * n as f64 => {
                importances[split.feature] += impurity * n as f64 - split.weighted_impurity;

                let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                    .iter()
                    .partition(|&&row| x.value(row, split.feature) <= split.threshold);

                let left = self.build_node(x, y, &left_rows, depth + 1, rng, importances);
                let right = self.build_node(x, y, &right_rows, depth + 1, rng, importances);

                TreeNode::Split {
                    feature: split.feature,
                    feature_name: x.names()[split.feature].clone(),
                    threshold: split.threshold,
                    n_samples: n,
                    impurity,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            _ => TreeNode::Leaf {
                class: self.classes[majority(&counts)],
                n_samples: n,
                impurity,
                class_counts: counts,
            },
        }
    }

    fn best_split(
        &self,
        x: &FeatureMatrix,
        y: &[usize],
        rows: &[usize],
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let n_classes = self.classes.len();
        let n = rows.len();
        if n < 2 {
            return None;
        }

        let mut features: Vec<usize> = (0..x.n_features()).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        for feature in features {
            let mut sorted: Vec<(f64, usize)> = rows
                .iter()
                .map(|&row| (x.value(row, feature), y[row]))
                .collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            if sorted[0].0 >= sorted[n - 1].0 {
                continue;
            }

            let mut left = vec![0usize; n_classes];
            let mut right = vec![0usize; n_classes];
            for &(_, class) in &sorted {
                right[class] += 1;
            }

            for i in 0..n - 1 {
                let (value, class) = sorted[i];
                left[class] += 1;
                right[class] -= 1;

                let next = sorted[i + 1].0;
                if value >= next {
                    continue;
                }

                let n_left = i + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let weighted = n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right);

                if best.is_none_or(|b| weighted < b.weighted_impurity) {
                    let mut threshold = (value + next) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        weighted_impurity: weighted,
                    });
                }
            }
        }
        best
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Classes seen during fitting, ascending.
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Normalized total impurity decrease per feature, aligned with
    /// [`feature_names`](Self::feature_names). All zeros for a single-leaf tree.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::depth)
    }

    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::n_leaves)
    }

    fn fitted_root(&self) -> Result<&TreeNode> {
        self.root
            .as_ref()
            .ok_or_else(|| LearningError::TrainingFailed("tree has not been fitted".to_string()))
    }

    /// Predicted class of every row of `x`.
    ///
    /// # Errors
    ///
    /// Fails if the tree is unfitted or `x` has a different feature count.
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<i64>> {
        let root = self.fitted_root()?;
        if x.n_features() != self.feature_names.len() {
            return Err(LearningError::InvalidData(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                x.n_features()
            )));
        }

        Ok((0..x.n_rows())
            .map(|row| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { class, .. } => break *class,
                        TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                            ..
                        } => {
                            node = if x.value(row, *feature) <= *threshold {
                                left
                            } else {
                                right
                            };
                        }
                    }
                }
            })
            .collect())
    }

    /// Plain-text rendering, one line per node:
    ///
    /// ```text
    /// |--- edad <= 2.50
    /// |   |--- class: 0
    /// |--- edad >  2.50
    /// |   |--- class: 1
    /// ```
    pub fn render_text(&self) -> Result<String> {
        let mut out = String::new();
        render_node(self.fitted_root()?, 0, &mut out);
        Ok(out)
    }

    /// Pretty JSON of the fitted tree with its classes and importances.
    pub fn to_json(&self) -> Result<String> {
        self.fitted_root()?;
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn render_node(node: &TreeNode, depth: usize, out: &mut String) {
    let indent = "|   ".repeat(depth);
    match node {
        TreeNode::Leaf { class, .. } => {
            let _ = writeln!(out, "{}|--- class: {}", indent, class);
        }
        TreeNode::Split {
            feature_name,
            threshold,
            left,
            right,
            ..
        } => {
            let _ = writeln!(out, "{}|--- {} <= {:.2}", indent, feature_name, threshold);
            render_node(left, depth + 1, out);
            let _ = writeln!(out, "{}|--- {} >  {:.2}", indent, feature_name, threshold);
            render_node(right, depth + 1, out);
        }
    }
}
