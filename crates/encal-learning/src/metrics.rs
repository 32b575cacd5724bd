//! Evaluation metrics for the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of predictions equal to the true label. Zero for empty input.
pub fn accuracy(y_true: &[i64], y_pred: &[i64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(truth, pred)| truth == pred)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Confusion matrix: rows are true labels, columns predicted labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Sorted union of true and predicted labels.
    pub labels: Vec<i64>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Count of rows with true label `truth` predicted as `predicted`.
    pub fn get(&self, truth: i64, predicted: i64) -> Option<usize> {
        let row = self.labels.binary_search(&truth).ok()?;
        let col = self.labels.binary_search(&predicted).ok()?;
        Some(self.counts[row][col])
    }

    /// Sum of the diagonal.
    pub fn correct(&self) -> usize {
        (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|l| l.to_string().len())
            .chain(self.counts.iter().flatten().map(|c| c.to_string().len()))
            .max()
            .unwrap_or(1)
            .max(4);

        write!(f, "{:>width$}", "", width = width)?;
        for label in &self.labels {
            write!(f, " {:>width$}", label, width = width)?;
        }
        writeln!(f)?;

        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{:>width$}", label, width = width)?;
            for count in row {
                write!(f, " {:>width$}", count, width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Build the confusion matrix over the sorted union of both label sets.
pub fn confusion_matrix(y_true: &[i64], y_pred: &[i64]) -> ConfusionMatrix {
    let mut labels: Vec<i64> = y_true.iter().chain(y_pred).copied().collect();
    labels.sort_unstable();
    labels.dedup();

    let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
    for (truth, pred) in y_true.iter().zip(y_pred) {
        if let (Ok(row), Ok(col)) = (labels.binary_search(truth), labels.binary_search(pred)) {
            counts[row][col] += 1;
        }
    }

    ConfusionMatrix { labels, counts }
}

/// A feature and its importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Features ordered by importance, highest first. Equal importances keep
/// their column order.
pub fn rank_importances(names: &[String], importances: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(importances)
        .map(|(feature, importance)| FeatureImportance {
            feature: feature.clone(),
            importance: *importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[1, 2, 3, 4], &[1, 2, 0, 4]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_confusion_matrix_uses_label_union() {
        // Label 9 is only ever predicted.
        let cm = confusion_matrix(&[0, 0, 1, 2], &[0, 9, 1, 1]);
        assert_eq!(cm.labels, vec![0, 1, 2, 9]);
        assert_eq!(
            cm.counts,
            vec![
                vec![1, 0, 0, 1],
                vec![0, 1, 0, 0],
                vec![0, 1, 0, 0],
                vec![0, 0, 0, 0],
            ]
        );
        assert_eq!(cm.get(0, 9), Some(1));
        assert_eq!(cm.get(5, 0), None);
        assert_eq!(cm.correct(), 2);
        assert_eq!(cm.total(), 4);
    }

    #[test]
    fn test_display() {
        let cm = confusion_matrix(&[0, 1], &[0, 0]);
        let text = cm.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].split_whitespace().collect::<Vec<_>>(), ["0", "1", "0"]);
        assert_eq!(lines[2].split_whitespace().collect::<Vec<_>>(), ["1", "1", "0"]);
    }

    #[test]
    fn test_rank_importances() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ranked = rank_importances(&names, &[0.2, 0.6, 0.2]);
        let order: Vec<&str> = ranked.iter().map(|f| f.feature.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
