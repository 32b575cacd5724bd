//! Per-class train/validation/test partitioning.
//!
//! Every class is split on its own so the three partitions keep the class
//! proportions of the full table. Counts use floor arithmetic:
//!
//! ```text
//! n_train_full = floor(n * train_fraction)
//! n_test       = n - n_train_full
//! n_val        = floor(n_train_full * val_fraction_within_train)
//! n_train      = n_train_full - n_val
//! ```
//!
//! A class with 10 rows and the default fractions splits as (7, 1, 2).

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{LearningError, Result};

/// Row counts of one class in each partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDistribution {
    pub class: i64,
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

impl ClassDistribution {
    pub fn total(&self) -> usize {
        self.train + self.validation + self.test
    }
}

/// Row indices of each partition, concatenated in ascending class order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratifiedSplit {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
    pub test: Vec<usize>,
    pub distribution: Vec<ClassDistribution>,
}

impl StratifiedSplit {
    /// Total number of rows across the three partitions.
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split row indices by class.
///
/// Rows of a class are taken in table order, then shuffled with a generator
/// seeded with `seed`. The generator is re-seeded for every class, so the
/// outcome for a class depends only on its own row count. The shuffled rows
/// are sliced into train, validation and test in that order.
///
/// # Errors
///
/// Returns [`LearningError::InvalidConfig`] if a fraction lies outside
/// `[0.0, 1.0]`.
pub fn stratified_split(
    labels: &[i64],
    train_fraction: f64,
    val_fraction_within_train: f64,
    seed: u64,
) -> Result<StratifiedSplit> {
    for (name, value) in [
        ("train_fraction", train_fraction),
        ("val_fraction_within_train", val_fraction_within_train),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(LearningError::InvalidConfig(format!(
                "{} must be between 0.0 and 1.0, got {}",
                name, value
            )));
        }
    }

    let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, label) in labels.iter().enumerate() {
        by_class.entry(*label).or_default().push(row);
    }

    let mut split = StratifiedSplit::default();
    for (class, mut rows) in by_class {
        let mut rng = StdRng::seed_from_u64(seed);
        rows.shuffle(&mut rng);

        let n = rows.len();
        let n_train_full = (n as f64 * train_fraction).floor() as usize;
        let n_test = n - n_train_full;
        let n_val = (n_train_full as f64 * val_fraction_within_train).floor() as usize;
        let n_train = n_train_full - n_val;

        split.train.extend_from_slice(&rows[..n_train]);
        split.validation.extend_from_slice(&rows[n_train..n_train_full]);
        split.test.extend_from_slice(&rows[n_train_full..]);

        debug!(
            "Class {}: {} train, {} validation, {} test",
            class, n_train, n_val, n_test
        );
        split.distribution.push(ClassDistribution {
            class,
            train: n_train,
            validation: n_val,
            test: n_test,
        });
    }

    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ten_rows_split_seven_one_two() {
        let labels = vec![3i64; 10];
        let split = stratified_split(&labels, 0.8, 0.2, 42).unwrap();
        assert_eq!(
            split.distribution,
            vec![ClassDistribution {
                class: 3,
                train: 7,
                validation: 1,
                test: 2
            }]
        );
        assert_eq!(split.train.len(), 7);
        assert_eq!(split.validation.len(), 1);
        assert_eq!(split.test.len(), 2);
    }

    #[test]
    fn test_partitions_are_complete_and_disjoint() {
        let labels: Vec<i64> = (0..53).map(|i| i % 4).collect();
        let split = stratified_split(&labels, 0.8, 0.2, 42).unwrap();

        let mut all: Vec<usize> = split
            .train
            .iter()
            .chain(&split.validation)
            .chain(&split.test)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..53).collect::<Vec<_>>());

        for dist in &split.distribution {
            let n = labels.iter().filter(|l| **l == dist.class).count();
            assert_eq!(dist.total(), n);
        }
    }

    #[test]
    fn test_classes_in_ascending_order() {
        let labels = vec![2i64, 0, 1, 2, 0, 1, 2, 0, 1, 1];
        let split = stratified_split(&labels, 0.8, 0.2, 42).unwrap();
        let classes: Vec<i64> = split.distribution.iter().map(|d| d.class).collect();
        assert_eq!(classes, vec![0, 1, 2]);

        // Train rows are grouped by class in the same order.
        let train_labels: Vec<i64> = split.train.iter().map(|&i| labels[i]).collect();
        let mut sorted = train_labels.clone();
        sorted.sort_unstable();
        assert_eq!(train_labels, sorted);
    }

    #[test]
    fn test_single_row_class_goes_to_test() {
        let labels = vec![0i64, 0, 0, 0, 0, 1];
        let split = stratified_split(&labels, 0.8, 0.2, 42).unwrap();
        let single = split.distribution.iter().find(|d| d.class == 1).unwrap();
        assert_eq!((single.train, single.validation, single.test), (0, 0, 1));
        assert!(split.test.contains(&5));
    }

    #[test]
    fn test_deterministic_for_a_seed() {
        let labels: Vec<i64> = (0..40).map(|i| i % 3).collect();
        let a = stratified_split(&labels, 0.8, 0.2, 42).unwrap();
        let b = stratified_split(&labels, 0.8, 0.2, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_size_classes_shuffle_alike() {
        // Re-seeding per class means equal-sized classes get the same permutation.
        let labels = vec![0i64, 0, 0, 0, 0, 1, 1, 1, 1, 1];
        let split = stratified_split(&labels, 0.8, 0.2, 42).unwrap();
        let zeros: Vec<usize> = split.train.iter().copied().filter(|i| *i < 5).collect();
        let ones: Vec<usize> = split
            .train
            .iter()
            .copied()
            .filter(|i| *i >= 5)
            .map(|i| i - 5)
            .collect();
        assert_eq!(zeros, ones);
    }

    #[test]
    fn test_invalid_fraction() {
        let err = stratified_split(&[0, 1], 1.2, 0.2, 42).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_empty_labels() {
        let split = stratified_split(&[], 0.8, 0.2, 42).unwrap();
        assert!(split.is_empty());
        assert!(split.distribution.is_empty());
    }
}
