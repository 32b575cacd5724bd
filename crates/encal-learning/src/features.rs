//! Feature matrix preparation.
//!
//! Every column except the target becomes a feature. Numeric columns are
//! used as they are. Text columns are one-hot expanded: one indicator per
//! distinct value except the first in sorted order, named `<column>_<value>`.

use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{LearningError, Result, ResultExt};

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn is_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Dense, column-major matrix of `f64` features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl FeatureMatrix {
    /// Build a matrix from named columns of equal length.
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(LearningError::InvalidData(format!(
                "{} feature names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        let n_rows = columns.first().map_or(0, Vec::len);
        if let Some(pos) = columns.iter().position(|c| c.len() != n_rows) {
            return Err(LearningError::InvalidData(format!(
                "feature '{}' has {} rows, expected {}",
                names[pos],
                columns[pos].len(),
                n_rows
            )));
        }
        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    /// Features of `df`, every column except `target`.
    ///
    /// # Errors
    ///
    /// - [`LearningError::TargetNotFound`] if `target` is absent
    /// - [`LearningError::InvalidData`] if a feature has missing values
    pub fn from_frame(df: &DataFrame, target: &str) -> Result<Self> {
        if df.get_column_index(target).is_none() {
            return Err(LearningError::TargetNotFound(target.to_string()));
        }

        let mut names = Vec::new();
        let mut columns = Vec::new();

        for column in df.get_columns() {
            let name = column.name().as_str();
            if name == target {
                continue;
            }
            if column.null_count() > 0 {
                return Err(LearningError::InvalidData(format!(
                    "feature '{}' has {} missing values",
                    name,
                    column.null_count()
                )));
            }

            let series = column.as_materialized_series();
            if is_numeric(series.dtype()) {
                let values = series
                    .cast(&DataType::Float64)
                    .context(format!("Reading feature '{}'", name))?;
                names.push(name.to_string());
                columns.push(values.f64()?.into_no_null_iter().collect());
            } else {
                let (dummy_names, dummies) = one_hot(series, name)?;
                debug!("One-hot expanded '{}' into {} columns", name, dummies.len());
                names.extend(dummy_names);
                columns.extend(dummies);
            }
        }

        let mut matrix = Self::new(names, columns)?;
        matrix.n_rows = df.height();
        Ok(matrix)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, feature: usize) -> &[f64] {
        &self.columns[feature]
    }

    #[inline]
    pub fn value(&self, row: usize, feature: usize) -> f64 {
        self.columns[feature][row]
    }

    /// A new matrix holding `rows`, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|column| rows.iter().map(|&r| column[r]).collect())
                .collect(),
            n_rows: rows.len(),
        }
    }
}

fn one_hot(series: &Series, name: &str) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
    let text = series
        .cast(&DataType::String)
        .context(format!("Reading feature '{}'", name))?;
    let cells: Vec<&str> = text.str()?.into_no_null_iter().collect();

    let categories: BTreeSet<&str> = cells.iter().copied().collect();
    let (names, columns): (Vec<String>, Vec<Vec<f64>>) = categories
        .into_iter()
        .skip(1)
        .map(|value| {
            let indicator = cells
                .iter()
                .map(|cell| if *cell == value { 1.0 } else { 0.0 })
                .collect::<Vec<f64>>();
            (format!("{}_{}", name, value), indicator)
        })
        .unzip();
    Ok((names, columns))
}

/// Integer class labels from the target column.
///
/// # Errors
///
/// - [`LearningError::TargetNotFound`] if `target` is absent
/// - [`LearningError::InvalidData`] if it is not integer coded or has
///   missing values
pub fn target_labels(df: &DataFrame, target: &str) -> Result<Vec<i64>> {
    let column = df
        .column(target)
        .map_err(|_| LearningError::TargetNotFound(target.to_string()))?;

    if !is_integer(column.dtype()) {
        return Err(LearningError::InvalidData(format!(
            "target '{}' must be integer coded, found {:?}",
            target,
            column.dtype()
        )));
    }
    if column.null_count() > 0 {
        return Err(LearningError::InvalidData(format!(
            "target '{}' has {} missing values",
            target,
            column.null_count()
        )));
    }

    let labels = column
        .as_materialized_series()
        .cast(&DataType::Int64)
        .context(format!("Reading target '{}'", target))?;
    Ok(labels.i64()?.into_no_null_iter().collect())
}
