//! Data profiling module for dataset analysis.
//!
//! This module provides functionality for profiling datasets, including:
//! - The per-column summary written by Stage 1
//! - Descriptive statistics used by the exploratory charts

pub mod statistics;

use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::types::ColumnSummary;

/// Data profiler for summarizing dataset structure.
pub struct DataProfiler;

impl DataProfiler {
    /// Summarize every column: dtype, distinct non-missing values, missing cells.
    pub fn summarize(df: &DataFrame) -> Result<Vec<ColumnSummary>> {
        df.get_columns()
            .iter()
            .map(|column| Self::summarize_column(column.as_materialized_series()))
            .collect()
    }

    fn summarize_column(series: &Series) -> Result<ColumnSummary> {
        let summary = ColumnSummary {
            column: series.name().to_string(),
            dtype: format!("{:?}", series.dtype()),
            unique_values: series.drop_nulls().n_unique()?,
            missing_values: series.null_count(),
        };
        debug!(
            "{}: {} unique, {} missing",
            summary.column, summary.unique_values, summary.missing_values
        );
        Ok(summary)
    }

    /// The summary as a table with columns `column`, `type`, `unique_values`
    /// and `missing_values`.
    pub fn summary_frame(summaries: &[ColumnSummary]) -> Result<DataFrame> {
        let columns: Vec<&str> = summaries.iter().map(|s| s.column.as_str()).collect();
        let dtypes: Vec<&str> = summaries.iter().map(|s| s.dtype.as_str()).collect();
        let unique: Vec<u64> = summaries.iter().map(|s| s.unique_values as u64).collect();
        let missing: Vec<u64> = summaries.iter().map(|s| s.missing_values as u64).collect();

        Ok(DataFrame::new(vec![
            Column::new("column".into(), columns),
            Column::new("type".into(), dtypes),
            Column::new("unique_values".into(), unique),
            Column::new("missing_values".into(), missing),
        ])?)
    }
}
