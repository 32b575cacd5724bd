use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::debug;

use crate::encoding::AuditTable;
use crate::error::Result;
use crate::io::write_csv;
use crate::profiler::DataProfiler;
use crate::reporting::charts::{Chart, ChartData, ChartDocument};
use crate::types::ColumnSummary;

/// Stage 1: the input with diacritics removed.
pub const WITHOUT_ACCENTS_FILE: &str = "1_without_accents.csv";
/// Stage 1: one row per column.
pub const COLUMN_SUMMARY_FILE: &str = "column_summary.csv";
/// Stage 1: one chart page per column.
pub const EXPLORATION_CHARTS_FILE: &str = "exploration_charts.json";
/// Stage 2: the encoded table.
pub const NUMERIC_DATA_FILE: &str = "2_numeric_data.csv";
/// Stage 2: the `(column, value, code)` audit table.
pub const CATEGORICAL_MAPPING_FILE: &str = "categorical_mapping.csv";

/// Writes stage outputs into one directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of a file inside the output directory.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Save a table as CSV and return its path.
    pub fn save_table(&self, df: &mut DataFrame, file_name: &str) -> Result<PathBuf> {
        let path = self.output_path(file_name);
        write_csv(df, &path)?;
        Ok(path)
    }

    /// Save a chart document as JSON and return its path.
    pub fn save_charts(&self, document: &ChartDocument, file_name: &str) -> Result<PathBuf> {
        let path = self.output_path(file_name);
        document.write_json(&path)?;
        Ok(path)
    }

    /// Save the Stage 1 column summary.
    pub fn save_column_summary(&self, summaries: &[ColumnSummary]) -> Result<PathBuf> {
        let mut frame = DataProfiler::summary_frame(summaries)?;
        self.save_table(&mut frame, COLUMN_SUMMARY_FILE)
    }

    /// Save the Stage 2 audit table.
    pub fn save_audit_table(&self, audit: &AuditTable) -> Result<PathBuf> {
        let mut frame = audit.to_dataframe()?;
        debug!("Audit table has {} rows", frame.height());
        self.save_table(&mut frame, CATEGORICAL_MAPPING_FILE)
    }
}

/// One page per column with its distinct and missing counts.
pub fn column_overview(summaries: &[ColumnSummary]) -> ChartDocument {
    let mut document = ChartDocument::new("Column overview");
    for (idx, summary) in summaries.iter().enumerate() {
        document.push(Chart::new(
            format!("Column {}: {}", idx + 1, summary.column),
            "",
            "Count",
            ChartData::Bar {
                categories: vec!["Unique values".to_string(), "Missing values".to_string()],
                values: vec![summary.unique_values as f64, summary.missing_values as f64],
            },
        ));
    }
    document
}
