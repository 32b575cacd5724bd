use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cleaner::DuplicatePair;
use crate::encoding::AuditTable;

/// One row of the Stage 1 column summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Polars dtype after schema inference, e.g. `Int64` or `String`.
    pub dtype: String,
    /// Distinct non-missing values.
    pub unique_values: usize,
    pub missing_values: usize,
}

/// Output of Stage 1.
#[derive(Debug, Clone)]
pub struct ExplorationResult {
    /// The table with diacritics removed from headers and text cells.
    pub data: DataFrame,
    pub summaries: Vec<ColumnSummary>,
}

/// Output of Stage 2.
#[derive(Debug, Clone)]
pub struct EncodingResult {
    /// Identifier column followed by integer-coded columns.
    pub data: DataFrame,
    pub audit: AuditTable,
    pub summary: EncodingSummary,
}

/// What Stage 2 did to the table, for logs and the console report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodingSummary {
    pub shape_before: (usize, usize),
    pub shape_after: (usize, usize),
    /// Cells turned into missing values by sentinel matching.
    pub sentinel_replacements: usize,
    pub duplicate_pairs: Vec<DuplicatePair>,
    /// Columns that were bucketed, in rule order.
    pub bucketized: Vec<String>,
    /// Columns removed at the constant-removal step.
    pub dropped_columns: Vec<String>,
    pub encoded_columns: usize,
}
