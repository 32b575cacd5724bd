//! Categorical encoding with a persisted code table.
//!
//! Every column except the identifier gets a dense code per distinct value.
//! Missing cells are first replaced with a placeholder, then the distinct
//! values are sorted by their text form and numbered from 0. The resulting
//! `(column, value, code)` triples form the audit table written next to the
//! encoded data.

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProcessingError, Result};
use crate::utils::{column_names, text_values};

/// Text that stands in for a missing cell before encoding.
pub const MISSING_PLACEHOLDER: &str = "NaN";

/// Code for a value that is not in the mapping.
pub const UNMAPPED_CODE: i64 = -1;

/// Distinct values in code order, with missing cells replaced by `placeholder`.
///
/// Ordering is by the text form of each value (byte order of UTF-8, which is
/// code point order).
pub fn sorted_distinct<'a>(
    values: impl IntoIterator<Item = Option<&'a str>>,
    placeholder: &str,
) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.unwrap_or(placeholder))
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Value to code mapping of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub column: String,
    /// Distinct values; a value's index is its code.
    values: Vec<String>,
    placeholder: String,
}

impl ColumnMapping {
    /// Build the mapping of a column from its cells.
    pub fn build<'a>(
        column: impl Into<String>,
        cells: impl IntoIterator<Item = Option<&'a str>>,
        placeholder: &str,
    ) -> Self {
        Self {
            column: column.into(),
            values: sorted_distinct(cells, placeholder),
            placeholder: placeholder.to_string(),
        }
    }

    /// Code of a cell, or [`UNMAPPED_CODE`] for a value never seen.
    pub fn code_of(&self, cell: Option<&str>) -> i64 {
        let key = cell.unwrap_or(&self.placeholder);
        self.values
            .binary_search_by(|probe| probe.as_str().cmp(key))
            .map(|idx| idx as i64)
            .unwrap_or(UNMAPPED_CODE)
    }

    /// Value carried by a code.
    pub fn value_of(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }

    /// `(value, code)` pairs in code order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(code, value)| (value.as_str(), code as i64))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Build a mapping with the default missing placeholder.
pub fn build_mapping<'a>(
    column: impl Into<String>,
    cells: impl IntoIterator<Item = Option<&'a str>>,
) -> ColumnMapping {
    ColumnMapping::build(column, cells, MISSING_PLACEHOLDER)
}

/// Encode one cell.
pub fn encode(cell: Option<&str>, mapping: &ColumnMapping) -> i64 {
    mapping.code_of(cell)
}

/// One row of the audit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub column: String,
    pub value: String,
    pub code: i64,
}

/// All mappings of an encoding run, flattened for persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTable {
    pub mappings: Vec<ColumnMapping>,
}

impl AuditTable {
    /// Rows in column order, then code order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.mappings
            .iter()
            .flat_map(|mapping| {
                mapping.entries().map(|(value, code)| AuditEntry {
                    column: mapping.column.clone(),
                    value: value.to_string(),
                    code,
                })
            })
            .collect()
    }

    pub fn mapping(&self, column: &str) -> Option<&ColumnMapping> {
        self.mappings.iter().find(|m| m.column == column)
    }

    /// The audit table as a three-column frame: `column`, `value`, `code`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let entries = self.entries();
        let columns: Vec<&str> = entries.iter().map(|e| e.column.as_str()).collect();
        let values: Vec<&str> = entries.iter().map(|e| e.value.as_str()).collect();
        let codes: Vec<i64> = entries.iter().map(|e| e.code).collect();

        Ok(DataFrame::new(vec![
            Column::new("column".into(), columns),
            Column::new("value".into(), values),
            Column::new("code".into(), codes),
        ])?)
    }
}

/// Encodes every column after the first into integer codes.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    placeholder: String,
}

impl Default for CategoricalEncoder {
    fn default() -> Self {
        Self::new(MISSING_PLACEHOLDER)
    }
}

impl CategoricalEncoder {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    /// Encode the table, leaving the first (identifier) column untouched.
    pub fn encode_table(&self, df: DataFrame) -> Result<(DataFrame, AuditTable)> {
        let mut df = df;
        let names = column_names(&df);
        let Some((identifier, columns)) = names.split_first() else {
            return Err(ProcessingError::EmptyTable);
        };
        debug!("Leaving identifier column '{}' unencoded", identifier);

        let mut audit = AuditTable::default();
        for name in columns {
            let cells = text_values(df.column(name)?.as_materialized_series())?;
            let mapping = ColumnMapping::build(
                name.as_str(),
                cells.iter().map(|c| c.as_deref()),
                &self.placeholder,
            );
            let codes: Vec<i64> = cells
                .iter()
                .map(|cell| mapping.code_of(cell.as_deref()))
                .collect();

            debug!("Encoded '{}' with {} codes", name, mapping.len());
            df.replace(name, Series::new(name.as_str().into(), codes))?;
            audit.mappings.push(mapping);
        }

        info!(
            "Encoded {} columns ({} audit rows)",
            audit.mappings.len(),
            audit.mappings.iter().map(ColumnMapping::len).sum::<usize>()
        );
        Ok((df, audit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mapping_scenario() {
        let cells = [Some("b"), Some("a"), None, Some("a")];
        let mapping = build_mapping("cal1", cells);

        let entries: Vec<(&str, i64)> = mapping.entries().collect();
        assert_eq!(entries, vec![("NaN", 0), ("a", 1), ("b", 2)]);

        let codes: Vec<i64> = cells.iter().map(|c| encode(*c, &mapping)).collect();
        assert_eq!(codes, vec![2, 1, 0, 1]);
    }

    #[test]
    fn test_unmapped_value() {
        let mapping = build_mapping("sexo", [Some("HOMBRE"), Some("MUJER")]);
        assert_eq!(encode(Some("OTRO"), &mapping), UNMAPPED_CODE);
        // The placeholder was never observed, so a missing cell is unmapped too.
        assert_eq!(encode(None, &mapping), UNMAPPED_CODE);
    }

    #[test]
    fn test_sorted_by_text_form() {
        let distinct = sorted_distinct(
            [Some("10"), Some("9"), Some("+1 year"), Some("1 week")],
            MISSING_PLACEHOLDER,
        );
        assert_eq!(distinct, vec!["+1 year", "1 week", "10", "9"]);
    }

    #[test]
    fn test_mapping_is_deterministic_and_dense() {
        let a = build_mapping("x", [Some("z"), Some("y"), Some("z"), None]);
        let b = build_mapping("x", [None, Some("z"), Some("y")]);
        assert_eq!(a, b);

        let codes: Vec<i64> = a.entries().map(|(_, code)| code).collect();
        assert_eq!(codes, (0..a.len() as i64).collect::<Vec<_>>());
        for (value, code) in a.entries() {
            assert_eq!(a.value_of(code), Some(value));
        }
    }

    #[test]
    fn test_encode_table_skips_identifier() {
        let df = df! {
            "folio" => ["F1", "F2", "F3"],
            "sexo" => [Some("MUJER"), Some("HOMBRE"), None],
            "cal1" => [Some("9"), Some("10"), Some("9")],
        }
        .unwrap();

        let (encoded, audit) = CategoricalEncoder::default().encode_table(df).unwrap();

        assert_eq!(encoded.column("folio").unwrap().dtype(), &DataType::String);
        let sexo: Vec<Option<i64>> = encoded
            .column("sexo")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(sexo, vec![Some(1), Some(0), Some(2)]);

        let rows = audit.entries();
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[0],
            AuditEntry {
                column: "sexo".to_string(),
                value: "HOMBRE".to_string(),
                code: 0,
            }
        );
        assert_eq!(rows[3].column, "cal1");
        assert_eq!(rows[3].value, "10");

        let frame = audit.to_dataframe().unwrap();
        assert_eq!(frame.shape(), (5, 3));
        assert_eq!(column_names(&frame), vec!["column", "value", "code"]);
    }
}
