//! Shared utilities for the processing stages.
//!
//! This module contains helpers used across modules: dtype checks, the
//! parse-or-default numeric policy and text/number views of Series.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
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
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType holds text.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Owned column names of a DataFrame, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Whether the DataFrame has a column with this name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Value used when a cell cannot be read as a number.
pub const DEFAULT_NUMERIC_VALUE: f64 = 0.0;

/// Parse a cell as a number, falling back to [`DEFAULT_NUMERIC_VALUE`].
///
/// Missing cells, empty text, non-numeric text and textual NaN all coerce to
/// the default. Infinities are kept.
pub fn parse_or_default(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| !v.is_nan())
        .unwrap_or(DEFAULT_NUMERIC_VALUE)
}

// =============================================================================
// Series Views
// =============================================================================

/// Read any Series as text cells, keeping missing cells as `None`.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let as_text = series.cast(&DataType::String)?;
    Ok(as_text
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Read any Series as floats. Cells that cannot be cast become `None`.
pub fn float_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let as_float = series.cast(&DataType::Float64)?;
    Ok(as_float.f64()?.into_iter().collect())
}

/// Read a named column as floats.
pub fn column_floats(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    float_values(df.column(name)?.as_materialized_series())
}

/// Number of distinct non-missing values of a Series.
pub fn distinct_non_null(series: &Series) -> PolarsResult<usize> {
    series.drop_nulls().n_unique()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_has_column() {
        let df = df! { "edad" => [1i64] }.unwrap();
        assert!(has_column(&df, "edad"));
        assert!(!has_column(&df, "sexo"));
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or_default(Some("42")), 42.0);
        assert_eq!(parse_or_default(Some(" 7.5 ")), 7.5);
        assert_eq!(parse_or_default(Some("-3")), -3.0);
        assert_eq!(parse_or_default(Some("")), DEFAULT_NUMERIC_VALUE);
        assert_eq!(parse_or_default(Some("sin dato")), DEFAULT_NUMERIC_VALUE);
        assert_eq!(parse_or_default(Some("NaN")), DEFAULT_NUMERIC_VALUE);
        assert_eq!(parse_or_default(None), DEFAULT_NUMERIC_VALUE);
        assert_eq!(parse_or_default(Some("inf")), f64::INFINITY);
    }

    #[test]
    fn test_text_values_keeps_nulls() {
        let series = Series::new("s".into(), &[Some(1i64), None, Some(3)]);
        let values = text_values(&series).unwrap();
        assert_eq!(
            values,
            vec![Some("1".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn test_float_values_from_text() {
        let series = Series::new("s".into(), &[Some("1.5"), Some("x"), None]);
        let values = float_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.5), None, None]);
    }

    #[test]
    fn test_distinct_non_null() {
        let series = Series::new("s".into(), &[Some("a"), None, Some("a"), Some("b")]);
        assert_eq!(distinct_non_null(&series).unwrap(), 2);
    }
}
