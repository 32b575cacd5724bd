//! Sentinel normalization: survey answers that mean "no data" become null.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::utils::{column_names, is_text_dtype};

/// Replace every text cell that equals a sentinel with null.
///
/// Matching is exact (no trimming, case-sensitive), so `"NO SABE/NO RESPONDE"`
/// and `"NO SABE/ NO RESPONDE"` must both be listed to catch both spellings.
/// Returns the table and the number of replaced cells.
pub fn replace_sentinels(df: DataFrame, sentinels: &[String]) -> Result<(DataFrame, usize)> {
    let mut df = df;
    let patterns: HashSet<&str> = sentinels.iter().map(String::as_str).collect();
    let mut total_replacements = 0;

    for name in column_names(&df) {
        let series = df.column(&name)?.as_materialized_series();
        if !is_text_dtype(series.dtype()) {
            continue;
        }

        let (cleaned, count) = replace_with_null(series, &patterns)?;
        if count > 0 {
            debug!("'{}': {} sentinel cells set to null", name, count);
            total_replacements += count;
            df.replace(&name, cleaned)?;
        }
    }

    debug!("Replaced {} sentinel values with null", total_replacements);
    Ok((df, total_replacements))
}

/// Null out the cells of a text series that match one of `patterns`.
pub(crate) fn replace_with_null(
    series: &Series,
    patterns: &HashSet<&str>,
) -> Result<(Series, usize)> {
    let as_text = series.cast(&DataType::String)?;
    let mut replacement_count = 0;

    let cleaned: Vec<Option<&str>> = as_text
        .str()?
        .into_iter()
        .map(|cell| match cell {
            Some(val) if patterns.contains(val) => {
                replacement_count += 1;
                None
            }
            other => other,
        })
        .collect();

    Ok((Series::new(series.name().clone(), cleaned), replacement_count))
}
