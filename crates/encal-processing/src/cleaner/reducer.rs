//! Column reduction: duplicate and constant column removal.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::utils::{column_names, distinct_non_null};

/// Two columns with identical cells; `drop` is removed and `keep` stays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicatePair {
    pub keep: String,
    pub drop: String,
}

/// Find columns whose cells equal those of an earlier column.
///
/// Columns are compared pairwise in ascending order with missing equal to
/// missing. A column already marked for dropping is not compared again, so
/// the kept column of every pair is always the earliest of its group.
pub fn find_duplicate_columns(df: &DataFrame) -> Result<Vec<DuplicatePair>> {
    let names = column_names(df);
    let columns: Vec<&Series> = df
        .get_columns()
        .iter()
        .map(Column::as_materialized_series)
        .collect();

    let mut dropped = vec![false; columns.len()];
    let mut pairs = Vec::new();

    for i in 0..columns.len() {
        if dropped[i] {
            continue;
        }
        for j in (i + 1)..columns.len() {
            if dropped[j] {
                continue;
            }
            if columns[i].equals_missing(columns[j]) {
                debug!("Column '{}' duplicates '{}'", names[j], names[i]);
                dropped[j] = true;
                pairs.push(DuplicatePair {
                    keep: names[i].clone(),
                    drop: names[j].clone(),
                });
            }
        }
    }

    Ok(pairs)
}

/// Drop duplicated columns, keeping the earliest of each group.
pub fn drop_duplicate_columns(df: DataFrame) -> Result<(DataFrame, Vec<DuplicatePair>)> {
    let pairs = find_duplicate_columns(&df)?;
    if pairs.is_empty() {
        return Ok((df, pairs));
    }

    let to_drop: Vec<PlSmallStr> = pairs.iter().map(|p| p.drop.as_str().into()).collect();
    let df = df.drop_many(to_drop);

    info!("Removed {} duplicate columns", pairs.len());
    Ok((df, pairs))
}

/// Names of columns holding exactly one distinct non-missing value.
///
/// A column with no values at all is not constant.
pub fn find_constant_columns(df: &DataFrame) -> Result<Vec<String>> {
    let mut constants = Vec::new();
    for column in df.get_columns() {
        if distinct_non_null(column.as_materialized_series())? == 1 {
            constants.push(column.name().to_string());
        }
    }
    Ok(constants)
}

/// Drop explicitly listed columns and every constant column not in `protect`.
///
/// Listed columns missing from the table are skipped. Returns the table and
/// the dropped names, listed columns first, then constants in column order.
pub fn drop_constant_columns(
    df: DataFrame,
    protect: &[String],
    always_drop: &[String],
) -> Result<(DataFrame, Vec<String>)> {
    let present = column_names(&df);
    let mut dropped: Vec<String> = Vec::new();

    for name in always_drop {
        if present.contains(name) {
            dropped.push(name.clone());
        } else {
            debug!("Listed column '{}' not present, nothing to drop", name);
        }
    }

    for name in find_constant_columns(&df)? {
        if protect.contains(&name) {
            debug!("Keeping protected constant column '{}'", name);
        } else if !dropped.contains(&name) {
            dropped.push(name);
        }
    }

    if dropped.is_empty() {
        return Ok((df, dropped));
    }

    let to_drop: Vec<PlSmallStr> = dropped.iter().map(|s| s.as_str().into()).collect();
    let df = df.drop_many(to_drop);

    info!("Removed columns: {:?}", dropped);
    Ok((df, dropped))
}
