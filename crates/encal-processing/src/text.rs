//! Diacritic stripping for headers and text cells.
//!
//! Text is decomposed with NFKD and every character carrying a non-zero
//! canonical combining class is dropped, so `"Satisfacción"` becomes
//! `"Satisfaccion"` and `"AÑO"` becomes `"ANO"`. Non-text cells are never
//! touched.

use polars::prelude::*;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::canonical_combining_class;

use crate::error::{Result, ResultExt};
use crate::utils::{column_names, is_text_dtype};

/// Remove diacritical marks from a string.
pub fn strip_diacritics(text: &str) -> String {
    text.nfkd()
        .filter(|c| canonical_combining_class(*c) == 0)
        .collect()
}

/// Strip diacritics from every column name.
///
/// Fails if two names collapse onto the same stripped name.
pub fn normalize_headers(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    let stripped: Vec<String> = column_names(&df)
        .iter()
        .map(|name| strip_diacritics(name))
        .collect();

    df.set_column_names(stripped.iter().map(String::as_str))
        .context("Stripping diacritics from column names")?;
    Ok(df)
}

/// Strip diacritics from the cells of every text column.
pub fn normalize_text_cells(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    let mut touched = 0usize;

    for name in column_names(&df) {
        let series = df.column(&name)?.as_materialized_series();
        if !is_text_dtype(series.dtype()) {
            continue;
        }

        let values = series.cast(&DataType::String)?;
        let mut changed = false;
        let stripped: Vec<Option<String>> = values
            .str()?
            .into_iter()
            .map(|cell| {
                cell.map(|text| {
                    let out = strip_diacritics(text);
                    if out != text {
                        changed = true;
                    }
                    out
                })
            })
            .collect();

        if changed {
            touched += 1;
            df.replace(&name, Series::new(name.as_str().into(), stripped))?;
        }
    }

    debug!("Stripped diacritics in {} text columns", touched);
    Ok(df)
}

/// Strip diacritics from headers and text cells.
pub fn normalize_table(df: DataFrame) -> Result<DataFrame> {
    normalize_text_cells(normalize_headers(df)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("Satisfacción"), "Satisfaccion");
        assert_eq!(strip_diacritics("AÑO"), "ANO");
        assert_eq!(strip_diacritics("pingüino"), "pinguino");
        assert_eq!(strip_diacritics("plain text 123"), "plain text 123");
        assert_eq!(strip_diacritics(""), "");
    }

    #[test]
    fn test_strip_diacritics_is_idempotent() {
        let once = strip_diacritics("Atención médica");
        assert_eq!(strip_diacritics(&once), once);
    }

    #[test]
    fn test_normalize_table() {
        let df = df! {
            "folio" => [1i64, 2],
            "opinión" => ["Sí", "Bueno"],
        }
        .unwrap();

        let out = normalize_table(df).unwrap();
        assert_eq!(column_names(&out), vec!["folio", "opinion"]);

        let cells: Vec<Option<&str>> = out
            .column("opinion")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(cells, vec![Some("Si"), Some("Bueno")]);
        assert_eq!(out.column("folio").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_normalize_headers_collision_fails() {
        let df = df! {
            "año" => [1i64],
            "ano" => [2i64],
        }
        .unwrap();

        assert!(normalize_headers(df).is_err());
    }
}
