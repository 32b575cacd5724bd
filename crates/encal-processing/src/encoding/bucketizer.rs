//! Range bucketing of numeric columns.
//!
//! A [`BucketSpec`] holds N+1 non-decreasing breakpoints and N labels. A
//! value `v` falls in bucket `i` when `b[i] < v <= b[i+1]`; the first bucket
//! also includes its lower bound. Cells that do not read as numbers are
//! bucketed as [`DEFAULT_NUMERIC_VALUE`], and values outside every bucket get
//! [`OUT_OF_RANGE_LABEL`].

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::utils::{DEFAULT_NUMERIC_VALUE, parse_or_default, text_values};

/// Label for values that fall outside every bucket.
pub const OUT_OF_RANGE_LABEL: &str = "NA";

/// Breakpoints and labels of a range bucketing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSpec {
    #[serde(with = "breakpoint_serde")]
    breakpoints: Vec<f64>,
    labels: Vec<String>,
}

impl BucketSpec {
    /// Build a validated spec.
    ///
    /// `column` is only used for the error message.
    pub fn new(
        column: &str,
        breakpoints: Vec<f64>,
        labels: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let spec = Self {
            breakpoints,
            labels: labels.into_iter().map(Into::into).collect(),
        };
        spec.validate(column)?;
        Ok(spec)
    }

    /// Build a spec from known-good constants without validating.
    pub(crate) fn from_parts(breakpoints: Vec<f64>, labels: &[&str]) -> Self {
        Self {
            breakpoints,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Days elapsed since an event, up to a year and beyond.
    pub fn days_since_event() -> Self {
        Self::from_parts(
            vec![f64::NEG_INFINITY, 7.0, 30.0, 90.0, 180.0, 365.0, f64::INFINITY],
            &["1 week", "1 month", "3 months", "6 months", "1 year", "+1 year"],
        )
    }

    /// Check the shape and ordering of the breakpoints.
    pub fn validate(&self, column: &str) -> Result<()> {
        let invalid = |reason: String| ProcessingError::InvalidBucketSpec {
            column: column.to_string(),
            reason,
        };

        if self.labels.is_empty() {
            return Err(invalid("at least one label is required".to_string()));
        }
        if self.breakpoints.len() != self.labels.len() + 1 {
            return Err(invalid(format!(
                "{} labels need {} breakpoints, got {}",
                self.labels.len(),
                self.labels.len() + 1,
                self.breakpoints.len()
            )));
        }
        if self.breakpoints.iter().any(|b| b.is_nan()) {
            return Err(invalid("breakpoints must not be NaN".to_string()));
        }
        if self.breakpoints.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid("breakpoints must be non-decreasing".to_string()));
        }
        Ok(())
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index of the bucket holding `value`, if any.
    pub fn bucket_of(&self, value: f64) -> Option<usize> {
        self.breakpoints
            .windows(2)
            .enumerate()
            .find(|(idx, bounds)| {
                let above_lower = value > bounds[0] || (*idx == 0 && value >= bounds[0]);
                above_lower && value <= bounds[1]
            })
            .map(|(idx, _)| idx)
    }

    /// Label for a raw cell.
    pub fn label_for(&self, raw: Option<&str>) -> &str {
        self.bucket_of(parse_or_default(raw))
            .and_then(|idx| self.labels.get(idx))
            .map(String::as_str)
            .unwrap_or(OUT_OF_RANGE_LABEL)
    }
}

/// Map raw cells to bucket labels.
///
/// The output has one label per input cell and never contains a missing
/// value.
pub fn bucketize<'a>(
    values: impl IntoIterator<Item = Option<&'a str>>,
    spec: &BucketSpec,
) -> Vec<String> {
    values
        .into_iter()
        .map(|raw| spec.label_for(raw).to_string())
        .collect()
}

/// Replace a column of `df` with its bucket labels.
pub fn bucketize_column(df: DataFrame, column: &str, spec: &BucketSpec) -> Result<DataFrame> {
    let mut df = df;
    let series = df
        .column(column)
        .map_err(|_| ProcessingError::ColumnNotFound(column.to_string()))?
        .as_materialized_series()
        .clone();

    let cells = text_values(&series)?;
    let coerced = cells
        .iter()
        .filter(|cell| {
            cell.as_deref()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .is_none_or(f64::is_nan)
        })
        .count();
    let labels = bucketize(cells.iter().map(|c| c.as_deref()), spec);

    debug!(
        "Bucketized '{}' into {} labels ({} cells read as {})",
        column,
        spec.labels().len(),
        coerced,
        DEFAULT_NUMERIC_VALUE
    );

    df.replace(column, Series::new(column.into(), labels))?;
    Ok(df)
}

/// Serde helpers that write infinite breakpoints as `"inf"` / `"-inf"`,
/// since JSON numbers cannot express them.
mod breakpoint_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Breakpoint {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(|v| {
                if v.is_infinite() {
                    Breakpoint::Text(if *v > 0.0 { "inf" } else { "-inf" }.to_string())
                } else {
                    Breakpoint::Number(*v)
                }
            })
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Breakpoint>::deserialize(deserializer)?
            .into_iter()
            .map(|b| match b {
                Breakpoint::Number(v) => Ok(v),
                Breakpoint::Text(text) => match text.trim().to_lowercase().as_str() {
                    "inf" | "+inf" | "infinity" => Ok(f64::INFINITY),
                    "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
                    other => Err(serde::de::Error::custom(format!(
                        "invalid breakpoint '{}'",
                        other
                    ))),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn short_days() -> BucketSpec {
        BucketSpec::new(
            "diascita",
            vec![f64::NEG_INFINITY, 7.0, 30.0, 90.0, 180.0, 365.0, f64::INFINITY],
            ["1sem", "1mes", "3mes", "6mes", "1anio", "+1anio"],
        )
        .unwrap()
    }

    #[test]
    fn test_days_scenario() {
        let labels = bucketize(
            [Some("-5"), Some("0"), Some("7"), Some("7.1"), Some("400")],
            &short_days(),
        );
        assert_eq!(labels, vec!["1sem", "1sem", "1sem", "1mes", "+1anio"]);
    }

    #[test]
    fn test_unparseable_reads_as_default() {
        let labels = bucketize([Some("abc"), None, Some(""), Some("NaN")], &short_days());
        assert_eq!(labels, vec!["1sem"; 4]);
    }

    #[test]
    fn test_first_interval_includes_lower_bound() {
        let spec = BucketSpec::new("x", vec![0.0, 40.0, 80.0], ["40", "80"]).unwrap();
        assert_eq!(spec.label_for(Some("0")), "40");
        assert_eq!(spec.label_for(Some("40")), "40");
        assert_eq!(spec.label_for(Some("40.5")), "80");
        assert_eq!(spec.label_for(Some("-1")), OUT_OF_RANGE_LABEL);
        assert_eq!(spec.label_for(Some("81")), OUT_OF_RANGE_LABEL);
        // Missing cells read as 0 and land in the closed first bucket.
        assert_eq!(spec.label_for(None), "40");
    }

    #[test]
    fn test_every_value_gets_a_label() {
        let spec = BucketSpec::days_since_event();
        for raw in ["-1e300", "1e300", "inf", "-inf", "12", "x"] {
            let label = spec.label_for(Some(raw));
            assert!(spec.labels().iter().any(|l| l == label), "{raw} -> {label}");
        }
    }

    #[test]
    fn test_validation() {
        assert!(BucketSpec::new("x", vec![0.0, 1.0], Vec::<String>::new()).is_err());
        assert!(BucketSpec::new("x", vec![0.0, 1.0], ["a", "b"]).is_err());
        assert!(BucketSpec::new("x", vec![1.0, 0.0], ["a"]).is_err());
        assert!(BucketSpec::new("x", vec![0.0, f64::NAN], ["a"]).is_err());

        let err = BucketSpec::new("edad", vec![2.0, 1.0], ["a"]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_BUCKET_SPEC");
        assert!(err.to_string().contains("edad"));
    }

    #[test]
    fn test_serde_keeps_infinite_breakpoints() {
        let spec = BucketSpec::days_since_event();
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"-inf\""));
        assert!(json.contains("\"inf\""));

        let back: BucketSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_bucketize_column() {
        let df = df! {
            "folio" => ["1", "2", "3"],
            "diascita" => [Some("3"), None, Some("200")],
        }
        .unwrap();

        let out = bucketize_column(df, "diascita", &BucketSpec::days_since_event()).unwrap();
        let labels: Vec<Option<&str>> = out
            .column("diascita")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(labels, vec![Some("1 week"), Some("1 week"), Some("1 year")]);
    }

    #[test]
    fn test_bucketize_missing_column() {
        let df = df! { "folio" => ["1"] }.unwrap();
        let err = bucketize_column(df, "edad", &BucketSpec::days_since_event()).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
