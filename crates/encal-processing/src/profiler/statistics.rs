//! Descriptive statistics behind the exploratory charts.
//!
//! Counting, grouping and correlation run as Polars queries. Quantiles and
//! histograms work on plain slices.

use std::cmp::Ordering;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::text_values;

const KEY: &str = "key";
const HUE: &str = "hue";
const VALUE: &str = "value";
const COUNT: &str = "count";
const LEFT: &str = "left";
const RIGHT: &str = "right";
const CORRELATION: &str = "correlation";

/// Min, quartiles and max of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub count: usize,
}

/// One equal-width histogram bin; the last bin also holds its upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Linear-interpolated quantile of an ascending slice.
pub fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Five-number summary, or `None` for an empty sample.
pub fn five_number_summary(values: &[f64]) -> Option<FiveNumberSummary> {
    let sorted = sorted_finite(values);
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    Some(FiveNumberSummary {
        min,
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max,
        count: sorted.len(),
    })
}

/// Equal-width histogram over the sample range.
///
/// A sample with a single distinct value is spread over `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let sorted = sorted_finite(values);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    let bin_count = bins.max(1);
    let (low, high) = if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };

    let width = (high - low) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    for value in &sorted {
        let index = (((value - low) / width) as usize).min(bin_count - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: low + idx as f64 * width,
            end: low + (idx as f64 + 1.0) * width,
            count,
        })
        .collect()
}

/// Pearson correlation between two columns over the rows where both are
/// present.
///
/// `None` when fewer than two complete rows exist or either side is constant.
pub fn pearson(df: &DataFrame, x: &str, y: &str) -> PolarsResult<Option<f64>> {
    let out = df
        .clone()
        .lazy()
        .select([
            col(x).cast(DataType::Float64).alias(LEFT),
            col(y).cast(DataType::Float64).alias(RIGHT),
        ])
        .filter(col(LEFT).is_not_null().and(col(RIGHT).is_not_null()))
        .select([pearson_corr(col(LEFT), col(RIGHT)).alias(CORRELATION)])
        .collect()?;

    let r = out
        .column(CORRELATION)?
        .as_materialized_series()
        .f64()?
        .get(0);
    Ok(r.filter(|r| r.is_finite()).map(|r| r.clamp(-1.0, 1.0)))
}

/// Pairwise Pearson matrix; the diagonal is 1 for any non-constant column.
pub fn correlation_matrix(
    df: &DataFrame,
    columns: &[String],
) -> PolarsResult<Vec<Vec<Option<f64>>>> {
    let size = columns.len();
    let mut values = vec![vec![None; size]; size];
    for i in 0..size {
        for j in i..size {
            let r = pearson(df, &columns[i], &columns[j])?;
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(values)
}

/// Order category labels numerically when both parse as numbers, else as text.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn counts_of(column: &Column) -> PolarsResult<Vec<Option<usize>>> {
    let counts = column.cast(&DataType::UInt64)?;
    Ok(counts
        .as_materialized_series()
        .u64()?
        .into_iter()
        .map(|c| c.map(|c| c as usize))
        .collect())
}

/// Occurrences of each present value of a Series, in label order.
pub fn value_counts(series: &Series) -> PolarsResult<Vec<(String, usize)>> {
    let present = series.drop_nulls().with_name(KEY.into());
    if present.is_empty() {
        return Ok(Vec::new());
    }

    let counts = present.value_counts(false, false, COUNT.into(), false)?;
    let labels = text_values(counts.column(KEY)?.as_materialized_series())?;
    let mut out: Vec<(String, usize)> = labels
        .into_iter()
        .zip(counts_of(counts.column(COUNT)?)?)
        .filter_map(|(label, count)| Some((label?, count?)))
        .collect();
    out.sort_by(|a, b| compare_labels(&a.0, &b.0));
    Ok(out)
}

/// `group` as text and `value` as float, restricted to rows where both exist.
fn keyed(df: &DataFrame, group: &str, value: &str) -> LazyFrame {
    df.clone()
        .lazy()
        .select([
            col(group).cast(DataType::String).alias(KEY),
            col(value).cast(DataType::Float64).alias(VALUE),
        ])
        .filter(col(KEY).is_not_null().and(col(VALUE).is_not_null()))
}

/// Present values of `value` for every present value of `group`, in label order.
pub fn group_values(
    df: &DataFrame,
    group: &str,
    value: &str,
) -> PolarsResult<Vec<(String, Vec<f64>)>> {
    let grouped = keyed(df, group, value)
        .group_by([col(KEY)])
        .agg([col(VALUE)])
        .collect()?;

    let keys = text_values(grouped.column(KEY)?.as_materialized_series())?;
    let lists = grouped.column(VALUE)?.as_materialized_series().list()?;

    let mut out = Vec::with_capacity(keys.len());
    for (key, values) in keys.into_iter().zip(lists.into_iter()) {
        let (Some(key), Some(values)) = (key, values) else {
            continue;
        };
        out.push((key, values.f64()?.into_no_null_iter().collect()));
    }
    out.sort_by(|a, b| compare_labels(&a.0, &b.0));
    Ok(out)
}

/// Mean of `value` for every present value of `group`, in label order.
pub fn group_means(df: &DataFrame, group: &str, value: &str) -> PolarsResult<Vec<(String, f64)>> {
    let grouped = keyed(df, group, value)
        .group_by([col(KEY)])
        .agg([col(VALUE).mean()])
        .collect()?;

    let keys = text_values(grouped.column(KEY)?.as_materialized_series())?;
    let means = grouped.column(VALUE)?.as_materialized_series().f64()?;
    let mut out: Vec<(String, f64)> = keys
        .into_iter()
        .zip(means.into_iter())
        .filter_map(|(key, mean)| Some((key?, mean?)))
        .collect();
    out.sort_by(|a, b| compare_labels(&a.0, &b.0));
    Ok(out)
}

/// Row counts for every present `(category, hue)` pair.
pub fn pair_counts(
    df: &DataFrame,
    category: &str,
    hue: &str,
) -> PolarsResult<Vec<(String, String, usize)>> {
    let grouped = df
        .clone()
        .lazy()
        .select([
            col(category).cast(DataType::String).alias(KEY),
            col(hue).cast(DataType::String).alias(HUE),
        ])
        .filter(col(KEY).is_not_null().and(col(HUE).is_not_null()))
        .group_by([col(KEY), col(HUE)])
        .agg([len().alias(COUNT)])
        .collect()?;

    let keys = text_values(grouped.column(KEY)?.as_materialized_series())?;
    let hues = text_values(grouped.column(HUE)?.as_materialized_series())?;
    let counts = counts_of(grouped.column(COUNT)?)?;
    Ok(keys
        .into_iter()
        .zip(hues)
        .zip(counts)
        .filter_map(|((key, hue), count)| Some((key?, hue?, count?)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_five_number_summary() {
        let summary = five_number_summary(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.count, 5);
        assert!(five_number_summary(&[]).is_none());
    }

    #[test]
    fn test_histogram_counts_everything() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram(&values, 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins[0].start, 0.0);
        assert!((bins[19].end - 99.0).abs() < 1e-9);
        // The maximum lands in the last bin.
        assert!(bins[19].count >= 1);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&[3.0, 3.0], 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(bins[0].start, 2.5);
    }

    #[test]
    fn test_pearson_skips_incomplete_rows() {
        let df = df! {
            "x" => [Some(1.0), Some(2.0), Some(3.0), None],
            "y" => [Some(2.0), Some(4.0), Some(6.0), Some(1.0)],
            "flat" => [Some(1.0), Some(1.0), Some(1.0), Some(1.0)],
        }
        .unwrap();
        let r = pearson(&df, "x", "y").unwrap().unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!(pearson(&df, "x", "flat").unwrap().is_none());
    }

    #[test]
    fn test_correlation_matrix_is_symmetric() {
        let df = df! {
            "a" => [1i64, 2, 3],
            "b" => [3i64, 1, 2],
        }
        .unwrap();
        let m = correlation_matrix(&df, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(m[0][1], m[1][0]);
        assert!((m[0][1].unwrap() + 0.5).abs() < 1e-12);
        assert!((m[0][0].unwrap() - 1.0).abs() < 1e-12);
    }

    fn grouped() -> DataFrame {
        df! {
            "key" => [Some("10"), Some("2"), Some("2"), Some("1"), None],
            "value" => [Some(1.0), Some(2.0), None, Some(4.0), Some(8.0)],
        }
        .unwrap()
    }

    #[test]
    fn test_groups_in_numeric_order() {
        let groups = group_values(&grouped(), "key", "value").unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.0.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "10"]);
        assert_eq!(groups[1].1, vec![2.0]);

        let means = group_means(&grouped(), "key", "value").unwrap();
        assert_eq!(
            means,
            vec![
                ("1".to_string(), 4.0),
                ("2".to_string(), 2.0),
                ("10".to_string(), 1.0)
            ]
        );
    }

    #[test]
    fn test_value_counts_skip_missing() {
        let df = grouped();
        let counts = value_counts(df.column("key").unwrap().as_materialized_series()).unwrap();
        assert_eq!(
            counts,
            vec![
                ("1".to_string(), 1),
                ("2".to_string(), 2),
                ("10".to_string(), 1)
            ]
        );

        let empty = Series::new("key".into(), [None::<i64>, None]);
        assert!(value_counts(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_pair_counts() {
        let df = df! {
            "entidad" => [4i64, 4, 7, 7, 4],
            "clase" => [0i64, 1, 1, 1, 0],
        }
        .unwrap();
        let mut counts = pair_counts(&df, "entidad", "clase").unwrap();
        counts.sort();
        assert_eq!(
            counts,
            vec![
                ("4".to_string(), "0".to_string(), 2),
                ("4".to_string(), "1".to_string(), 1),
                ("7".to_string(), "1".to_string(), 2)
            ]
        );
    }
}
