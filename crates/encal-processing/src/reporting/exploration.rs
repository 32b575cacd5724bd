//! Exploratory charts over an encoded table.
//!
//! Each builder reads the columns it needs from a DataFrame and returns a
//! [`Chart`]. [`training_charts`] assembles the Stage 3 battery, skipping any
//! chart whose columns are absent.

use polars::prelude::*;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::profiler::statistics::{
    compare_labels, correlation_matrix, five_number_summary, group_means, group_values, histogram,
    pair_counts, value_counts,
};
use crate::reporting::charts::{BarSeries, BoxGroup, Chart, ChartData, ChartDocument};
use crate::utils::{column_floats, has_column, is_numeric_dtype};

/// Bins of the age histogram.
pub const HISTOGRAM_BINS: usize = 20;

fn require(df: &DataFrame, columns: &[&str]) -> Result<()> {
    match columns.iter().find(|c| !has_column(df, c)) {
        Some(missing) => Err(ProcessingError::ColumnNotFound(missing.to_string())),
        None => Ok(()),
    }
}

/// Bar chart with the number of rows per value of `column`.
pub fn count_chart(df: &DataFrame, column: &str, title: &str) -> Result<Chart> {
    require(df, &[column])?;
    let counts = value_counts(df.column(column)?.as_materialized_series())?;
    Ok(Chart::new(
        title,
        column,
        "Observations",
        ChartData::Bar {
            categories: counts.iter().map(|(label, _)| label.clone()).collect(),
            values: counts.iter().map(|(_, count)| *count as f64).collect(),
        },
    ))
}

/// Box plots of `value` for every value of `group`.
pub fn box_plot_chart(df: &DataFrame, value: &str, group: &str, title: &str) -> Result<Chart> {
    require(df, &[value, group])?;
    let groups = group_values(df, group, value)?
        .into_iter()
        .filter_map(|(label, values)| {
            five_number_summary(&values).map(|summary| BoxGroup { label, summary })
        })
        .collect();

    Ok(Chart::new(title, group, value, ChartData::BoxPlot { groups }))
}

/// Row counts per value of `category`, one series per value of `hue`.
pub fn grouped_count_chart(
    df: &DataFrame,
    category: &str,
    hue: &str,
    title: &str,
) -> Result<Chart> {
    require(df, &[category, hue])?;
    let pairs = pair_counts(df, category, hue)?;

    let mut category_names: Vec<String> = pairs.iter().map(|(c, _, _)| c.clone()).collect();
    category_names.sort_by(|a, b| compare_labels(a, b));
    category_names.dedup();
    let mut hue_names: Vec<String> = pairs.iter().map(|(_, h, _)| h.clone()).collect();
    hue_names.sort_by(|a, b| compare_labels(a, b));
    hue_names.dedup();

    let mut counts = vec![vec![0.0; category_names.len()]; hue_names.len()];
    for (cat, hue_value, count) in &pairs {
        let ci = category_names.iter().position(|c| c == cat);
        let hi = hue_names.iter().position(|h| h == hue_value);
        if let (Some(ci), Some(hi)) = (ci, hi) {
            counts[hi][ci] = *count as f64;
        }
    }

    let series = hue_names
        .into_iter()
        .zip(counts)
        .map(|(name, values)| BarSeries { name, values })
        .collect();

    Ok(Chart::new(
        title,
        category,
        "Observations",
        ChartData::GroupedBar {
            categories: category_names,
            series,
        },
    ))
}

/// Pearson correlation heatmap over every numeric column.
pub fn correlation_heatmap(df: &DataFrame, title: &str) -> Result<Chart> {
    let labels: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect();
    let values = correlation_matrix(df, &labels)?;

    Ok(Chart::new(
        title,
        "",
        "",
        ChartData::Heatmap {
            x_labels: labels.clone(),
            y_labels: labels,
            values,
        },
    ))
}

/// Mean of `value` for every value of `group`.
pub fn mean_chart(df: &DataFrame, value: &str, group: &str, title: &str) -> Result<Chart> {
    require(df, &[value, group])?;
    let (categories, values) = group_means(df, group, value)?.into_iter().unzip();

    Ok(Chart::new(
        title,
        group,
        format!("Mean {}", value),
        ChartData::Bar { categories, values },
    ))
}

/// Equal-width histogram of a numeric column.
pub fn histogram_chart(df: &DataFrame, column: &str, bins: usize, title: &str) -> Result<Chart> {
    require(df, &[column])?;
    let values: Vec<f64> = column_floats(df, column)?.into_iter().flatten().collect();
    Ok(Chart::new(
        title,
        column,
        "Frequency",
        ChartData::Histogram {
            bins: histogram(&values, bins),
        },
    ))
}

/// The Stage 3 exploratory battery.
///
/// `test` is the held-out partition (features and target), `full` the whole
/// encoded table. Charts whose columns are missing are skipped.
pub fn training_charts(full: &DataFrame, test: &DataFrame, target: &str) -> Result<ChartDocument> {
    let mut document = ChartDocument::new("Training exploration");

    if has_column(test, target) {
        document.push(count_chart(
            test,
            target,
            &format!("Distribution of {} in the test set", target),
        )?);
    }

    if has_column(test, target) && has_column(test, "edad") {
        document.push(box_plot_chart(
            test,
            "edad",
            target,
            &format!("Age by {}", target),
        )?);
    }

    if has_column(full, target) && has_column(full, "entidad") {
        document.push(grouped_count_chart(
            full,
            "entidad",
            target,
            &format!("Distribution of {} by entidad", target),
        )?);
    }

    if full.get_columns().iter().any(|c| is_numeric_dtype(c.dtype())) {
        document.push(correlation_heatmap(full, "Correlation of numeric columns")?);
    }

    if has_column(full, "cal1") && has_column(full, "edad") {
        document.push(box_plot_chart(full, "edad", "cal1", "Age vs satisfaction level")?);
    }

    if has_column(full, "sexo") && has_column(full, "cal1") {
        document.push(mean_chart(full, "cal1", "sexo", "Mean satisfaction by sex")?);
    }

    if has_column(full, "edad") {
        document.push(histogram_chart(full, "edad", HISTOGRAM_BINS, "Age distribution")?);
    }

    debug!("Built {} exploratory charts", document.len());
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encoded() -> DataFrame {
        df! {
            "folio" => ["F1", "F2", "F3", "F4", "F5", "F6"],
            "edad" => [20i64, 35, 50, 41, 29, 63],
            "sexo" => [0i64, 1, 0, 1, 0, 1],
            "cal1" => [2i64, 3, 3, 1, 2, 3],
            "entidad" => [4i64, 4, 7, 7, 4, 7],
            "FE_FinalNR" => [0i64, 1, 1, 0, 2, 1],
        }
        .unwrap()
    }

    #[test]
    fn test_full_battery() {
        let df = encoded();
        let doc = training_charts(&df, &df, "FE_FinalNR").unwrap();
        assert_eq!(doc.len(), 7);
        assert_eq!(doc.pages[0].title, "Distribution of FE_FinalNR in the test set");
        assert_eq!(doc.pages[6].title, "Age distribution");
    }

    #[test]
    fn test_missing_columns_are_skipped() {
        let df = df! {
            "folio" => ["F1", "F2"],
            "FE_FinalNR" => [0i64, 1],
        }
        .unwrap();
        let doc = training_charts(&df, &df, "FE_FinalNR").unwrap();
        // Class distribution and the correlation heatmap only.
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_count_chart() {
        let chart = count_chart(&encoded(), "FE_FinalNR", "t").unwrap();
        assert_eq!(
            chart.data,
            ChartData::Bar {
                categories: vec!["0".to_string(), "1".to_string(), "2".to_string()],
                values: vec![2.0, 3.0, 1.0],
            }
        );
    }

    #[test]
    fn test_grouped_counts() {
        let chart = grouped_count_chart(&encoded(), "entidad", "FE_FinalNR", "t").unwrap();
        let ChartData::GroupedBar { categories, series } = chart.data else {
            panic!("expected grouped bars");
        };
        assert_eq!(categories, vec!["4", "7"]);
        assert_eq!(series.len(), 3);
        assert_eq!(series[1].name, "1");
        assert_eq!(series[1].values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_mean_chart() {
        let chart = mean_chart(&encoded(), "cal1", "sexo", "t").unwrap();
        let ChartData::Bar { categories, values } = chart.data else {
            panic!("expected bars");
        };
        assert_eq!(categories, vec!["0", "1"]);
        assert!((values[0] - 7.0 / 3.0).abs() < 1e-12);
        assert!((values[1] - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_absent_column_is_reported() {
        let err = mean_chart(&encoded(), "cal1", "ola", "t").unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert!(err.to_string().contains("ola"));
    }

    #[test]
    fn test_box_plot_and_heatmap() {
        let df = encoded();
        let chart = box_plot_chart(&df, "edad", "cal1", "t").unwrap();
        let ChartData::BoxPlot { groups } = chart.data else {
            panic!("expected box plot");
        };
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "3"]);
        assert_eq!(groups[0].summary.median, 41.0);

        let heatmap = correlation_heatmap(&df, "t").unwrap();
        let ChartData::Heatmap { x_labels, values, .. } = heatmap.data else {
            panic!("expected heatmap");
        };
        // The text identifier is not numeric.
        assert_eq!(x_labels.len(), 5);
        assert_eq!(values.len(), 5);
    }
}
