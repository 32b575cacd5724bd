//! Report generation module.
//!
//! This module writes the tables and chart documents each stage produces.
//!
//! # Example
//!
//! ```rust,ignore
//! use encal_processing::reporting::{ReportGenerator, column_overview};
//!
//! let generator = ReportGenerator::new("outputs");
//! generator.save_column_summary(&result.summaries)?;
//! generator.save_charts(&column_overview(&result.summaries), EXPLORATION_CHARTS_FILE)?;
//! ```

pub mod charts;
pub mod exploration;
mod generator;

pub use charts::{BarSeries, BoxGroup, Chart, ChartData, ChartDocument};
pub use exploration::{
    HISTOGRAM_BINS, box_plot_chart, correlation_heatmap, count_chart, grouped_count_chart,
    histogram_chart, mean_chart, training_charts,
};
pub use generator::{
    CATEGORICAL_MAPPING_FILE, COLUMN_SUMMARY_FILE, EXPLORATION_CHARTS_FILE, NUMERIC_DATA_FILE,
    ReportGenerator, WITHOUT_ACCENTS_FILE, column_overview,
};
