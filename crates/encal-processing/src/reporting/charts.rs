//! Chart documents.
//!
//! Charts are emitted as data, not images: each [`Chart`] carries the
//! numbers a plotting front end needs, and a [`ChartDocument`] is an ordered
//! list of pages written as pretty JSON.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, ResultExt};
use crate::profiler::statistics::{FiveNumberSummary, HistogramBin};

/// One named series of a grouped bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Box plot of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxGroup {
    pub label: String,
    pub summary: FiveNumberSummary,
}

/// Plot payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Bar {
        categories: Vec<String>,
        values: Vec<f64>,
    },
    GroupedBar {
        categories: Vec<String>,
        series: Vec<BarSeries>,
    },
    BoxPlot {
        groups: Vec<BoxGroup>,
    },
    Heatmap {
        x_labels: Vec<String>,
        y_labels: Vec<String>,
        /// Row-major; `None` where the value is undefined.
        values: Vec<Vec<Option<f64>>>,
    },
    Histogram {
        bins: Vec<HistogramBin>,
    },
}

/// A titled chart with axis labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: ChartData,
}

impl Chart {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        data: ChartData,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            data,
        }
    }
}

/// Ordered collection of charts saved as one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    pub title: String,
    pub generated_at: String,
    pub pages: Vec<Chart>,
}

impl ChartDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            pages: Vec::new(),
        }
    }

    pub fn push(&mut self, chart: Chart) {
        self.pages.push(chart);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Write the document as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
        }

        let mut file = File::create(path).context(format!("Creating {}", path.display()))?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())
            .context(format!("Writing {}", path.display()))?;

        info!("Saved {} charts to {}", self.pages.len(), path.display());
        Ok(())
    }
}
