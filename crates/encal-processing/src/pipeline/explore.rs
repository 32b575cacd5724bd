//! Stage 1: diacritic-free copy of the survey plus a per-column summary.

use polars::prelude::*;
use tracing::info;

use crate::error::{ProcessingError, Result, ResultExt};
use crate::profiler::DataProfiler;
use crate::text::normalize_table;
use crate::types::ExplorationResult;

/// Strip diacritics from headers and text cells, then summarize each column.
pub fn explore(df: DataFrame) -> Result<ExplorationResult> {
    if df.width() == 0 {
        return Err(ProcessingError::EmptyTable);
    }

    info!("Exploring table {:?}", df.shape());
    let data = normalize_table(df).context("Stripping diacritics")?;
    let summaries = DataProfiler::summarize(&data).context("Summarizing columns")?;

    info!("Summarized {} columns", summaries.len());
    Ok(ExplorationResult { data, summaries })
}
