//! The encoding pipeline and its builder.

use polars::prelude::*;
use tracing::{debug, info};

use crate::cleaner::{drop_constant_columns, drop_duplicate_columns, replace_sentinels};
use crate::config::PipelineConfig;
use crate::encoding::{CategoricalEncoder, bucketize_column};
use crate::error::{ProcessingError, Result, ResultExt};
use crate::text::normalize_table;
use crate::types::{EncodingResult, EncodingSummary};
use crate::utils::has_column;

/// Stage 2: turns the cleaned survey into an integer-coded table.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use encal_processing::{Pipeline, PipelineConfig, load_csv_as_text};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().drop_column("ola").build()?)
///     .build()?
///     .process(load_csv_as_text(path)?)?;
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    encoder: CategoricalEncoder,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every Stage 2 step in order.
    ///
    /// Diacritics, sentinels, duplicate columns, bucketing, constant columns,
    /// encoding. Constants are looked for after bucketing since a bucketed
    /// column can collapse to a single label.
    pub fn process(&self, df: DataFrame) -> Result<EncodingResult> {
        if df.width() == 0 {
            return Err(ProcessingError::EmptyTable);
        }

        let mut summary = EncodingSummary {
            shape_before: df.shape(),
            ..Default::default()
        };
        info!("Starting encoding pipeline on {:?}", summary.shape_before);

        info!("Step 1: Stripping diacritics...");
        let df = normalize_table(df).context("Stripping diacritics")?;

        info!("Step 2: Normalizing missing-value sentinels...");
        let (df, replaced) = replace_sentinels(df, &self.config.missing_sentinels)
            .context("Normalizing sentinels")?;
        summary.sentinel_replacements = replaced;

        info!("Step 3: Removing duplicate columns...");
        let (df, pairs) = drop_duplicate_columns(df).context("Removing duplicate columns")?;
        summary.duplicate_pairs = pairs;

        info!("Step 4: Bucketing numeric columns...");
        let mut df = df;
        for rule in &self.config.bucket_rules {
            if !has_column(&df, &rule.column) {
                debug!("No '{}' column, skipping its bucket rule", rule.column);
                continue;
            }
            df = bucketize_column(df, &rule.column, &rule.spec)
                .context(format!("Bucketing '{}'", rule.column))?;
            summary.bucketized.push(rule.column.clone());
        }

        info!("Step 5: Removing constant columns...");
        let (df, dropped) = drop_constant_columns(
            df,
            &self.config.protected_columns,
            &self.config.drop_columns,
        )
        .context("Removing constant columns")?;
        summary.dropped_columns = dropped;

        info!("Step 6: Encoding categories...");
        let (data, audit) = self.encoder.encode_table(df).context("Encoding")?;
        summary.encoded_columns = audit.mappings.len();
        summary.shape_after = data.shape();

        info!(
            "Encoding complete: {:?} -> {:?}",
            summary.shape_before, summary.shape_after
        );
        Ok(EncodingResult {
            data,
            audit,
            summary,
        })
    }
}

/// Builder for [`Pipeline`].
#[derive(Debug, Default)]
#[must_use]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let encoder = CategoricalEncoder::new(config.missing_placeholder.clone());
        Ok(Pipeline { config, encoder })
    }
}
