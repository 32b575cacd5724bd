//! ENCal Survey Processing Library
//!
//! Stages 1 and 2 of the ENCal survey preparation, built on Polars.
//!
//! # Overview
//!
//! - **Text Normalization**: diacritics stripped from headers and text cells
//! - **Profiling**: per-column dtype, distinct and missing counts
//! - **Cleaning**: survey sentinels to missing, duplicate and constant
//!   column removal
//! - **Encoding**: range bucketing of numeric columns and dense integer codes
//!   for every non-identifier column, with a persisted audit table
//! - **Reporting**: CSV tables and JSON chart documents
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use encal_processing::{Pipeline, PipelineConfig, ReportGenerator, explore};
//! use encal_processing::io::{load_csv, load_csv_as_text};
//!
//! // Stage 1
//! let mut explored = explore(load_csv(Path::new("survey.csv"))?)?;
//!
//! // Stage 2
//! let result = Pipeline::builder()
//!     .config(PipelineConfig::default())
//!     .build()?
//!     .process(load_csv_as_text(Path::new("outputs/1_without_accents.csv"))?)?;
//!
//! let generator = ReportGenerator::new("outputs");
//! generator.save_audit_table(&result.audit)?;
//! ```
//!
//! # Configuration
//!
//! [`PipelineConfig`] controls Stage 2 and is serde (de)serializable, so the
//! bucket rules can be kept in a JSON file:
//!
//! ```rust,ignore
//! let config = PipelineConfig::builder()
//!     .bucket_rule("edad", BucketSpec::new("edad", vec![0.0, 18.0, 120.0], ["minor", "adult"])?)
//!     .protect_column("ola")
//!     .build()?;
//! ```

pub mod cleaner;
pub mod config;
pub mod encoding;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod text;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DuplicatePair;
pub use config::{BucketRule, ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use encoding::{AuditEntry, AuditTable, BucketSpec, CategoricalEncoder, ColumnMapping};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use io::{load_csv, load_csv_as_text, write_csv};
pub use pipeline::{Pipeline, PipelineBuilder, explore};
pub use profiler::DataProfiler;
pub use reporting::{Chart, ChartData, ChartDocument, ReportGenerator};
pub use text::strip_diacritics;
pub use types::{ColumnSummary, EncodingResult, EncodingSummary, ExplorationResult};
pub use utils::{DEFAULT_NUMERIC_VALUE, is_numeric_dtype, parse_or_default};
