//! Stage 2: bucketing and integer encoding.

use anyhow::{Context, Result};
use encal_processing::reporting::{NUMERIC_DATA_FILE, WITHOUT_ACCENTS_FILE};
use encal_processing::{Pipeline, PipelineConfig, ReportGenerator, load_csv_as_text};
use std::path::Path;
use tracing::info;

use super::{EncodeArgs, print_banner, stage_input};

/// Stage 2 rules from a JSON file. Missing keys take their defaults.
fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    info!("Loading encoding rules from: {}", path.display());
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn run(args: &EncodeArgs, output_dir: &Path) -> Result<()> {
    let input = stage_input(args.input.as_deref(), output_dir, WITHOUT_ACCENTS_FILE);
    let config = load_config(args.config.as_deref())?;
    let pipeline = Pipeline::builder().config(config).build()?;

    info!("Loading cleaned survey from: {}", input.display());
    let df = load_csv_as_text(&input)?;

    let mut result = pipeline.process(df).context("Stage 2 failed")?;

    let generator = ReportGenerator::new(output_dir);
    let encoded = generator.save_table(&mut result.data, NUMERIC_DATA_FILE)?;
    let mapping = generator.save_audit_table(&result.audit)?;

    let summary = &result.summary;
    print_banner("STAGE 2: ENCODING COMPLETE");
    println!(
        "Shape: {} rows x {} columns -> {} rows x {} columns",
        summary.shape_before.0, summary.shape_before.1, summary.shape_after.0, summary.shape_after.1
    );
    println!();
    println!("Encoding Summary:");
    println!("  Missing sentinels replaced: {}", summary.sentinel_replacements);
    if summary.duplicate_pairs.is_empty() {
        println!("  Duplicate columns: none");
    } else {
        println!("  Duplicate columns:");
        for pair in &summary.duplicate_pairs {
            println!("    - {} (kept {})", pair.drop, pair.keep);
        }
    }
    println!("  Bucketed columns: {}", join_or_none(&summary.bucketized));
    println!("  Dropped columns: {}", join_or_none(&summary.dropped_columns));
    println!("  Encoded columns: {}", summary.encoded_columns);
    println!();
    println!("Outputs:");
    println!("  {}", encoded.display());
    println!("  {}", mapping.display());
    Ok(())
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
