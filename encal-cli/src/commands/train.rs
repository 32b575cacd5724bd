//! Stage 3: stratified split, decision tree and evaluation.

use anyhow::{Context, Result};
use encal_learning::{Pipeline, PipelineConfig, TrainingResult};
use encal_processing::reporting::{NUMERIC_DATA_FILE, training_charts};
use encal_processing::{ReportGenerator, load_csv};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

use super::{ModelArgs, TrainArgs, print_banner, stage_input};

pub const DECISION_TREE_TEXT_FILE: &str = "decision_tree.txt";
pub const DECISION_TREE_JSON_FILE: &str = "decision_tree.json";
pub const TRAINING_CHARTS_FILE: &str = "training_charts.json";

fn learning_config(args: &ModelArgs) -> Result<PipelineConfig> {
    Ok(PipelineConfig::builder()
        .target_column(&args.target)
        .max_depth(args.max_depth)
        .random_seed(args.seed)
        .build()?)
}

pub fn run(args: &TrainArgs, output_dir: &Path) -> Result<()> {
    let input = stage_input(args.input.as_deref(), output_dir, NUMERIC_DATA_FILE);
    let config = learning_config(&args.model)?;
    let top = config.top_features;
    let pipeline = Pipeline::builder().config(config).build()?;

    info!("Loading encoded survey from: {}", input.display());
    let df = load_csv(&input)?;

    let result = pipeline.train(&df).context("Stage 3 failed")?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let generator = ReportGenerator::new(output_dir);
    let tree_text = generator.output_path(DECISION_TREE_TEXT_FILE);
    std::fs::write(&tree_text, result.model.render_text()?)
        .with_context(|| format!("Failed to write {}", tree_text.display()))?;
    let tree_json = generator.output_path(DECISION_TREE_JSON_FILE);
    std::fs::write(&tree_json, result.model.to_json()?)
        .with_context(|| format!("Failed to write {}", tree_json.display()))?;

    let test_rows = IdxCa::from_vec(
        "test".into(),
        result.split.test.iter().map(|&i| i as IdxSize).collect(),
    );
    let test_df = df.take(&test_rows)?;
    let charts = training_charts(&df, &test_df, &args.model.target)?;
    let charts_path = generator.save_charts(&charts, TRAINING_CHARTS_FILE)?;

    print_report(&result, top);
    println!();
    println!("Outputs:");
    println!("  {}", tree_text.display());
    println!("  {}", tree_json.display());
    println!("  {}", charts_path.display());
    Ok(())
}

fn print_report(result: &TrainingResult, top: usize) {
    print_banner("STAGE 3: TRAINING COMPLETE");

    println!("Class distribution per partition:");
    println!(
        "  {:>8} {:>8} {:>12} {:>8}",
        "Class", "Train", "Validation", "Test"
    );
    for dist in &result.split.distribution {
        println!(
            "  {:>8} {:>8} {:>12} {:>8}",
            dist.class, dist.train, dist.validation, dist.test
        );
    }
    println!();

    println!("Confusion matrix (rows: true, columns: predicted):");
    for line in result.confusion_matrix.to_string().lines() {
        println!("  {}", line);
    }
    println!();

    println!("Accuracy: {:.3}", result.accuracy);
    if let Some(validation) = result.validation_accuracy {
        println!("Validation accuracy: {:.3}", validation);
    }
    println!();

    println!("Most important features:");
    for (rank, feature) in result.top_features(top).iter().enumerate() {
        println!(
            "  {:>2}. {:<40} {:.4}",
            rank + 1,
            feature.feature,
            feature.importance
        );
    }
}
