//! Stage 1: diacritic stripping and column profiling.

use anyhow::{Context, Result};
use encal_processing::reporting::{EXPLORATION_CHARTS_FILE, WITHOUT_ACCENTS_FILE, column_overview};
use encal_processing::{ReportGenerator, explore, load_csv};
use std::path::Path;
use tracing::info;

use super::{ExploreArgs, print_banner};

pub fn run(args: &ExploreArgs, output_dir: &Path) -> Result<()> {
    info!("Loading raw survey from: {}", args.input.display());
    let df = load_csv(&args.input)?;

    let mut result = explore(df).context("Stage 1 failed")?;

    let generator = ReportGenerator::new(output_dir);
    let cleaned = generator.save_table(&mut result.data, WITHOUT_ACCENTS_FILE)?;
    let summary_path = generator.save_column_summary(&result.summaries)?;
    let charts = generator.save_charts(&column_overview(&result.summaries), EXPLORATION_CHARTS_FILE)?;

    print_banner("STAGE 1: EXPLORATION COMPLETE");
    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input.display(),
        result.data.height(),
        result.data.width()
    );
    println!();
    println!(
        "{:<30} {:<12} {:>8} {:>8}",
        "Column", "Type", "Unique", "Missing"
    );
    println!("{}", "-".repeat(61));
    for summary in &result.summaries {
        println!(
            "{:<30} {:<12} {:>8} {:>8}",
            truncate_str(&summary.column, 29),
            truncate_str(&summary.dtype, 11),
            summary.unique_values,
            summary.missing_values
        );
    }
    println!();
    println!("Outputs:");
    println!("  {}", cleaned.display());
    println!("  {}", summary_path.display());
    println!("  {}", charts.display());
    Ok(())
}

/// Truncate a string to `max_len` characters with an ellipsis.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::survey_fixture;
    use tempfile::tempdir;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("edad", 10), "edad");
        assert_eq!(truncate_str("promedio_diario_2024", 10), "promedi...");
    }

    #[test]
    fn test_run_writes_stage_one_outputs() {
        let dir = tempdir().unwrap();
        let args = ExploreArgs {
            input: survey_fixture(),
        };
        run(&args, dir.path()).unwrap();

        assert!(dir.path().join(WITHOUT_ACCENTS_FILE).exists());
        assert!(dir.path().join(EXPLORATION_CHARTS_FILE).exists());
        assert!(dir.path().join("column_summary.csv").exists());
    }

    #[test]
    fn test_missing_input() {
        let dir = tempdir().unwrap();
        let args = ExploreArgs {
            input: dir.path().join("absent.csv"),
        };
        let err = run(&args, dir.path()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
