//! Stage commands.
//!
//! - **explore**: Stage 1, diacritic stripping and column profiling
//! - **encode**: Stage 2, bucketing and integer encoding
//! - **train**: Stage 3, stratified split and decision tree
//!
//! Each command reads its input, runs the library stage and prints a
//! human-readable report. Stages talk to each other only through files in
//! the output directory.

pub mod encode;
pub mod explore;
pub mod train;

use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct ExploreArgs {
    /// Raw survey CSV
    #[arg(short, long, default_value = "ENCal.csv")]
    pub input: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    /// Cleaned survey CSV (default: <output-dir>/1_without_accents.csv)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Stage 2 rules as a JSON file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Class label column
    #[arg(short, long, default_value = "FE_FinalNR")]
    pub target: String,

    /// Maximum depth of the decision tree
    #[arg(long, default_value_t = 5)]
    pub max_depth: usize,

    /// Seed for the split shuffles and the tree
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Encoded survey CSV (default: <output-dir>/2_numeric_data.csv)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// `input` if given, otherwise `file_name` inside the output directory.
fn stage_input(input: Option<&Path>, output_dir: &Path, file_name: &str) -> PathBuf {
    input.map_or_else(|| output_dir.join(file_name), Path::to_path_buf)
}

fn print_banner(title: &str) {
    println!();
    println!("{}", "=".repeat(80));
    println!("{}", title);
    println!("{}", "=".repeat(80));
}

#[cfg(test)]
pub(crate) fn survey_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../crates/encal-processing/tests/fixtures/survey_sample.csv")
}
