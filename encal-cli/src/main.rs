//! CLI entry point for the three ENCal survey stages.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{EncodeArgs, ExploreArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "encal",
    version,
    about = "ENCal survey preparation pipeline",
    long_about = "Explores, encodes and models the ENCal satisfaction survey.\n\n\
                  Each stage reads the previous stage's output from the output directory.\n\n\
                  EXAMPLES:\n  \
                  # Stage 1: strip accents and profile the raw survey\n  \
                  encal explore -i ENCal.csv\n\n  \
                  # Stage 2: bucket and encode, with custom rules\n  \
                  encal encode --config rules.json\n\n  \
                  # Stage 3: split, fit and evaluate the tree\n  \
                  encal train --target FE_FinalNR\n\n  \
                  # All three stages in order\n  \
                  encal run -i ENCal.csv"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory shared by every stage's outputs
    #[arg(short, long, default_value = "./outputs", global = true)]
    output_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only show warnings and errors in the log
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stage 1: strip diacritics and write the column summary
    Explore(ExploreArgs),
    /// Stage 2: bucket, reduce and integer-encode the cleaned survey
    Encode(EncodeArgs),
    /// Stage 3: stratified split, decision tree and evaluation
    Train(TrainArgs),
    /// Run the three stages in order
    Run {
        #[command(flatten)]
        explore: ExploreArgs,
        /// Stage 2 rules as a JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        model: commands::ModelArgs,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.quiet);

    match cli.command {
        Command::Explore(args) => commands::explore::run(&args, &cli.output_dir),
        Command::Encode(args) => commands::encode::run(&args, &cli.output_dir),
        Command::Train(args) => commands::train::run(&args, &cli.output_dir),
        Command::Run {
            explore,
            config,
            model,
        } => {
            commands::explore::run(&explore, &cli.output_dir)?;
            commands::encode::run(
                &EncodeArgs {
                    input: None,
                    config,
                },
                &cli.output_dir,
            )?;
            commands::train::run(&TrainArgs { input: None, model }, &cli.output_dir)
        }
    }
}
