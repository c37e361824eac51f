use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::train::{run_train, TrainArgs};

#[derive(Parser)]
#[command(version, name = "igd-cli")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit a linear regression model on a CSV file
    Train {
        /// The CSV file with a header row
        #[arg(long)]
        path: PathBuf,
        /// The label column
        #[arg(long)]
        label: String,
        /// A feature column, can be repeated
        #[arg(long = "feature", required = true)]
        features: Vec<String>,
        #[arg(long)]
        learning_rate: Option<f64>,
        #[arg(long)]
        max_passes: Option<usize>,
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        #[arg(long)]
        reservoir_size: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum)]
        pass_mode: Option<PassModeArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    FullBatch,
    Reservoir,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PassModeArg {
    Aggregate,
    Cursor,
}

pub fn main(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_from(args);

    match cli.command {
        Command::Train {
            path,
            label,
            features,
            learning_rate,
            max_passes,
            strategy,
            reservoir_size,
            seed,
            pass_mode,
        } => run_train(TrainArgs {
            path,
            label,
            features,
            learning_rate,
            max_passes,
            strategy,
            reservoir_size,
            seed,
            pass_mode,
        }),
    }
}
