//! Command line argument parsing for the deprn CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// deprn - predict the depreciation account of an asset description
#[derive(Parser, Debug, Clone)]
#[command(name = "deprn")]
#[command(about = "Predict depreciation accounts, rates and effective lives from asset descriptions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct DeprnArgs {
    /// Increase verbosity (-v for info logs, -vv for debug logs)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Predictor configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Labeled asset descriptions (CSV or JSON); defaults to the bundled set
    #[arg(long, value_name = "SAMPLES_FILE", global = true, requires = "accounts")]
    pub samples: Option<PathBuf>,

    /// Account attribute table (CSV or JSON); defaults to the bundled table
    #[arg(long, value_name = "ACCOUNTS_FILE", global = true)]
    pub accounts: Option<PathBuf>,

    /// Load a saved model instead of training one
    #[arg(short, long, value_name = "MODEL_FILE", global = true)]
    pub model: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl DeprnArgs {
    /// Get the effective verbosity level (0=quiet, 1=normal, 2=verbose, 3+=debug)
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Predict the account of one description
    Predict(PredictArgs),

    /// Print the classification report for the held-out descriptions
    Report,

    /// Read descriptions from stdin until QQ; CR prints the report
    Interactive,

    /// Train a model and save it
    Train(TrainArgs),

    /// List the account attribute table
    Accounts,
}

/// Arguments for predicting
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Asset description
    #[arg(value_name = "DESCRIPTION")]
    pub description: String,

    /// Also show the best N candidate accounts with scores
    #[arg(short, long, value_name = "N")]
    pub top: Option<usize>,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Where to write the model (JSON)
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub output: PathBuf,

    /// Overwrite an existing model file
    #[arg(long)]
    pub force: bool,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
