//! Command implementations for the deprn CLI.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::PredictorConfig;
use crate::depreciation::dataset::{Dataset, load_accounts};
use crate::depreciation::predictor::DeprnPredictor;
use crate::error::{DeprnError, Result};
use crate::ml::classifier::AccountClassifier;
use crate::ml::features::FeatureExtractor;
use crate::ml::model::{ModelArtifact, TrainedModel};

/// Input line that ends an interactive session.
pub const QUIT_COMMAND: &str = "QQ";
/// Input line that prints the classification report.
pub const REPORT_COMMAND: &str = "CR";

/// Execute a CLI command.
pub fn execute_command(args: DeprnArgs) -> Result<()> {
    match &args.command {
        Command::Predict(predict_args) => predict(predict_args, &args),
        Command::Report => report(&args),
        Command::Interactive => interactive(&args),
        Command::Train(train_args) => train(train_args, &args),
        Command::Accounts => list_accounts(&args),
    }
}

/// Load the predictor configuration, or the defaults.
fn load_config(args: &DeprnArgs) -> Result<PredictorConfig> {
    match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            PredictorConfig::from_file(path)
        }
        None => Ok(PredictorConfig::default()),
    }
}

/// Load the dataset named on the command line, or the bundled one.
fn load_dataset(args: &DeprnArgs) -> Result<Dataset> {
    match (&args.samples, &args.accounts) {
        (Some(samples), Some(accounts)) => Dataset::load(samples, accounts),
        (None, Some(accounts)) => {
            let mut dataset = Dataset::bundled()?;
            dataset.accounts = load_accounts(accounts)?;
            Ok(dataset)
        }
        (Some(_), None) => Err(DeprnError::invalid_argument(
            "--samples requires --accounts",
        )),
        (None, None) => Dataset::bundled(),
    }
}

/// Build the predictor: load a saved model or train a fresh one.
pub fn build_predictor(args: &DeprnArgs) -> Result<DeprnPredictor> {
    let config = load_config(args)?;
    let dataset = load_dataset(args)?;

    match &args.model {
        Some(path) => {
            log::info!("Loading model from {}", path.display());
            let artifact = ModelArtifact::load(path)?;
            if let Some(split) = artifact.split.as_ref().filter(|s| **s != config.evaluation) {
                log::warn!(
                    "Model was trained with test_fraction {} and seed {}; reporting on its own held-out set",
                    split.test_fraction,
                    split.seed
                );
            }
            DeprnPredictor::from_artifact(artifact, Arc::new(dataset.attribute_table()?))
        }
        None => DeprnPredictor::train(&config, &dataset),
    }
}

/// Predict one description.
fn predict(args: &PredictArgs, cli_args: &DeprnArgs) -> Result<()> {
    let predictor = build_predictor(cli_args)?;
    let result = prediction_result(&predictor, &args.description, args.top)?;
    output_result("Prediction", &result, cli_args)
}

fn prediction_result(
    predictor: &DeprnPredictor,
    description: &str,
    top: Option<usize>,
) -> Result<PredictionResult> {
    let prediction = predictor.predict(description)?;
    let candidates = match top {
        Some(k) => Some(predictor.predict_ranked(description, k)?),
        None => None,
    };
    Ok(PredictionResult::new(description, prediction, candidates))
}

/// Print the classification report.
fn report(cli_args: &DeprnArgs) -> Result<()> {
    let predictor = build_predictor(cli_args)?;
    let report = predictor.report()?;
    output_result("Classification report", &report, cli_args)
}

/// Run the interactive loop on stdin/stdout.
fn interactive(cli_args: &DeprnArgs) -> Result<()> {
    let predictor = build_predictor(cli_args)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_interactive(&predictor, stdin.lock(), &mut stdout.lock(), cli_args)
}

/// Read descriptions line by line until `QQ` or end of input.
///
/// `CR` prints the classification report; blank lines are ignored. A
/// failed report is printed and the session continues, while a failed
/// prediction ends it.
pub fn run_interactive<R: BufRead>(
    predictor: &DeprnPredictor,
    input: R,
    out: &mut dyn Write,
    cli_args: &DeprnArgs,
) -> Result<()> {
    let prompt = cli_args.output_format == OutputFormat::Human && cli_args.verbosity() > 0;
    if prompt {
        writeln!(
            out,
            "Enter an asset description ({REPORT_COMMAND} for the report, {QUIT_COMMAND} to quit)"
        )?;
    }

    for line in input.lines() {
        let line = line?;
        let command = line.trim();
        match command {
            QUIT_COMMAND => break,
            REPORT_COMMAND => match predictor.report() {
                Ok(report) => write_result(out, "Classification report", &report, cli_args)?,
                Err(e @ DeprnError::EvaluationData(_)) => writeln!(out, "{e}")?,
                Err(e) => return Err(e),
            },
            "" => continue,
            description => {
                let result = prediction_result(predictor, description, None)?;
                write_result(out, "Prediction", &result, cli_args)?;
            }
        }
        if prompt {
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Train a model and save it as JSON.
fn train(args: &TrainArgs, cli_args: &DeprnArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(DeprnError::invalid_argument(format!(
            "{} already exists. Use --force to overwrite.",
            args.output.display()
        )));
    }

    let start_time = Instant::now();
    let config = load_config(cli_args)?;
    let dataset = load_dataset(cli_args)?;
    let table = dataset.attribute_table()?;

    let model = TrainedModel::train(&config, &dataset)?;
    table.ensure_covers(model.classifier().labels())?;
    model.save(&args.output)?;

    log::info!("Saved model to {}", args.output.display());

    output_result(
        "Model trained successfully",
        &TrainingResult {
            path: args.output.display().to_string(),
            classifier: model.classifier().name().to_string(),
            accounts: model.classifier().labels().len(),
            features: model.vectorizer().dimension(),
            evaluation_samples: model.held_out().len(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// List the account attribute table.
fn list_accounts(cli_args: &DeprnArgs) -> Result<()> {
    let dataset = load_dataset(cli_args)?;
    let table = dataset.attribute_table()?;
    output_result("Accounts", &AccountsResult::from(&table), cli_args)
}
