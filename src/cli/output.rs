//! Output formatting for CLI commands.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::cli::args::{DeprnArgs, OutputFormat};
use crate::depreciation::account::AttributeTable;
use crate::depreciation::predictor::Prediction;
use crate::error::Result;
use crate::ml::classifier::ScoredLabel;
use crate::ml::metrics::ClassificationReport;

/// Result structure for a single prediction.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResult {
    pub description: String,
    pub account: String,
    pub rate_percent: f64,
    pub life_years: f64,
    pub tax_category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<ScoredLabel>>,
}

impl PredictionResult {
    pub fn new(description: &str, prediction: Prediction, candidates: Option<Vec<ScoredLabel>>) -> Self {
        let (attributes, account) = prediction.into_parts();
        Self {
            description: description.to_string(),
            account: account.to_string(),
            rate_percent: attributes.rate_percent,
            life_years: attributes.life_years,
            tax_category: attributes.tax_category,
            candidates,
        }
    }
}

/// One row of the account listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountRow {
    pub account: String,
    pub rate_percent: f64,
    pub life_years: f64,
    pub tax_category: String,
}

/// Result structure for the account listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountsResult {
    pub accounts: Vec<AccountRow>,
}

impl From<&AttributeTable> for AccountsResult {
    fn from(table: &AttributeTable) -> Self {
        Self {
            accounts: table
                .iter()
                .map(|(label, attributes)| AccountRow {
                    account: label.to_string(),
                    rate_percent: attributes.rate_percent,
                    life_years: attributes.life_years,
                    tax_category: attributes.tax_category.clone(),
                })
                .collect(),
        }
    }
}

/// Result structure for model training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingResult {
    pub path: String,
    pub classifier: String,
    pub accounts: usize,
    pub features: usize,
    pub evaluation_samples: usize,
    pub duration_ms: u64,
}

/// Results that know how to print themselves for people.
pub trait HumanOutput {
    fn write_human(&self, out: &mut dyn Write) -> Result<()>;
}

impl HumanOutput for PredictionResult {
    fn write_human(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Account:        {}", self.account)?;
        writeln!(out, "Rate:           {}%", format_number(self.rate_percent))?;
        writeln!(out, "Effective life: {} years", format_number(self.life_years))?;
        writeln!(out, "Tax category:   {}", self.tax_category)?;

        if let Some(candidates) = &self.candidates {
            writeln!(out)?;
            writeln!(out, "Candidates:")?;
            for (i, candidate) in candidates.iter().enumerate() {
                writeln!(
                    out,
                    "  {}. {} (score: {:.4})",
                    i + 1,
                    candidate.label,
                    candidate.score
                )?;
            }
        }
        Ok(())
    }
}

impl HumanOutput for ClassificationReport {
    fn write_human(&self, out: &mut dyn Write) -> Result<()> {
        let width = self
            .classes
            .iter()
            .map(|class| class.label.as_str().len())
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(0);

        writeln!(
            out,
            "{:>width$}  {:>9}  {:>6}  {:>8}  {:>7}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(out)?;
        for class in &self.classes {
            writeln!(
                out,
                "{:>width$}  {:>9.2}  {:>6.2}  {:>8.2}  {:>7}",
                class.label.as_str(),
                class.precision,
                class.recall,
                class.f1,
                class.support
            )?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "{:>width$}  {:>9}  {:>6}  {:>8.2}  {:>7}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                out,
                "{:>width$}  {:>9.2}  {:>6.2}  {:>8.2}  {:>7}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        Ok(())
    }
}

impl HumanOutput for AccountsResult {
    fn write_human(&self, out: &mut dyn Write) -> Result<()> {
        let width = self
            .accounts
            .iter()
            .map(|row| row.account.len())
            .chain(["Account".len()])
            .max()
            .unwrap_or(0);

        writeln!(
            out,
            "{:<width$}  {:>7}  {:>6}  Tax category",
            "Account", "Rate %", "Life"
        )?;
        for row in &self.accounts {
            writeln!(
                out,
                "{:<width$}  {:>7}  {:>6}  {}",
                row.account,
                format_number(row.rate_percent),
                format_number(row.life_years),
                row.tax_category
            )?;
        }
        Ok(())
    }
}

impl HumanOutput for TrainingResult {
    fn write_human(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Model:      {}", self.path)?;
        writeln!(out, "Classifier: {}", self.classifier)?;
        writeln!(out, "Accounts:   {}", self.accounts)?;
        writeln!(out, "Features:   {}", self.features)?;
        writeln!(out, "Held out:   {}", self.evaluation_samples)?;
        writeln!(out, "Duration:   {}ms", self.duration_ms)?;
        Ok(())
    }
}

/// Output a result to stdout in the requested format.
pub fn output_result<T>(message: &str, result: &T, args: &DeprnArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, message, result, args)
}

/// Write a result in the requested format.
pub fn write_result<T>(out: &mut dyn Write, message: &str, result: &T, args: &DeprnArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 && !message.is_empty() {
                writeln!(out, "{message}")?;
                writeln!(out)?;
            }
            result.write_human(out)
        }
        OutputFormat::Json => output_json(out, result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(out: &mut dyn Write, result: &T, args: &DeprnArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    writeln!(out, "{json}")?;
    Ok(())
}

/// Drop a trailing `.0` and round to two decimals.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let formatted = format!("{value:.2}");
        formatted.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::depreciation::account::{AccountAttributes, AccountLabel};

    fn args(extra: &[&str]) -> DeprnArgs {
        let mut argv = vec!["deprn"];
        argv.extend_from_slice(extra);
        argv.push("accounts");
        DeprnArgs::try_parse_from(argv).unwrap()
    }

    fn prediction() -> PredictionResult {
        let prediction = Prediction {
            account: AccountLabel::new("Motor Vehicles"),
            attributes: AccountAttributes::new(25.0, 8.0, "Plant & Equipment").unwrap(),
        };
        PredictionResult::new("company car", prediction, None)
    }

    fn render<T: Serialize + HumanOutput>(result: &T, args: &DeprnArgs) -> String {
        let mut buffer = Vec::new();
        write_result(&mut buffer, "message", result, args).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(25.0), "25");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(66.666), "66.67");
    }

    #[test]
    fn test_human_prediction() {
        let text = render(&prediction(), &args(&[]));

        assert!(text.contains("Account:        Motor Vehicles"));
        assert!(text.contains("Rate:           25%"));
        assert!(text.contains("Effective life: 8 years"));
        assert!(!text.contains("message"));
    }

    #[test]
    fn test_json_prediction() {
        let text = render(&prediction(), &args(&["--format", "json"]));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["account"], "Motor Vehicles");
        assert_eq!(value["rate_percent"], 25.0);
        assert!(value.get("candidates").is_none());
    }
}
