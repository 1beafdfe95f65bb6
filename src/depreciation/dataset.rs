//! Labeled asset descriptions and account attribute rows.
//!
//! Both kinds of rows load from CSV or JSON, chosen by file extension:
//!
//! ```text
//! description,account
//! "Toyota Camry sedan, business use",Motor Vehicles
//!
//! account,rate_percent,life_years,tax_category
//! Motor Vehicles,25,8,Plant & Equipment
//! ```
//!
//! A small reference dataset is compiled into the crate and available
//! through [`Dataset::bundled`].

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::depreciation::account::{AccountLabel, AttributeTable};
use crate::error::{DeprnError, Result};

const BUNDLED_SAMPLES: &str = include_str!("../../data/asset_descriptions.csv");
const BUNDLED_ACCOUNTS: &str = include_str!("../../data/accounts.csv");

/// A description labeled with its account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSample {
    pub description: String,
    pub account: String,
}

impl AssetSample {
    pub fn new<D: Into<String>, A: Into<String>>(description: D, account: A) -> Self {
        Self {
            description: description.into(),
            account: account.into(),
        }
    }

    /// The account as a label.
    pub fn label(&self) -> AccountLabel {
        AccountLabel::new(self.account.trim())
    }
}

/// One row of the account attribute table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account: String,
    pub rate_percent: f64,
    pub life_years: f64,
    pub tax_category: String,
}

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Ok(DataFormat::Csv),
            Some("json") => Ok(DataFormat::Json),
            _ => Err(DeprnError::invalid_argument(format!(
                "Unsupported data file '{}': expected a .csv or .json extension",
                path.display()
            ))),
        }
    }
}

/// Labeled samples plus the attribute rows of every account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub samples: Vec<AssetSample>,
    pub accounts: Vec<AccountRecord>,
}

impl Dataset {
    pub fn new(samples: Vec<AssetSample>, accounts: Vec<AccountRecord>) -> Self {
        Self { samples, accounts }
    }

    /// The reference dataset shipped with the crate.
    pub fn bundled() -> Result<Self> {
        let samples = clean_samples(parse_csv(BUNDLED_SAMPLES.as_bytes())?);
        let accounts = parse_csv(BUNDLED_ACCOUNTS.as_bytes())?;
        Ok(Self { samples, accounts })
    }

    /// Load samples and accounts from two files.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(samples_path: P, accounts_path: Q) -> Result<Self> {
        Ok(Self {
            samples: load_samples(samples_path)?,
            accounts: load_accounts(accounts_path)?,
        })
    }

    /// Build the attribute table from the account rows.
    pub fn attribute_table(&self) -> Result<AttributeTable> {
        AttributeTable::from_records(self.accounts.iter().cloned())
    }

    /// Stratified train/evaluation split.
    ///
    /// Each account's samples are shuffled with a `seed`ed RNG and
    /// `floor(n * test_fraction)` of them are held out, never all of them,
    /// so every account stays trainable. Deterministic for a given seed.
    pub fn split(
        &self,
        test_fraction: f64,
        seed: u64,
    ) -> Result<(Vec<AssetSample>, Vec<AssetSample>)> {
        if !(0.0..1.0).contains(&test_fraction) {
            return Err(DeprnError::invalid_argument(format!(
                "test_fraction must be in [0, 1), got {test_fraction}"
            )));
        }

        let mut groups: BTreeMap<AccountLabel, Vec<AssetSample>> = BTreeMap::new();
        for sample in &self.samples {
            groups.entry(sample.label()).or_default().push(sample.clone());
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut train = Vec::new();
        let mut test = Vec::new();
        for (_, mut group) in groups {
            group.shuffle(&mut rng);
            let n_test = ((group.len() as f64 * test_fraction).floor() as usize)
                .min(group.len().saturating_sub(1));
            let rest = group.split_off(n_test);
            test.extend(group);
            train.extend(rest);
        }

        Ok((train, test))
    }
}

/// Load labeled samples from a CSV or JSON file.
///
/// Rows with a blank description are skipped.
pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<Vec<AssetSample>> {
    let samples = load_rows(path.as_ref())?;
    Ok(clean_samples(samples))
}

/// Load account attribute rows from a CSV or JSON file.
pub fn load_accounts<P: AsRef<Path>>(path: P) -> Result<Vec<AccountRecord>> {
    load_rows(path.as_ref())
}

fn load_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let format = DataFormat::from_path(path)?;
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open data file {}", path.display()))?;
    let rows = match format {
        DataFormat::Csv => parse_csv(file),
        DataFormat::Json => serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(DeprnError::from),
    }
    .map_err(|e| DeprnError::dataset(format!("{}: {e}", path.display())))?;

    log::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn parse_csv<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()
        .map_err(DeprnError::from)
}

fn clean_samples(samples: Vec<AssetSample>) -> Vec<AssetSample> {
    samples
        .into_iter()
        .enumerate()
        .filter_map(|(row, sample)| {
            if sample.description.trim().is_empty() {
                log::warn!("Skipping sample {} with a blank description", row + 1);
                None
            } else {
                Some(sample)
            }
        })
        .collect()
}
