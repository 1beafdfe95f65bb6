//! Account labels and their depreciation attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::depreciation::dataset::AccountRecord;
use crate::error::{DeprnError, Result};

/// Name of a depreciation-schedule account, e.g. "Motor Vehicles".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountLabel(String);

impl AccountLabel {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountLabel {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AccountLabel {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Depreciation parameters of one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountAttributes {
    /// Annual depreciation rate as a percentage of prime cost.
    pub rate_percent: f64,
    /// Effective life in years.
    pub life_years: f64,
    /// Tax treatment bucket, e.g. "Plant & Equipment".
    pub tax_category: String,
}

impl AccountAttributes {
    /// Build attributes, rejecting values no depreciation schedule allows.
    pub fn new<S: Into<String>>(rate_percent: f64, life_years: f64, tax_category: S) -> Result<Self> {
        let attributes = Self {
            rate_percent,
            life_years,
            tax_category: tax_category.into(),
        };
        attributes.validate()?;
        Ok(attributes)
    }

    fn validate(&self) -> Result<()> {
        if !(self.rate_percent.is_finite() && self.rate_percent >= 0.0) {
            return Err(DeprnError::configuration(format!(
                "Depreciation rate must be a non-negative number, got {}",
                self.rate_percent
            )));
        }
        if !(self.life_years.is_finite() && self.life_years > 0.0) {
            return Err(DeprnError::configuration(format!(
                "Effective life must be a positive number, got {}",
                self.life_years
            )));
        }
        if self.tax_category.trim().is_empty() {
            return Err(DeprnError::configuration("Tax category must not be empty"));
        }
        Ok(())
    }
}

/// Static mapping from account label to depreciation attributes.
///
/// Lookups are total over the configured universe; any other label is a
/// configuration error, never a silent default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTable {
    entries: BTreeMap<AccountLabel, AccountAttributes>,
}

impl AttributeTable {
    /// Build a table from account rows.
    ///
    /// Duplicate accounts and invalid attribute values are configuration
    /// errors.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = AccountRecord>,
    {
        let mut entries = BTreeMap::new();
        for record in records {
            let label = AccountLabel::new(record.account.trim());
            if label.as_str().is_empty() {
                return Err(DeprnError::configuration("Account name must not be empty"));
            }
            let attributes =
                AccountAttributes::new(record.rate_percent, record.life_years, record.tax_category)
                    .map_err(|e| {
                        DeprnError::configuration(format!("Account '{label}': {e}"))
                    })?;
            if entries.insert(label.clone(), attributes).is_some() {
                return Err(DeprnError::configuration(format!(
                    "Account '{label}' is defined more than once"
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Attributes of `label`.
    pub fn lookup(&self, label: &AccountLabel) -> Result<&AccountAttributes> {
        self.entries.get(label).ok_or_else(|| {
            DeprnError::configuration(format!(
                "Account '{label}' has no depreciation attributes"
            ))
        })
    }

    /// Labels from `labels` that have no entry in this table.
    pub fn missing<'a, I>(&self, labels: I) -> Vec<AccountLabel>
    where
        I: IntoIterator<Item = &'a AccountLabel>,
    {
        labels
            .into_iter()
            .filter(|label| !self.entries.contains_key(*label))
            .cloned()
            .collect()
    }

    /// Fail unless every label in `labels` has attributes.
    pub fn ensure_covers<'a, I>(&self, labels: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a AccountLabel>,
    {
        let missing = self.missing(labels);
        if missing.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = missing.iter().map(AccountLabel::as_str).collect();
        Err(DeprnError::configuration(format!(
            "Classifier labels without depreciation attributes: {}",
            names.join(", ")
        )))
    }

    /// The label universe, in order.
    pub fn labels(&self) -> impl Iterator<Item = &AccountLabel> {
        self.entries.keys()
    }

    /// Every entry, in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountLabel, &AccountAttributes)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
