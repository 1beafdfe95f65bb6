//! Configuration for training and evaluating a predictor.
//!
//! Every section has sensible defaults, so a JSON config file only needs to
//! name the values it changes:
//!
//! ```json
//! { "model": { "kind": "prototype" }, "evaluation": { "seed": 7 } }
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{DeprnError, Result};

/// Top-level predictor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Text analysis settings.
    pub analysis: AnalysisConfig,
    /// TF-IDF vectorizer settings.
    pub vectorizer: VectorizerConfig,
    /// Classifier settings.
    pub model: ModelConfig,
    /// Held-out evaluation settings.
    pub evaluation: EvaluationConfig,
}

impl PredictorConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config: PredictorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is inside its allowed range.
    pub fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.vectorizer.ngram_max) {
            return Err(DeprnError::configuration(format!(
                "vectorizer.ngram_max must be 1 or 2, got {}",
                self.vectorizer.ngram_max
            )));
        }
        if self.vectorizer.min_df == 0 {
            return Err(DeprnError::configuration(
                "vectorizer.min_df must be at least 1",
            ));
        }
        if !(self.model.alpha.is_finite() && self.model.alpha > 0.0) {
            return Err(DeprnError::configuration(format!(
                "model.alpha must be a positive number, got {}",
                self.model.alpha
            )));
        }
        let fraction = self.evaluation.test_fraction;
        if !(0.0..1.0).contains(&fraction) {
            return Err(DeprnError::configuration(format!(
                "evaluation.test_fraction must be in [0, 1), got {fraction}"
            )));
        }
        Ok(())
    }
}

/// Text analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Remove English stop words.
    pub stop_words: bool,
    /// Fold plurals and verb suffixes.
    pub stemming: bool,
    /// Additional stop words, matched after lowercasing.
    pub extra_stop_words: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stop_words: true,
            stemming: true,
            extra_stop_words: Vec::new(),
        }
    }
}

/// TF-IDF vectorizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Largest n-gram size (1 = unigrams, 2 = unigrams and bigrams).
    pub ngram_max: usize,
    /// Minimum number of training descriptions a term must appear in.
    pub min_df: usize,
    /// Use `1 + ln(tf)` instead of the raw term count.
    pub sublinear_tf: bool,
    /// L2-normalize feature vectors.
    pub normalize: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            ngram_max: 1,
            min_df: 1,
            sublinear_tf: false,
            normalize: true,
        }
    }
}

/// Which classifier to train.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Multinomial Naive Bayes.
    #[default]
    NaiveBayes,
    /// Mean cosine similarity to each account's training vectors.
    Prototype,
}

impl ModelKind {
    /// Stable name used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::NaiveBayes => "naive_bayes",
            ModelKind::Prototype => "prototype",
        }
    }
}

/// Classifier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Classifier family.
    pub kind: ModelKind,
    /// Additive smoothing for Naive Bayes.
    pub alpha: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::NaiveBayes,
            alpha: 1.0,
        }
    }
}

/// Held-out evaluation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Share of each account's samples held out for the report.
    pub test_fraction: f64,
    /// Seed for the stratified shuffle.
    pub seed: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.25,
            seed: 42,
        }
    }
}
