//! Multinomial Naive Bayes over TF-IDF weights.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::depreciation::account::AccountLabel;
use crate::error::{DeprnError, Result};
use crate::ml::classifier::{AccountClassifier, ScoredLabel, check_dimension};
use crate::ml::features::FeatureVector;

/// Multinomial Naive Bayes classifier.
///
/// The score of account `c` for a vector `x` is
/// `ln P(c) + Σ_i x_i · ln P(term_i | c)`, with term probabilities smoothed
/// by `alpha`. An all-zero vector scores every account by its prior alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesClassifier {
    labels: Vec<AccountLabel>,
    class_log_prior: Vec<f64>,
    /// `feature_log_prob[class][feature]`
    feature_log_prob: Vec<Vec<f64>>,
    alpha: f64,
    dimension: usize,
}

impl NaiveBayesClassifier {
    /// Fit on labeled feature vectors.
    pub fn fit(samples: &[(FeatureVector, AccountLabel)], alpha: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(DeprnError::training("Training samples cannot be empty"));
        }
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(DeprnError::configuration(format!(
                "Smoothing alpha must be positive, got {alpha}"
            )));
        }

        let dimension = samples[0].0.dimension();
        let mut per_class: BTreeMap<&AccountLabel, (usize, Vec<f64>)> = BTreeMap::new();
        for (features, label) in samples {
            check_dimension(dimension, features)?;
            let (count, totals) = per_class
                .entry(label)
                .or_insert_with(|| (0, vec![0.0; dimension]));
            *count += 1;
            for (idx, value) in features.non_zero() {
                totals[idx] += value;
            }
        }

        let n_samples = samples.len() as f64;
        let mut labels = Vec::with_capacity(per_class.len());
        let mut class_log_prior = Vec::with_capacity(per_class.len());
        let mut feature_log_prob = Vec::with_capacity(per_class.len());
        for (label, (count, totals)) in per_class {
            let denominator = totals.iter().sum::<f64>() + alpha * dimension as f64;
            labels.push(label.clone());
            class_log_prior.push((count as f64 / n_samples).ln());
            feature_log_prob.push(
                totals
                    .iter()
                    .map(|total| ((total + alpha) / denominator).ln())
                    .collect(),
            );
        }

        Ok(Self {
            labels,
            class_log_prior,
            feature_log_prob,
            alpha,
            dimension,
        })
    }

    /// The smoothing parameter used during fitting.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Check internal consistency of deserialized state.
    pub fn validate(&self) -> Result<()> {
        let n_classes = self.labels.len();
        if self.class_log_prior.len() != n_classes || self.feature_log_prob.len() != n_classes {
            return Err(DeprnError::configuration(
                "Naive Bayes state has inconsistent class counts",
            ));
        }
        if self
            .feature_log_prob
            .iter()
            .any(|row| row.len() != self.dimension)
        {
            return Err(DeprnError::configuration(
                "Naive Bayes state has inconsistent feature dimension",
            ));
        }
        if self.labels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(DeprnError::configuration(
                "Naive Bayes labels must be unique and sorted",
            ));
        }
        Ok(())
    }
}

impl AccountClassifier for NaiveBayesClassifier {
    fn scores(&self, features: &FeatureVector) -> Result<Vec<ScoredLabel>> {
        check_dimension(self.dimension, features)?;

        Ok(self
            .labels
            .iter()
            .zip(self.class_log_prior.iter())
            .zip(self.feature_log_prob.iter())
            .map(|((label, prior), log_prob)| {
                let likelihood: f64 = features
                    .non_zero()
                    .map(|(idx, value)| value * log_prob[idx])
                    .sum();
                ScoredLabel {
                    label: label.clone(),
                    score: prior + likelihood,
                }
            })
            .collect())
    }

    fn labels(&self) -> &[AccountLabel] {
        &self.labels
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &'static str {
        "naive_bayes"
    }
}
