//! Classification metrics.
//!
//! [`ClassificationReport`] carries per-account precision, recall, F1 and
//! support, overall accuracy, macro and support-weighted averages, and the
//! confusion matrix. Precision or recall with a zero denominator is reported
//! as 0.0.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::depreciation::account::AccountLabel;
use crate::error::{DeprnError, Result};

/// Metrics for a single account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: AccountLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of evaluation samples whose true label is this account.
    pub support: usize,
}

/// Averaged precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Counts of (actual, predicted) label pairs.
///
/// Rows are actual labels, columns predicted labels, both in `labels` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<AccountLabel>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Number of samples with true label `actual` predicted as `predicted`.
    pub fn count(&self, actual: &AccountLabel, predicted: &AccountLabel) -> usize {
        let row = self.labels.binary_search(actual);
        let col = self.labels.binary_search(predicted);
        match (row, col) {
            (Ok(row), Ok(col)) => self.counts[row][col],
            _ => 0,
        }
    }
}

/// Aggregate evaluation of a classifier over a labeled set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Per-account metrics, sorted by label.
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    /// Number of correctly classified samples.
    pub correct: usize,
    /// Number of evaluated samples.
    pub total: usize,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    /// Build a report from parallel slices of true and predicted labels.
    pub fn from_predictions(actual: &[AccountLabel], predicted: &[AccountLabel]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(DeprnError::invalid_argument(format!(
                "Got {} true labels but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }
        if actual.is_empty() {
            return Err(DeprnError::evaluation_data(
                "Cannot compute metrics over an empty evaluation set",
            ));
        }

        let labels: Vec<AccountLabel> = actual
            .iter()
            .chain(predicted.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: BTreeMap<&AccountLabel, usize> =
            labels.iter().enumerate().map(|(i, l)| (l, i)).collect();

        let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
        for (a, p) in actual.iter().zip(predicted.iter()) {
            counts[index[a]][index[p]] += 1;
        }

        let total = actual.len();
        let correct = (0..labels.len()).map(|i| counts[i][i]).sum::<usize>();

        let classes: Vec<ClassMetrics> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let true_positives = counts[i][i] as f64;
                let support: usize = counts[i].iter().sum();
                let predicted_count: usize = counts.iter().map(|row| row[i]).sum();

                let precision = ratio(true_positives, predicted_count as f64);
                let recall = ratio(true_positives, support as f64);
                ClassMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1: f1_score(precision, recall),
                    support,
                }
            })
            .collect();

        let n_classes = classes.len() as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n_classes,
            support: total,
        };
        let weighted = |metric: fn(&ClassMetrics) -> f64| {
            classes
                .iter()
                .map(|c| metric(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
            support: total,
        };

        Ok(Self {
            classes,
            accuracy: correct as f64 / total as f64,
            macro_avg,
            weighted_avg,
            correct,
            total,
            confusion: ConfusionMatrix { labels, counts },
        })
    }

    /// Metrics for one account, if it appeared in the evaluation.
    pub fn class(&self, label: &AccountLabel) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| &c.label == label)
    }

    /// Number of misclassified samples.
    pub fn misclassified(&self) -> usize {
        self.total - self.correct
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}
