//! Account classifier trait definition.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::depreciation::account::AccountLabel;
use crate::error::{DeprnError, Result};
use crate::ml::features::FeatureVector;
use crate::ml::metrics::ClassificationReport;

/// A candidate account together with the classifier's score for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLabel {
    pub label: AccountLabel,
    pub score: f64,
}

/// Supervised model mapping a feature vector to an account label.
///
/// Trained state is immutable: every method takes `&self`, and the
/// `Send + Sync` bound lets one instance serve concurrent predictions.
pub trait AccountClassifier: Send + Sync {
    /// Score every known label for `features`, in any order.
    ///
    /// Higher is better. Fails with a configuration error when the vector
    /// dimension differs from [`dimension`](Self::dimension).
    fn scores(&self, features: &FeatureVector) -> Result<Vec<ScoredLabel>>;

    /// The label universe, sorted.
    fn labels(&self) -> &[AccountLabel];

    /// Expected feature vector dimension.
    fn dimension(&self) -> usize;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &'static str;

    /// Labels ordered best first, ties broken by label order.
    fn ranked(&self, features: &FeatureVector) -> Result<Vec<ScoredLabel>> {
        let mut scores = self.scores(features)?;
        rank_scores(&mut scores);
        Ok(scores)
    }

    /// The single best label for `features`.
    fn infer(&self, features: &FeatureVector) -> Result<AccountLabel> {
        self.ranked(features)?
            .into_iter()
            .next()
            .map(|scored| scored.label)
            .ok_or_else(|| {
                DeprnError::configuration(format!("Classifier '{}' has no labels", self.name()))
            })
    }

    /// Measure this classifier against labeled feature vectors.
    ///
    /// Inference fans out over rayon; predictions are collected in input
    /// order, so the report is reproducible.
    fn evaluate(&self, samples: &[(FeatureVector, AccountLabel)]) -> Result<ClassificationReport> {
        if samples.is_empty() {
            return Err(DeprnError::evaluation_data(
                "Evaluation set is empty; nothing to report on",
            ));
        }

        let predicted = samples
            .par_iter()
            .map(|(features, _)| self.infer(features))
            .collect::<Result<Vec<_>>>()?;
        let actual: Vec<AccountLabel> = samples.iter().map(|(_, label)| label.clone()).collect();

        ClassificationReport::from_predictions(&actual, &predicted)
    }
}

/// Fail with a configuration error unless `features` has `expected` dimensions.
pub fn check_dimension(expected: usize, features: &FeatureVector) -> Result<()> {
    if features.dimension() != expected {
        return Err(DeprnError::configuration(format!(
            "Feature dimension mismatch: classifier expects {expected}, got {}",
            features.dimension()
        )));
    }
    Ok(())
}

/// Sort scores best first.
///
/// Finite scores rank above non-finite ones; equal scores fall back to
/// ascending label order.
pub fn rank_scores(scores: &mut [ScoredLabel]) {
    scores.sort_by(|a, b| {
        let a_finite = a.score.is_finite();
        let b_finite = b.score.is_finite();
        b_finite
            .cmp(&a_finite)
            .then_with(|| {
                if a_finite && b_finite {
                    b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| a.label.cmp(&b.label))
    });
}
