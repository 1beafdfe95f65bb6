//! Nearest-prototype classifier using cosine similarity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::depreciation::account::AccountLabel;
use crate::error::{DeprnError, Result};
use crate::ml::classifier::{AccountClassifier, ScoredLabel, check_dimension};
use crate::ml::features::FeatureVector;

/// Scores each account by the mean cosine similarity between the query and
/// every training vector of that account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrototypeClassifier {
    /// Training data: account -> feature vectors.
    prototypes: BTreeMap<AccountLabel, Vec<FeatureVector>>,
    labels: Vec<AccountLabel>,
    dimension: usize,
}

impl PrototypeClassifier {
    /// Group training vectors by account.
    pub fn fit(samples: &[(FeatureVector, AccountLabel)]) -> Result<Self> {
        if samples.is_empty() {
            return Err(DeprnError::training("Training samples cannot be empty"));
        }

        let dimension = samples[0].0.dimension();
        let mut prototypes: BTreeMap<AccountLabel, Vec<FeatureVector>> = BTreeMap::new();
        for (features, label) in samples {
            check_dimension(dimension, features)?;
            prototypes
                .entry(label.clone())
                .or_default()
                .push(features.clone());
        }

        let labels = prototypes.keys().cloned().collect();
        Ok(Self {
            prototypes,
            labels,
            dimension,
        })
    }

    /// Number of stored training vectors for `label`.
    pub fn prototype_count(&self, label: &AccountLabel) -> usize {
        self.prototypes.get(label).map_or(0, Vec::len)
    }

    /// Check internal consistency of deserialized state.
    pub fn validate(&self) -> Result<()> {
        if !self.prototypes.keys().eq(self.labels.iter()) {
            return Err(DeprnError::configuration(
                "Prototype labels do not match stored prototypes",
            ));
        }
        let consistent = self
            .prototypes
            .values()
            .all(|vectors| !vectors.is_empty() && vectors.iter().all(|v| v.dimension() == self.dimension));
        if !consistent {
            return Err(DeprnError::configuration(
                "Prototype vectors have inconsistent dimensions",
            ));
        }
        Ok(())
    }
}

impl AccountClassifier for PrototypeClassifier {
    fn scores(&self, features: &FeatureVector) -> Result<Vec<ScoredLabel>> {
        check_dimension(self.dimension, features)?;

        Ok(self
            .prototypes
            .iter()
            .map(|(label, prototypes)| {
                let total_similarity: f64 = prototypes
                    .iter()
                    .map(|prototype| features.cosine_similarity(prototype))
                    .sum();
                ScoredLabel {
                    label: label.clone(),
                    score: total_similarity / prototypes.len() as f64,
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
        "prototype"
    }
}
