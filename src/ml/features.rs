//! Feature vectors and the feature extractor seam.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A fixed-dimension numeric representation of a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap raw feature values.
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// An all-zero vector of the given dimension.
    pub fn zeros(dimension: usize) -> Self {
        Self(vec![0.0; dimension])
    }

    /// Number of features.
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// The raw feature values.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Whether every feature is zero (no known term in the description).
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    /// Iterate over `(index, value)` pairs of the non-zero features.
    pub fn non_zero(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| *v != 0.0)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Dot product; the caller guarantees equal dimensions.
    pub fn dot(&self, other: &FeatureVector) -> f64 {
        self.0.iter().zip(other.0.iter()).map(|(x, y)| x * y).sum()
    }

    /// Cosine similarity, 0.0 when either vector is all-zero.
    pub fn cosine_similarity(&self, other: &FeatureVector) -> f64 {
        let magnitude_a = self.norm();
        let magnitude_b = other.norm();

        if magnitude_a == 0.0 || magnitude_b == 0.0 {
            0.0
        } else {
            self.dot(other) / (magnitude_a * magnitude_b)
        }
    }

    /// Consume the vector and return the raw values.
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// Turns a raw description into a [`FeatureVector`].
///
/// Implementations must be deterministic and must not fail on empty or
/// whitespace-only input; such input yields an all-zero vector.
pub trait FeatureExtractor: Send + Sync {
    /// Transform a description into a feature vector of [`dimension`](Self::dimension).
    fn transform(&self, description: &str) -> Result<FeatureVector>;

    /// Dimension of every vector this extractor produces.
    fn dimension(&self) -> usize;

    /// Get the name of this extractor for debugging and logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_vector() {
        let v = FeatureVector::zeros(4);
        assert_eq!(v.dimension(), 4);
        assert!(v.is_zero());
        assert_eq!(v.non_zero().count(), 0);
        assert_eq!(v.norm(), 0.0);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = FeatureVector::new(vec![1.0, 0.0, 1.0]);
        let b = FeatureVector::new(vec![1.0, 0.0, 1.0]);
        let c = FeatureVector::new(vec![0.0, 1.0, 0.0]);

        assert!((a.cosine_similarity(&b) - 1.0).abs() < 1e-12);
        assert_eq!(a.cosine_similarity(&c), 0.0);
        assert_eq!(a.cosine_similarity(&FeatureVector::zeros(3)), 0.0);
    }

    #[test]
    fn test_non_zero_iteration() {
        let v = FeatureVector::from(vec![0.0, 0.5, 0.0, 2.0]);
        let pairs: Vec<_> = v.non_zero().collect();

        assert_eq!(pairs, vec![(1, 0.5), (3, 2.0)]);
    }
}
