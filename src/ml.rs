//! Machine learning for account classification.
//!
//! Descriptions become TF-IDF [`FeatureVector`]s, an [`AccountClassifier`]
//! maps a vector to an account label, and [`ClassificationReport`] measures
//! a classifier against held-out labeled descriptions.
//!
//! # Architecture
//!
//! - [`FeatureExtractor`] trait, implemented by [`TfIdfVectorizer`]
//! - [`AccountClassifier`] trait, implemented by [`NaiveBayesClassifier`],
//!   [`PrototypeClassifier`] and the serializable [`ClassifierModel`]
//! - [`TrainedModel`]: a fitted vectorizer/classifier pair, convertible to
//!   and from a versioned [`ModelArtifact`]

pub mod classifier;
pub mod features;
pub mod metrics;
pub mod model;
pub mod naive_bayes;
pub mod prototype;
pub mod tfidf;

pub use classifier::{AccountClassifier, ScoredLabel};
pub use features::{FeatureExtractor, FeatureVector};
pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use model::{ClassifierModel, MODEL_FORMAT_VERSION, ModelArtifact, TrainedModel};
pub use naive_bayes::NaiveBayesClassifier;
pub use prototype::PrototypeClassifier;
pub use tfidf::{TfIdfVectorizer, VectorizerState};
