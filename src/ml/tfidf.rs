//! TF-IDF vectorizer for description feature extraction.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::DescriptionAnalyzer;
use crate::config::{AnalysisConfig, VectorizerConfig};
use crate::error::{DeprnError, Result};
use crate::ml::features::{FeatureExtractor, FeatureVector};

/// TF-IDF vectorizer for text feature extraction.
///
/// Vocabulary indices follow lexicographic term order, so two fits over the
/// same corpus always produce the same feature space.
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> index mapping.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency for each term.
    idf: Vec<f64>,
    /// Total number of documents seen during training.
    n_documents: usize,
    /// Analyzer for tokenization.
    analyzer: DescriptionAnalyzer,
    config: VectorizerConfig,
}

/// Serializable fitted state of a [`TfIdfVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerState {
    pub analysis: AnalysisConfig,
    pub config: VectorizerConfig,
    pub vocabulary: BTreeMap<String, usize>,
    pub idf: Vec<f64>,
    pub n_documents: usize,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("analyzer", &self.analyzer)
            .field("config", &self.config)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(analysis: &AnalysisConfig, config: VectorizerConfig) -> Result<Self> {
        Ok(Self {
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            analyzer: DescriptionAnalyzer::from_config(analysis)?,
            config,
        })
    }

    /// Fit the vectorizer on training documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(DeprnError::training(
                "Cannot fit a vectorizer on an empty corpus",
            ));
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let unique_terms: BTreeSet<String> = self.terms(doc)?.into_iter().collect();
            for term in unique_terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n_documents = documents.len();
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::new();
        for (term, df) in document_frequency {
            if df < self.config.min_df {
                continue;
            }
            // IDF = ln((N + 1) / (df + 1)) + 1
            idf.push(((n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
            vocabulary.insert(term, vocabulary.len());
        }

        if vocabulary.is_empty() {
            return Err(DeprnError::training(
                "Training descriptions produced an empty vocabulary",
            ));
        }

        self.n_documents = n_documents;
        self.vocabulary = vocabulary;
        self.idf = idf;

        log::debug!(
            "Fitted TF-IDF vocabulary of {} terms over {} descriptions",
            self.vocabulary.len(),
            self.n_documents
        );

        Ok(())
    }

    /// Analyzed unigrams, plus adjacent bigrams when `ngram_max` is 2.
    fn terms(&self, document: &str) -> Result<Vec<String>> {
        let unigrams = self.analyzer.terms(document)?;
        if self.config.ngram_max < 2 {
            return Ok(unigrams);
        }

        let bigrams: Vec<String> = unigrams
            .windows(2)
            .map(|pair| format!("{} {}", pair[0], pair[1]))
            .collect();
        let mut terms = unigrams;
        terms.extend(bigrams);
        Ok(terms)
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Index of `term` in the feature space, if it was seen during fitting.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Number of documents the vectorizer was fitted on.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Snapshot the fitted state for persistence.
    pub fn state(&self) -> VectorizerState {
        VectorizerState {
            analysis: self.analyzer.config().clone(),
            config: self.config.clone(),
            vocabulary: self.vocabulary.clone(),
            idf: self.idf.clone(),
            n_documents: self.n_documents,
        }
    }

    /// Rebuild a fitted vectorizer from persisted state.
    pub fn from_state(state: VectorizerState) -> Result<Self> {
        if state.vocabulary.len() != state.idf.len() {
            return Err(DeprnError::configuration(format!(
                "Vectorizer vocabulary has {} terms but {} IDF weights",
                state.vocabulary.len(),
                state.idf.len()
            )));
        }
        if state.vocabulary.values().any(|&idx| idx >= state.idf.len()) {
            return Err(DeprnError::configuration(
                "Vectorizer vocabulary index out of range",
            ));
        }

        let mut vectorizer = Self::new(&state.analysis, state.config)?;
        vectorizer.vocabulary = state.vocabulary;
        vectorizer.idf = state.idf;
        vectorizer.n_documents = state.n_documents;
        Ok(vectorizer)
    }
}

impl FeatureExtractor for TfIdfVectorizer {
    fn transform(&self, description: &str) -> Result<FeatureVector> {
        let mut tf = vec![0.0_f64; self.vocabulary.len()];

        // Out-of-vocabulary terms contribute nothing
        for term in self.terms(description)? {
            if let Some(&idx) = self.vocabulary.get(&term) {
                tf[idx] += 1.0;
            }
        }

        for (idx, value) in tf.iter_mut().enumerate() {
            if *value == 0.0 {
                continue;
            }
            if self.config.sublinear_tf {
                *value = 1.0 + value.ln();
            }
            *value *= self.idf[idx];
        }

        let mut features = FeatureVector::new(tf);
        if self.config.normalize {
            let norm = features.norm();
            if norm > 0.0 {
                features = FeatureVector::new(
                    features.into_inner().into_iter().map(|v| v / norm).collect(),
                );
            }
        }

        Ok(features)
    }

    fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    fn name(&self) -> &'static str {
        "tfidf"
    }
}
