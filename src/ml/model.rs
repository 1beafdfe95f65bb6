//! Training and persistence of a vectorizer/classifier pair.
//!
//! A [`TrainedModel`] is fitted once and then shared read-only. It can be
//! written to disk as a versioned JSON [`ModelArtifact`] and loaded back
//! without retraining.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::{EvaluationConfig, ModelKind, PredictorConfig};
use crate::depreciation::account::AccountLabel;
use crate::depreciation::dataset::{AssetSample, Dataset};
use crate::error::{DeprnError, Result};
use crate::ml::classifier::{AccountClassifier, ScoredLabel};
use crate::ml::features::{FeatureExtractor, FeatureVector};
use crate::ml::naive_bayes::NaiveBayesClassifier;
use crate::ml::prototype::PrototypeClassifier;
use crate::ml::tfidf::{TfIdfVectorizer, VectorizerState};

/// Version of the model artifact layout written by this crate.
pub const MODEL_FORMAT_VERSION: u32 = 2;

/// A trained classifier of any supported kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    NaiveBayes(NaiveBayesClassifier),
    Prototype(PrototypeClassifier),
}

impl ClassifierModel {
    /// Fit the classifier family selected in `config`.
    pub fn fit(config: &PredictorConfig, samples: &[(FeatureVector, AccountLabel)]) -> Result<Self> {
        match config.model.kind {
            ModelKind::NaiveBayes => Ok(ClassifierModel::NaiveBayes(NaiveBayesClassifier::fit(
                samples,
                config.model.alpha,
            )?)),
            ModelKind::Prototype => Ok(ClassifierModel::Prototype(PrototypeClassifier::fit(
                samples,
            )?)),
        }
    }

    fn inner(&self) -> &dyn AccountClassifier {
        match self {
            ClassifierModel::NaiveBayes(model) => model,
            ClassifierModel::Prototype(model) => model,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            ClassifierModel::NaiveBayes(model) => model.validate(),
            ClassifierModel::Prototype(model) => model.validate(),
        }
    }
}

impl AccountClassifier for ClassifierModel {
    fn scores(&self, features: &FeatureVector) -> Result<Vec<ScoredLabel>> {
        self.inner().scores(features)
    }

    fn labels(&self) -> &[AccountLabel] {
        self.inner().labels()
    }

    fn dimension(&self) -> usize {
        self.inner().dimension()
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}

/// On-disk form of a [`TrainedModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub vectorizer: VectorizerState,
    pub classifier: ClassifierModel,
    /// The classifier's label universe, checked against the attribute table
    /// by whoever builds a predictor from this artifact.
    pub labels: Vec<AccountLabel>,
    /// Split settings the model was trained under, if it was trained from a
    /// split dataset.
    pub split: Option<EvaluationConfig>,
    /// Descriptions kept out of training, scored by reports.
    pub held_out: Vec<AssetSample>,
}

impl ModelArtifact {
    /// Read an artifact from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file {}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write this artifact as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// A fitted vectorizer and the classifier trained on its output.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    vectorizer: Arc<TfIdfVectorizer>,
    classifier: Arc<ClassifierModel>,
    split: Option<EvaluationConfig>,
    held_out: Arc<Vec<AssetSample>>,
}

impl TrainedModel {
    /// Split `dataset` by `config.evaluation`, fit on the training part and
    /// keep the rest as the held-out set.
    pub fn train(config: &PredictorConfig, dataset: &Dataset) -> Result<Self> {
        config.validate()?;
        let (train, test) = dataset.split(
            config.evaluation.test_fraction,
            config.evaluation.seed,
        )?;

        log::info!(
            "Training on {} descriptions, holding out {} for evaluation",
            train.len(),
            test.len()
        );

        let mut model = Self::fit(config, &train)?;
        model.split = Some(config.evaluation.clone());
        model.held_out = Arc::new(test);
        Ok(model)
    }

    /// Fit the vectorizer and classifier on labeled samples.
    ///
    /// Nothing is held out.
    pub fn fit(config: &PredictorConfig, samples: &[AssetSample]) -> Result<Self> {
        config.validate()?;
        if samples.is_empty() {
            return Err(DeprnError::training("Training samples cannot be empty"));
        }

        let documents: Vec<String> = samples.iter().map(|s| s.description.clone()).collect();
        let mut vectorizer = TfIdfVectorizer::new(&config.analysis, config.vectorizer.clone())?;
        vectorizer.fit(&documents)?;

        let labeled = samples
            .iter()
            .map(|sample| Ok((vectorizer.transform(&sample.description)?, sample.label())))
            .collect::<Result<Vec<_>>>()?;
        let classifier = ClassifierModel::fit(config, &labeled)?;

        log::info!(
            "Trained {} classifier on {} descriptions ({} accounts, {} features)",
            classifier.name(),
            samples.len(),
            classifier.labels().len(),
            vectorizer.vocabulary_size()
        );

        Ok(Self {
            vectorizer: Arc::new(vectorizer),
            classifier: Arc::new(classifier),
            split: None,
            held_out: Arc::new(Vec::new()),
        })
    }

    /// Rebuild a model from an artifact, checking version and consistency.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        if artifact.format_version != MODEL_FORMAT_VERSION {
            return Err(DeprnError::configuration(format!(
                "Unsupported model format version {} (expected {MODEL_FORMAT_VERSION})",
                artifact.format_version
            )));
        }
        artifact.classifier.validate()?;
        if artifact.labels != artifact.classifier.labels() {
            return Err(DeprnError::configuration(
                "Model artifact label list does not match its classifier",
            ));
        }

        let vectorizer = TfIdfVectorizer::from_state(artifact.vectorizer)?;
        if vectorizer.dimension() != artifact.classifier.dimension() {
            return Err(DeprnError::configuration(format!(
                "Vectorizer produces {} features but classifier expects {}",
                vectorizer.dimension(),
                artifact.classifier.dimension()
            )));
        }

        Ok(Self {
            vectorizer: Arc::new(vectorizer),
            classifier: Arc::new(artifact.classifier),
            split: artifact.split,
            held_out: Arc::new(artifact.held_out),
        })
    }

    /// Snapshot this model as an artifact.
    pub fn to_artifact(&self) -> ModelArtifact {
        ModelArtifact {
            format_version: MODEL_FORMAT_VERSION,
            vectorizer: self.vectorizer.state(),
            classifier: self.classifier.as_ref().clone(),
            labels: self.classifier.labels().to_vec(),
            split: self.split.clone(),
            held_out: self.held_out.as_ref().clone(),
        }
    }

    /// Save this model as a JSON artifact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_artifact().save(path)
    }

    /// Load a model from a JSON artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_artifact(ModelArtifact::load(path)?)
    }

    pub fn vectorizer(&self) -> Arc<TfIdfVectorizer> {
        Arc::clone(&self.vectorizer)
    }

    pub fn classifier(&self) -> Arc<ClassifierModel> {
        Arc::clone(&self.classifier)
    }

    /// Split settings used by [`TrainedModel::train`], if any.
    pub fn split(&self) -> Option<&EvaluationConfig> {
        self.split.as_ref()
    }

    /// Descriptions the classifier never saw during training.
    pub fn held_out(&self) -> &[AssetSample] {
        &self.held_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<AssetSample> {
        vec![
            AssetSample::new("sedan company car", "Motor Vehicles"),
            AssetSample::new("utility truck", "Motor Vehicles"),
            AssetSample::new("laptop computer", "Computers"),
            AssetSample::new("desktop computer", "Computers"),
        ]
    }

    #[test]
    fn test_fit_both_kinds() {
        for kind in [ModelKind::NaiveBayes, ModelKind::Prototype] {
            let mut config = PredictorConfig::default();
            config.model.kind = kind;
            let model = TrainedModel::fit(&config, &samples()).unwrap();

            assert_eq!(model.classifier().name(), kind.as_str());
            let features = model.vectorizer().transform("company laptop computer").unwrap();
            assert_eq!(
                model.classifier().infer(&features).unwrap().as_str(),
                "Computers"
            );
        }
    }

    #[test]
    fn test_fit_rejects_empty_samples_and_bad_config() {
        let config = PredictorConfig::default();
        assert!(matches!(
            TrainedModel::fit(&config, &[]),
            Err(DeprnError::Training(_))
        ));

        let mut config = PredictorConfig::default();
        config.vectorizer.ngram_max = 5;
        assert!(TrainedModel::fit(&config, &samples()).is_err());
    }

    #[test]
    fn test_artifact_round_trip() {
        let model = TrainedModel::fit(&PredictorConfig::default(), &samples()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        model.save(&path).unwrap();
        let loaded = TrainedModel::load(&path).unwrap();

        for text in ["sedan", "desktop computer", ""] {
            let a = model.vectorizer().transform(text).unwrap();
            let b = loaded.vectorizer().transform(text).unwrap();
            assert_eq!(a, b);
            assert_eq!(
                model.classifier().infer(&a).unwrap(),
                loaded.classifier().infer(&b).unwrap()
            );
        }
    }

    #[test]
    fn test_train_keeps_held_out_set() {
        let dataset = Dataset::bundled().unwrap();
        let config = PredictorConfig::default();
        let model = TrainedModel::train(&config, &dataset).unwrap();

        let (_, expected) = dataset.split(0.25, 42).unwrap();
        assert_eq!(model.held_out(), expected.as_slice());
        assert_eq!(model.split(), Some(&config.evaluation));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        model.save(&path).unwrap();
        let loaded = TrainedModel::load(&path).unwrap();
        assert_eq!(loaded.held_out(), expected.as_slice());
        assert_eq!(loaded.split(), Some(&config.evaluation));

        // Fitting directly holds nothing out
        let fitted = TrainedModel::fit(&config, &samples()).unwrap();
        assert!(fitted.held_out().is_empty());
        assert!(fitted.to_artifact().split.is_none());
    }

    #[test]
    fn test_missing_artifact_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(matches!(err, DeprnError::Anyhow(_)));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_artifact_version_and_label_checks() {
        let model = TrainedModel::fit(&PredictorConfig::default(), &samples()).unwrap();

        let mut artifact = model.to_artifact();
        artifact.format_version = MODEL_FORMAT_VERSION + 1;
        assert!(matches!(
            TrainedModel::from_artifact(artifact),
            Err(DeprnError::Configuration(_))
        ));

        let mut artifact = model.to_artifact();
        artifact.labels.push(AccountLabel::new("Aircraft"));
        assert!(TrainedModel::from_artifact(artifact).is_err());

        let mut artifact = model.to_artifact();
        artifact.vectorizer.vocabulary.clear();
        artifact.vectorizer.idf.clear();
        assert!(TrainedModel::from_artifact(artifact).is_err());
    }
}
