//! The prediction service: description in, account and attributes out.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PredictorConfig;
use crate::depreciation::account::{AccountAttributes, AccountLabel, AttributeTable};
use crate::depreciation::dataset::{AssetSample, Dataset};
use crate::error::{DeprnError, Result};
use crate::ml::classifier::{AccountClassifier, ScoredLabel};
use crate::ml::features::FeatureExtractor;
use crate::ml::metrics::ClassificationReport;
use crate::ml::model::{ModelArtifact, TrainedModel};

/// The predicted account of one description with its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub account: AccountLabel,
    pub attributes: AccountAttributes,
}

impl Prediction {
    /// Split into `(attributes, account)`.
    pub fn into_parts(self) -> (AccountAttributes, AccountLabel) {
        (self.attributes, self.account)
    }
}

/// Feature extractor, classifier and attribute table wired together.
///
/// All state is immutable once constructed and shared behind [`Arc`], so a
/// predictor can be cloned cheaply and used from many threads at once.
#[derive(Clone)]
pub struct DeprnPredictor {
    extractor: Arc<dyn FeatureExtractor>,
    classifier: Arc<dyn AccountClassifier>,
    attributes: Arc<AttributeTable>,
    evaluation_set: Arc<Vec<AssetSample>>,
}

impl std::fmt::Debug for DeprnPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeprnPredictor")
            .field("extractor", &self.extractor.name())
            .field("classifier", &self.classifier.name())
            .field("accounts", &self.attributes.len())
            .field("evaluation_set", &self.evaluation_set.len())
            .finish()
    }
}

impl DeprnPredictor {
    /// Assemble a predictor from already-trained parts.
    ///
    /// Fails with a configuration error if the extractor and classifier
    /// disagree on the feature dimension, or if any classifier label has no
    /// attributes.
    pub fn new(
        extractor: Arc<dyn FeatureExtractor>,
        classifier: Arc<dyn AccountClassifier>,
        attributes: Arc<AttributeTable>,
        evaluation_set: Vec<AssetSample>,
    ) -> Result<Self> {
        if extractor.dimension() != classifier.dimension() {
            return Err(DeprnError::configuration(format!(
                "Feature extractor '{}' produces {} features but classifier '{}' expects {}",
                extractor.name(),
                extractor.dimension(),
                classifier.name(),
                classifier.dimension()
            )));
        }
        if classifier.labels().is_empty() {
            return Err(DeprnError::configuration(format!(
                "Classifier '{}' has no labels",
                classifier.name()
            )));
        }
        attributes.ensure_covers(classifier.labels())?;

        Ok(Self {
            extractor,
            classifier,
            attributes,
            evaluation_set: Arc::new(evaluation_set),
        })
    }

    /// Split `dataset`, train on one part and keep the other for reports.
    pub fn train(config: &PredictorConfig, dataset: &Dataset) -> Result<Self> {
        config.validate()?;
        let attributes = dataset.attribute_table()?;
        let model = TrainedModel::train(config, dataset)?;
        Self::from_model(&model, Arc::new(attributes), model.held_out().to_vec())
    }

    /// Build a predictor around a trained model.
    pub fn from_model(
        model: &TrainedModel,
        attributes: Arc<AttributeTable>,
        evaluation_set: Vec<AssetSample>,
    ) -> Result<Self> {
        Self::new(
            model.vectorizer(),
            model.classifier(),
            attributes,
            evaluation_set,
        )
    }

    /// Build a predictor from a loaded model artifact.
    ///
    /// Reports score the descriptions the artifact held out of training.
    pub fn from_artifact(artifact: ModelArtifact, attributes: Arc<AttributeTable>) -> Result<Self> {
        let model = TrainedModel::from_artifact(artifact)?;
        log::info!(
            "Loaded {} model with {} accounts and {} held-out descriptions",
            model.classifier().name(),
            model.classifier().labels().len(),
            model.held_out().len()
        );
        Self::from_model(&model, attributes, model.held_out().to_vec())
    }

    /// Predict the account of `description` and resolve its attributes.
    ///
    /// Empty or unrecognised text still yields a prediction.
    pub fn predict(&self, description: &str) -> Result<Prediction> {
        let features = self.extractor.transform(description)?;
        let account = self.classifier.infer(&features)?;
        let attributes = self.attributes.lookup(&account)?.clone();

        log::debug!("Predicted '{account}' for {description:?}");

        Ok(Prediction {
            account,
            attributes,
        })
    }

    /// The best `k` candidate accounts with their scores, best first.
    pub fn predict_ranked(&self, description: &str, k: usize) -> Result<Vec<ScoredLabel>> {
        let features = self.extractor.transform(description)?;
        let mut ranked = self.classifier.ranked(&features)?;
        ranked.truncate(k);
        Ok(ranked)
    }

    /// Predict many descriptions in parallel, keeping input order.
    pub fn predict_batch<S: AsRef<str> + Sync>(&self, descriptions: &[S]) -> Result<Vec<Prediction>> {
        descriptions
            .par_iter()
            .map(|description| self.predict(description.as_ref()))
            .collect()
    }

    /// Evaluate the classifier against the held-out descriptions.
    ///
    /// Recomputed on every call. An empty evaluation set fails this call
    /// only.
    pub fn report(&self) -> Result<ClassificationReport> {
        if self.evaluation_set.is_empty() {
            return Err(DeprnError::evaluation_data(
                "No held-out descriptions to evaluate against",
            ));
        }

        let labeled = self
            .evaluation_set
            .par_iter()
            .map(|sample| Ok((self.extractor.transform(&sample.description)?, sample.label())))
            .collect::<Result<Vec<_>>>()?;

        self.classifier.evaluate(&labeled)
    }

    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    pub fn classifier(&self) -> &dyn AccountClassifier {
        self.classifier.as_ref()
    }

    pub fn extractor(&self) -> &dyn FeatureExtractor {
        self.extractor.as_ref()
    }

    pub fn evaluation_set(&self) -> &[AssetSample] {
        &self.evaluation_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depreciation::dataset::AccountRecord;
    use crate::ml::features::FeatureVector;

    fn record(account: &str, rate: f64, life: f64, category: &str) -> AccountRecord {
        AccountRecord {
            account: account.to_string(),
            rate_percent: rate,
            life_years: life,
            tax_category: category.to_string(),
        }
    }

    fn dataset() -> Dataset {
        let samples = vec![
            AssetSample::new("motor vehicle sedan, business use", "Motor Vehicles"),
            AssetSample::new("company car for sales staff", "Motor Vehicles"),
            AssetSample::new("delivery van", "Motor Vehicles"),
            AssetSample::new("car used for client visits", "Motor Vehicles"),
            AssetSample::new("laptop computer", "Computers"),
            AssetSample::new("desktop computer and monitor", "Computers"),
            AssetSample::new("file server", "Computers"),
            AssetSample::new("notebook computer for accountant", "Computers"),
        ];
        let accounts = vec![
            record("Motor Vehicles", 25.0, 8.0, "Plant & Equipment"),
            record("Computers", 50.0, 4.0, "Plant & Equipment"),
        ];
        Dataset::new(samples, accounts)
    }

    fn predictor() -> DeprnPredictor {
        DeprnPredictor::train(&PredictorConfig::default(), &dataset()).unwrap()
    }

    /// Always answers with a fixed label.
    struct FixedClassifier {
        labels: Vec<AccountLabel>,
        dimension: usize,
    }

    impl AccountClassifier for FixedClassifier {
        fn scores(&self, _features: &FeatureVector) -> Result<Vec<ScoredLabel>> {
            Ok(self
                .labels
                .iter()
                .map(|label| ScoredLabel {
                    label: label.clone(),
                    score: 1.0,
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
            "fixed"
        }
    }

    #[test]
    fn test_company_car_is_a_motor_vehicle() {
        let prediction = predictor()
            .predict("company car used for sales visits")
            .unwrap();

        assert_eq!(prediction.account.as_str(), "Motor Vehicles");
        assert_eq!(prediction.attributes.rate_percent, 25.0);
        assert_eq!(prediction.attributes.life_years, 8.0);
        assert_eq!(prediction.attributes.tax_category, "Plant & Equipment");
    }

    #[test]
    fn test_predict_is_deterministic_and_consistent() {
        let predictor = predictor();

        for description in ["laptop", "delivery van for couriers", "", "   ", "zzz"] {
            let first = predictor.predict(description).unwrap();
            let second = predictor.predict(description).unwrap();
            assert_eq!(first, second);

            let expected = predictor.attributes().lookup(&first.account).unwrap();
            assert_eq!(&first.attributes, expected);
        }
    }

    #[test]
    fn test_predict_ranked() {
        let predictor = predictor();

        let ranked = predictor.predict_ranked("laptop computer", 5).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label.as_str(), "Computers");
        assert!(ranked[0].score >= ranked[1].score);

        assert_eq!(predictor.predict_ranked("laptop", 1).unwrap().len(), 1);
        assert!(predictor.predict_ranked("laptop", 0).unwrap().is_empty());
    }

    #[test]
    fn test_predict_batch_keeps_order() {
        let predictor = predictor();
        let descriptions = ["laptop computer", "delivery van", ""];

        let batch = predictor.predict_batch(&descriptions[..]).unwrap();
        assert_eq!(batch.len(), 3);
        for (description, prediction) in descriptions.iter().zip(batch) {
            assert_eq!(prediction, predictor.predict(description).unwrap());
        }
    }

    #[test]
    fn test_report_is_stable() {
        let predictor = predictor();
        assert_eq!(predictor.evaluation_set().len(), 2);

        let first = predictor.report().unwrap();
        let second = predictor.report().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total, 2);
    }

    #[test]
    fn test_empty_evaluation_set_fails_report_only() {
        let mut config = PredictorConfig::default();
        config.evaluation.test_fraction = 0.0;
        let predictor = DeprnPredictor::train(&config, &dataset()).unwrap();

        assert!(matches!(
            predictor.report(),
            Err(DeprnError::EvaluationData(_))
        ));
        assert!(predictor.predict("laptop").is_ok());
    }

    #[test]
    fn test_missing_attributes_fail_at_construction() {
        let model = TrainedModel::fit(&PredictorConfig::default(), &dataset().samples).unwrap();
        let partial = AttributeTable::from_records(vec![record(
            "Computers",
            50.0,
            4.0,
            "Plant & Equipment",
        )])
        .unwrap();

        let err = DeprnPredictor::from_model(&model, Arc::new(partial), Vec::new()).unwrap_err();
        assert!(matches!(err, DeprnError::Configuration(_)));
        assert!(err.to_string().contains("Motor Vehicles"));
    }

    #[test]
    fn test_injected_classifier() {
        let model = TrainedModel::fit(&PredictorConfig::default(), &dataset().samples).unwrap();
        let table = Arc::new(dataset().attribute_table().unwrap());
        let extractor = model.vectorizer();

        let stub = Arc::new(FixedClassifier {
            labels: vec![AccountLabel::new("Computers")],
            dimension: extractor.dimension(),
        });
        let predictor =
            DeprnPredictor::new(extractor.clone(), stub, table.clone(), Vec::new()).unwrap();
        assert_eq!(
            predictor.predict("sedan").unwrap().account.as_str(),
            "Computers"
        );

        let unknown = Arc::new(FixedClassifier {
            labels: vec![AccountLabel::new("Aircraft")],
            dimension: extractor.dimension(),
        });
        assert!(matches!(
            DeprnPredictor::new(extractor.clone(), unknown, table.clone(), Vec::new()),
            Err(DeprnError::Configuration(_))
        ));

        let wrong_dimension = Arc::new(FixedClassifier {
            labels: vec![AccountLabel::new("Computers")],
            dimension: extractor.dimension() + 1,
        });
        assert!(matches!(
            DeprnPredictor::new(extractor, wrong_dimension, table, Vec::new()),
            Err(DeprnError::Configuration(_))
        ));
    }
}
