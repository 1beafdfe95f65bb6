use std::sync::Arc;
use std::thread;

use deprn::config::{ModelKind, PredictorConfig};
use deprn::depreciation::{AccountLabel, Dataset, DeprnPredictor};
use deprn::error::{DeprnError, Result};
use deprn::ml::{AccountClassifier, ModelArtifact, TrainedModel};

fn bundled_predictor(kind: ModelKind) -> Result<DeprnPredictor> {
    let mut config = PredictorConfig::default();
    config.model.kind = kind;
    DeprnPredictor::train(&config, &Dataset::bundled()?)
}

const DESCRIPTIONS: &[&str] = &[
    "company car used for sales visits",
    "laptop for the bookkeeper",
    "ergonomic chairs",
    "forklift",
    "fitout of leased shop",
    "accounting software licence",
    "smartphone",
    "",
    "   ",
    "!!!",
    "zeppelin hangar",
];

#[test]
fn test_company_car_example() -> Result<()> {
    for kind in [ModelKind::NaiveBayes, ModelKind::Prototype] {
        let predictor = bundled_predictor(kind)?;
        let prediction = predictor.predict("company car used for sales visits")?;

        assert_eq!(prediction.account.as_str(), "Motor Vehicles");
        assert_eq!(prediction.attributes.rate_percent, 25.0);
        assert_eq!(prediction.attributes.life_years, 8.0);
        assert_eq!(prediction.attributes.tax_category, "Plant & Equipment");
    }
    Ok(())
}

#[test]
fn test_prediction_properties() -> Result<()> {
    let predictor = bundled_predictor(ModelKind::NaiveBayes)?;

    // Every reachable label resolves
    for label in predictor.classifier().labels() {
        predictor.attributes().lookup(label)?;
    }

    for description in DESCRIPTIONS {
        let first = predictor.predict(description)?;
        let second = predictor.predict(description)?;
        assert_eq!(first, second);
        assert_eq!(
            &first.attributes,
            predictor.attributes().lookup(&first.account)?
        );
    }
    Ok(())
}

#[test]
fn test_report_is_stable_and_bounded() -> Result<()> {
    let predictor = bundled_predictor(ModelKind::NaiveBayes)?;

    let first = predictor.report()?;
    let second = predictor.report()?;
    assert_eq!(first, second);

    assert_eq!(first.total, predictor.evaluation_set().len());
    assert!((0.0..=1.0).contains(&first.accuracy));
    for class in &first.classes {
        assert!((0.0..=1.0).contains(&class.precision));
        assert!((0.0..=1.0).contains(&class.recall));
        assert!((0.0..=1.0).contains(&class.f1));
    }
    let support: usize = first.classes.iter().map(|c| c.support).sum();
    assert_eq!(support, first.total);
    Ok(())
}

#[test]
fn test_concurrent_predictions_match_sequential() -> Result<()> {
    let predictor = bundled_predictor(ModelKind::Prototype)?;
    let expected = DESCRIPTIONS
        .iter()
        .map(|d| predictor.predict(d))
        .collect::<Result<Vec<_>>>()?;

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let predictor = predictor.clone();
                scope.spawn(move || {
                    DESCRIPTIONS
                        .iter()
                        .map(|d| predictor.predict(d))
                        .collect::<Result<Vec<_>>>()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    });

    assert_eq!(predictor.predict_batch(DESCRIPTIONS)?, expected);
    Ok(())
}

#[test]
fn test_saved_model_predicts_identically() -> Result<()> {
    let dataset = Dataset::bundled()?;
    let config = PredictorConfig::default();
    let table = Arc::new(dataset.attribute_table()?);

    let model = TrainedModel::train(&config, &dataset)?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("model.json");
    model.save(&path)?;

    let in_memory = DeprnPredictor::train(&config, &dataset)?;
    let loaded = DeprnPredictor::from_artifact(ModelArtifact::load(&path)?, table)?;
    assert_eq!(in_memory.evaluation_set(), loaded.evaluation_set());

    for description in DESCRIPTIONS {
        assert_eq!(in_memory.predict(description)?, loaded.predict(description)?);
    }
    assert_eq!(in_memory.report()?, loaded.report()?);
    Ok(())
}

#[test]
fn test_artifact_with_unknown_account_is_rejected() -> Result<()> {
    let dataset = Dataset::bundled()?;
    let model = TrainedModel::fit(&PredictorConfig::default(), &dataset.samples)?;

    let mut accounts = dataset.accounts.clone();
    accounts.retain(|record| record.account != "Software");
    let partial = Dataset::new(Vec::new(), accounts).attribute_table()?;

    let err = DeprnPredictor::from_artifact(model.to_artifact(), Arc::new(partial))
        .unwrap_err();
    assert!(matches!(err, DeprnError::Configuration(_)));
    assert!(err.to_string().contains("Software"));
    Ok(())
}

#[test]
fn test_train_from_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let samples = dir.path().join("samples.json");
    let accounts = dir.path().join("accounts.csv");

    std::fs::write(
        &samples,
        r#"[
            {"description": "utility vehicle", "account": "Motor Vehicles"},
            {"description": "sedan for director", "account": "Motor Vehicles"},
            {"description": "boardroom table", "account": "Office Furniture"},
            {"description": "office chairs", "account": "Office Furniture"}
        ]"#,
    )?;
    std::fs::write(
        &accounts,
        "account,rate_percent,life_years,tax_category\n\
         Motor Vehicles,25,8,Plant & Equipment\n\
         Office Furniture,20,10,Plant & Equipment\n",
    )?;

    let dataset = Dataset::load(&samples, &accounts)?;
    let predictor = DeprnPredictor::train(&PredictorConfig::default(), &dataset)?;

    let prediction = predictor.predict("new sedan")?;
    assert_eq!(prediction.account, AccountLabel::new("Motor Vehicles"));

    let prediction = predictor.predict("chairs for reception")?;
    assert_eq!(prediction.account.as_str(), "Office Furniture");
    assert_eq!(prediction.attributes.life_years, 10.0);
    Ok(())
}
