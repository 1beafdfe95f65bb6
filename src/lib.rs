//! # deprn
//!
//! Predicts the depreciation account of a free-text asset description and
//! resolves the account's depreciation rate, effective life and tax
//! category.
//!
//! ## Features
//!
//! - Text analysis pipeline (regex tokenizer, lowercasing, stop words, stemming)
//! - TF-IDF feature extraction
//! - Multinomial Naive Bayes and nearest-prototype classifiers
//! - Classification reports with per-account precision, recall and F1
//! - Versioned JSON model files
//!
//! ## Example
//!
//! ```
//! use deprn::prelude::*;
//!
//! let dataset = Dataset::bundled().unwrap();
//! let predictor = DeprnPredictor::train(&PredictorConfig::default(), &dataset).unwrap();
//!
//! let prediction = predictor.predict("company car used for sales visits").unwrap();
//! assert_eq!(prediction.account.as_str(), "Motor Vehicles");
//! assert_eq!(prediction.attributes.rate_percent, 25.0);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod depreciation;
pub mod error;
pub mod ml;

pub mod prelude {
    pub use crate::config::{ModelKind, PredictorConfig};
    pub use crate::depreciation::{
        AccountAttributes, AccountLabel, AssetSample, AttributeTable, Dataset, DeprnPredictor,
        Prediction,
    };
    pub use crate::error::{DeprnError, Result};
    pub use crate::ml::{AccountClassifier, ClassificationReport, FeatureExtractor, TrainedModel};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
