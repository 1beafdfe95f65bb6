//! Depreciation accounts, labeled data and the prediction service.

pub mod account;
pub mod dataset;
pub mod predictor;

pub use account::{AccountAttributes, AccountLabel, AttributeTable};
pub use dataset::{AccountRecord, AssetSample, Dataset};
pub use predictor::{DeprnPredictor, Prediction};
