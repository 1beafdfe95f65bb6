//! Error types for the deprn library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`DeprnError`] enum. Configuration errors are fatal: they signal that the
//! classifier, feature extractor and attribute table were assembled
//! inconsistently and must never be swallowed, since a silent fallback would
//! report a wrong depreciation rate or effective life.
//!
//! # Examples
//!
//! ```
//! use deprn::error::{DeprnError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(DeprnError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for deprn operations.
#[derive(Error, Debug)]
pub enum DeprnError {
    /// I/O errors (reading datasets, configs and model files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The predictor was assembled inconsistently: a label without attributes,
    /// a feature dimension mismatch, or an invalid configuration value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The labeled evaluation set is missing or empty.
    #[error("Evaluation data error: {0}")]
    EvaluationData(String),

    /// Model fitting failed (empty corpus, empty vocabulary, ...).
    #[error("Training error: {0}")]
    Training(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Malformed rows in a dataset file
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File access failures with the path attached as context
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with DeprnError.
pub type Result<T> = std::result::Result<T, DeprnError>;

impl DeprnError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        DeprnError::Configuration(msg.into())
    }

    /// Create a new evaluation data error.
    pub fn evaluation_data<S: Into<String>>(msg: S) -> Self {
        DeprnError::EvaluationData(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        DeprnError::Training(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        DeprnError::Analysis(msg.into())
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        DeprnError::Dataset(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        DeprnError::InvalidArgument(msg.into())
    }

    /// Whether this error means the predictor itself is unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeprnError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = DeprnError::configuration("label missing");
        assert_eq!(error.to_string(), "Configuration error: label missing");

        let error = DeprnError::evaluation_data("empty set");
        assert_eq!(error.to_string(), "Evaluation data error: empty set");

        let error = DeprnError::analysis("bad regex");
        assert_eq!(error.to_string(), "Analysis error: bad regex");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let deprn_error = DeprnError::from(io_error);

        match deprn_error {
            DeprnError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_anyhow_context_is_kept() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let deprn_error = DeprnError::from(anyhow::Error::new(io_error).context("Failed to read model.json"));

        assert!(matches!(deprn_error, DeprnError::Anyhow(_)));
        assert_eq!(
            deprn_error.to_string(),
            "Failed to read model.json: File not found"
        );
    }

    #[test]
    fn test_only_configuration_errors_are_fatal() {
        assert!(DeprnError::configuration("x").is_fatal());
        assert!(!DeprnError::evaluation_data("x").is_fatal());
        assert!(!DeprnError::training("x").is_fatal());
    }
}
