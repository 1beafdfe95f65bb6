//! Analyzer for asset descriptions.
//!
//! # Pipeline
//!
//! 1. RegexTokenizer (runs of two or more word characters)
//! 2. LowercaseFilter
//! 3. StopFilter (optional, English list plus configured extras)
//! 4. StemFilter (optional, suffix stemmer)
//!
//! # Examples
//!
//! ```
//! use deprn::analysis::analyzer::Analyzer;
//! use deprn::analysis::analyzer::description::DescriptionAnalyzer;
//!
//! let analyzer = DescriptionAnalyzer::new().unwrap();
//! let tokens: Vec<_> = analyzer.analyze("Company Cars for Sales Staff").unwrap().collect();
//!
//! let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["company", "car", "sale", "staff"]);
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{LowercaseFilter, StemFilter, StopFilter};
use crate::analysis::tokenizer::RegexTokenizer;
use crate::config::AnalysisConfig;
use crate::error::Result;

/// Analyzer that normalizes free-text asset descriptions.
pub struct DescriptionAnalyzer {
    inner: PipelineAnalyzer,
    config: AnalysisConfig,
}

impl DescriptionAnalyzer {
    /// Create an analyzer with the default configuration.
    pub fn new() -> Result<Self> {
        Self::from_config(&AnalysisConfig::default())
    }

    /// Create an analyzer from an analysis configuration.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let tokenizer = Arc::new(RegexTokenizer::new()?);
        let mut analyzer =
            PipelineAnalyzer::new(tokenizer).add_filter(Arc::new(LowercaseFilter::new()));

        if config.stop_words {
            analyzer = analyzer.add_filter(Arc::new(StopFilter::extended(
                config.extra_stop_words.iter().cloned(),
            )));
        }
        if config.stemming {
            analyzer = analyzer.add_filter(Arc::new(StemFilter::new()));
        }

        Ok(Self {
            inner: analyzer.with_name("description"),
            config: config.clone(),
        })
    }

    /// The configuration this analyzer was built from.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze `text` and collect the surviving token texts.
    pub fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

impl Analyzer for DescriptionAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "description"
    }
}

impl Debug for DescriptionAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptionAnalyzer")
            .field("inner", &self.inner)
            .finish()
    }
}
