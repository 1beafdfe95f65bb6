//! Text analysis for asset descriptions.
//!
//! An analyzer turns a raw description into a stream of normalized tokens:
//! a tokenizer splits the text, then token filters lowercase it, drop stop
//! words and reduce words to a common stem. The feature extractor feeds the
//! surviving tokens into its TF-IDF vocabulary.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
