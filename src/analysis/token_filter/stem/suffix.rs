//! Light English suffix stemmer.

use super::Stemmer;

/// Shortest stem the stemmer will leave behind.
const MIN_STEM_LEN: usize = 3;

/// Light stemmer that folds plurals and the `-ing` / `-ed` verb forms.
///
/// Asset descriptions are short noun phrases, so conflating "trucks" with
/// "truck" matters far more than deep morphological analysis. Rules apply in
/// order: plural folding first, then one verb suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixStemmer;

impl SuffixStemmer {
    /// Create a new suffix stemmer.
    pub fn new() -> Self {
        SuffixStemmer
    }

    fn fold_plural(word: &str) -> String {
        if word.len() <= MIN_STEM_LEN {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ies") {
            if stem.len() >= 2 {
                return format!("{stem}y");
            }
        }
        if let Some(stem) = word.strip_suffix("sses") {
            return format!("{stem}ss");
        }
        for suffix in ["xes", "ches", "shes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }
        match word.strip_suffix('s') {
            Some(stem) => stem.to_string(),
            None => word.to_string(),
        }
    }

    fn strip_verb_suffix(word: String) -> String {
        for suffix in ["ing", "ed"] {
            if let Some(stem) = word.strip_suffix(suffix) {
                if stem.len() >= MIN_STEM_LEN {
                    return Self::undouble(stem).to_string();
                }
            }
        }
        word
    }

    /// "fitt" -> "fit", keeping the doubled `l`, `s` and `z` of "install",
    /// "dress" and "buzz".
    fn undouble(stem: &str) -> &str {
        let bytes = stem.as_bytes();
        let n = bytes.len();
        if n > MIN_STEM_LEN
            && bytes[n - 1] == bytes[n - 2]
            && bytes[n - 1].is_ascii_alphabetic()
            && !b"aeiouylsz".contains(&bytes[n - 1])
        {
            &stem[..n - 1]
        } else {
            stem
        }
    }
}

impl Stemmer for SuffixStemmer {
    fn stem(&self, word: &str) -> String {
        Self::strip_verb_suffix(Self::fold_plural(word))
    }

    fn name(&self) -> &'static str {
        "suffix"
    }
}
