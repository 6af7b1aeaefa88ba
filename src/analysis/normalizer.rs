//! Deterministic normalization of raw symptom strings.

use regex::Regex;

use crate::analysis::lexicon::MedicalLexicon;
use crate::analysis::synonym::SynonymTable;
use crate::error::{PrognosError, Result};

/// An ordered sequence of canonical symptom phrases derived from one raw
/// input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSymptoms {
    phrases: Vec<String>,
}

impl NormalizedSymptoms {
    /// Construct from already-normalized phrases.
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }

    /// The canonical symptom phrases, in input order.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Number of symptom phrases.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Check whether no phrases survived normalization.
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Space-joined symptom text used for vectorization and keyword matching.
    pub fn joined(&self) -> String {
        self.phrases.join(" ")
    }

    /// Semicolon-delimited form, re-normalizable to the same phrases.
    pub fn to_delimited(&self) -> String {
        self.phrases.join("; ")
    }
}

/// Cleans raw symptom text and standardizes medical terminology.
///
/// The pipeline is: lowercase, strip characters outside letters, digits,
/// whitespace and the semicolon delimiter, collapse whitespace runs, apply
/// the synonym table, then split on the delimiter. Normalization is
/// deterministic and idempotent: re-normalizing already-normal text is a
/// fixed point.
#[derive(Debug)]
pub struct TextNormalizer {
    strip: Regex,
    spaces: Regex,
    synonyms: SynonymTable,
}

impl TextNormalizer {
    /// Build a normalizer using the lexicon's synonym pairs.
    pub fn new(lexicon: &MedicalLexicon) -> Result<Self> {
        let strip = Regex::new(r"[^\w\s;]")
            .map_err(|e| PrognosError::analysis(format!("invalid strip pattern: {e}")))?;
        let spaces = Regex::new(r"\s+")
            .map_err(|e| PrognosError::analysis(format!("invalid whitespace pattern: {e}")))?;

        // Synonym keys go through the same character cleaning as input text
        // so entries like "can't breathe" match their cleaned form.
        let pairs: Vec<(String, String)> = lexicon
            .synonyms()
            .iter()
            .map(|(colloquial, canonical)| {
                (
                    clean_with(&strip, &spaces, colloquial),
                    canonical.to_string(),
                )
            })
            .collect();
        let synonyms = SynonymTable::new(&pairs)?;

        Ok(Self {
            strip,
            spaces,
            synonyms,
        })
    }

    /// Lowercase, strip special characters, and collapse whitespace.
    pub fn clean(&self, text: &str) -> String {
        clean_with(&self.strip, &self.spaces, text)
    }

    /// Normalize raw symptom text into canonical phrases.
    ///
    /// Empty or all-whitespace input yields an empty set; callers reject
    /// that for inference but may accept it for storage.
    pub fn normalize(&self, raw_text: &str) -> NormalizedSymptoms {
        let cleaned = self.clean(raw_text);
        let standardized = self.synonyms.apply(&cleaned);

        let phrases = standardized
            .split(';')
            .map(|phrase| phrase.trim().to_string())
            .filter(|phrase| !phrase.is_empty())
            .collect();

        NormalizedSymptoms::new(phrases)
    }
}

fn clean_with(strip: &Regex, spaces: &Regex, text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = strip.replace_all(&lowered, " ");
    let collapsed = spaces.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(&MedicalLexicon::new()).unwrap()
    }

    #[test]
    fn test_clean_lowercases_and_strips() {
        let n = normalizer();
        assert_eq!(n.clean("Fever!!  And   CHILLS."), "fever and chills");
        assert_eq!(n.clean("  headache;   nausea  "), "headache; nausea");
    }

    #[test]
    fn test_normalize_splits_on_semicolon() {
        let n = normalizer();
        let result = n.normalize("fever; headache; fatigue");
        assert_eq!(result.phrases(), &["fever", "headache", "fatigue"]);
        assert_eq!(result.joined(), "fever headache fatigue");
    }

    #[test]
    fn test_normalize_applies_synonyms() {
        let n = normalizer();
        let result = n.normalize("throwing up; high temperature");
        assert_eq!(result.phrases(), &["vomiting", "fever"]);
    }

    #[test]
    fn test_normalize_drops_empty_phrases() {
        let n = normalizer();
        let result = n.normalize("fever;; ; headache");
        assert_eq!(result.phrases(), &["fever", "headache"]);
    }

    #[test]
    fn test_empty_input_yields_empty_set() {
        let n = normalizer();
        assert!(n.normalize("").is_empty());
        assert!(n.normalize("   ").is_empty());
        assert!(n.normalize(" ; ; ").is_empty());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let n = normalizer();
        let once = n.normalize("Throwing Up!; tired;  high temperature ");
        let twice = n.normalize(&once.to_delimited());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_apostrophe_phrases_standardize() {
        let n = normalizer();
        let result = n.normalize("can't breathe; chest pain");
        assert_eq!(result.phrases()[0], "shortness of breath");
    }

    #[test]
    fn test_deterministic_output() {
        let n = normalizer();
        let a = n.normalize("fever; dizzy; stomach pain");
        let b = n.normalize("fever; dizzy; stomach pain");
        assert_eq!(a, b);
        assert_eq!(a.phrases(), &["fever", "dizziness", "abdominal pain"]);
    }
}
