//! TF-IDF vectorization over unigrams and bigrams of symptom text.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::MedicalLexicon;
use crate::error::{PrognosError, Result};

/// Configuration for the TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfConfig {
    /// Maximum vocabulary size; most-frequent terms are kept.
    pub max_features: usize,
    /// Terms appearing in more than this fraction of documents are excluded.
    pub max_df: f64,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            max_df: 0.95,
        }
    }
}

/// TF-IDF vectorizer for symptom text feature extraction.
///
/// Tokenizes joined symptom text into stop-word-filtered unigrams and
/// bigrams. The vocabulary and idf weights are frozen at fit time;
/// `transform` never mutates state and always returns a vector of
/// `vocabulary_size()` entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: TfIdfConfig,
    /// Term -> feature index, assigned in sorted term order.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per feature index.
    idf: Vec<f64>,
    /// Number of documents seen at fit time.
    n_documents: usize,
    /// Stop words captured from the lexicon at construction.
    stop_words: BTreeSet<String>,
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer, capturing the lexicon's stop words.
    pub fn new(config: TfIdfConfig, lexicon: &MedicalLexicon) -> Self {
        let stop_words = all_stop_words(lexicon);
        Self {
            config,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            stop_words,
        }
    }

    /// Fit the vocabulary and idf weights on the training documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(PrognosError::data_insufficient(
                "cannot fit vectorizer on an empty corpus",
            ));
        }

        let n = documents.len();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms: HashSet<String> = self.tokenize(doc).into_iter().collect();
            for term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        // Drop terms that appear in more than max_df of all documents.
        let mut candidates: Vec<(String, usize)> = document_frequency
            .into_iter()
            .filter(|(_, df)| (*df as f64) / (n as f64) <= self.config.max_df)
            .collect();

        // Cap the vocabulary at max_features, keeping the terms with the
        // highest document frequency (ties broken by term order).
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        candidates.truncate(self.config.max_features);

        // Final feature order is sorted term order.
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(candidates.len());
        for (idx, (term, df)) in candidates.into_iter().enumerate() {
            // IDF = ln((N + 1) / (df + 1)) + 1
            idf.push(((n as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
            vocabulary.insert(term, idx);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n;

        Ok(())
    }

    /// Transform one document into a TF-IDF vector of frozen length.
    pub fn transform(&self, document: &str) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(PrognosError::config(
                "TF-IDF vectorizer used before fitting",
            ));
        }

        let tokens = self.tokenize(document);
        let mut tf = vec![0.0; self.vocabulary.len()];

        for token in &tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                tf[idx] += 1.0;
            }
        }

        // Normalize by document length, then apply idf.
        let doc_length = tokens.len() as f64;
        if doc_length > 0.0 {
            for (idx, count) in tf.iter_mut().enumerate() {
                *count = *count / doc_length * self.idf[idx];
            }
        }

        Ok(tf)
    }

    /// Tokenize into stop-word-filtered unigrams plus adjacent bigrams.
    fn tokenize(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text
            .split_whitespace()
            .filter(|word| !self.stop_words.contains(*word))
            .collect();

        let mut tokens: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        for pair in words.windows(2) {
            tokens.push(format!("{} {}", pair[0], pair[1]));
        }
        tokens
    }

    /// Check whether the vectorizer has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.n_documents > 0
    }

    /// Size of the frozen vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Feature names in index order, prefixed `tfidf_`.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = vec![String::new(); self.vocabulary.len()];
        for (term, &idx) in &self.vocabulary {
            names[idx] = format!("tfidf_{term}");
        }
        names
    }

    /// Save the fitted vectorizer as a JSON artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a fitted vectorizer from a JSON artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let vectorizer: Self = serde_json::from_str(&content)?;
        Ok(vectorizer)
    }
}

fn all_stop_words(lexicon: &MedicalLexicon) -> BTreeSet<String> {
    lexicon
        .stop_words()
        .iter()
        .map(|word| word.to_string())
        .collect()
}
