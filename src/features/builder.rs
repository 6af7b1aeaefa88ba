//! Combined feature builder: TF-IDF sub-vector plus engineered indicators.

use crate::analysis::{MedicalLexicon, NormalizedSymptoms};
use crate::error::Result;
use crate::features::engineered::{
    ENGINEERED_FEATURE_COUNT, engineered_feature_names, engineered_features,
};
use crate::features::tfidf::{TfIdfConfig, TfIdfVectorizer};

/// Turns a normalized symptom set into a fixed-length numeric vector.
///
/// The vector is the concatenation of the TF-IDF weights over the frozen
/// vocabulary and the engineered indicator sub-vector. Once `fit` has run,
/// `transform` is pure: the same input always produces a bit-identical
/// vector of the same length.
#[derive(Debug)]
pub struct FeatureBuilder {
    vectorizer: TfIdfVectorizer,
    lexicon: MedicalLexicon,
}

impl FeatureBuilder {
    /// Create an unfitted builder.
    pub fn new(config: TfIdfConfig, lexicon: MedicalLexicon) -> Self {
        let vectorizer = TfIdfVectorizer::new(config, &lexicon);
        Self { vectorizer, lexicon }
    }

    /// Reassemble a builder from a persisted vectorizer.
    pub fn from_vectorizer(vectorizer: TfIdfVectorizer, lexicon: MedicalLexicon) -> Self {
        Self { vectorizer, lexicon }
    }

    /// Fit the TF-IDF vocabulary on the training corpus. Happens exactly
    /// once; the engineered sub-vector needs no fitting.
    pub fn fit(&mut self, corpus: &[NormalizedSymptoms]) -> Result<()> {
        let documents: Vec<String> = corpus.iter().map(|s| s.joined()).collect();
        self.vectorizer.fit(&documents)
    }

    /// Transform one normalized symptom set into a feature vector.
    pub fn transform(&self, symptoms: &NormalizedSymptoms) -> Result<Vec<f64>> {
        let mut vector = self.vectorizer.transform(&symptoms.joined())?;
        vector.extend(engineered_features(&self.lexicon, symptoms));
        Ok(vector)
    }

    /// Transform a whole corpus into a feature matrix.
    pub fn transform_corpus(&self, corpus: &[NormalizedSymptoms]) -> Result<Vec<Vec<f64>>> {
        corpus.iter().map(|s| self.transform(s)).collect()
    }

    /// Total feature vector length: vocabulary size plus engineered count.
    pub fn n_features(&self) -> usize {
        self.vectorizer.vocabulary_size() + ENGINEERED_FEATURE_COUNT
    }

    /// Feature names in vector order, for the metadata sidecar.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.vectorizer.feature_names();
        names.extend(engineered_feature_names(&self.lexicon));
        names
    }

    /// Check whether the builder has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.vectorizer.is_fitted()
    }

    /// The fitted vectorizer, for persistence.
    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TextNormalizer;

    fn corpus(normalizer: &TextNormalizer, texts: &[&str]) -> Vec<NormalizedSymptoms> {
        texts.iter().map(|t| normalizer.normalize(t)).collect()
    }

    fn fitted_builder() -> (FeatureBuilder, TextNormalizer) {
        let lexicon = MedicalLexicon::new();
        let normalizer = TextNormalizer::new(&lexicon).unwrap();
        let mut builder = FeatureBuilder::new(TfIdfConfig::default(), lexicon);
        let train = corpus(
            &normalizer,
            &[
                "fever; headache; fatigue",
                "abdominal pain; nausea; vomiting",
                "cough; shortness of breath; chest pain",
            ],
        );
        builder.fit(&train).unwrap();
        (builder, normalizer)
    }

    #[test]
    fn test_vector_length_is_vocab_plus_engineered() {
        let (builder, normalizer) = fitted_builder();
        let vector = builder
            .transform(&normalizer.normalize("fever; cough"))
            .unwrap();
        assert_eq!(vector.len(), builder.n_features());
        assert_eq!(
            vector.len(),
            builder.vectorizer().vocabulary_size() + ENGINEERED_FEATURE_COUNT
        );
    }

    #[test]
    fn test_length_constant_across_inputs() {
        let (builder, normalizer) = fitted_builder();
        let a = builder
            .transform(&normalizer.normalize("fever; headache"))
            .unwrap();
        let b = builder
            .transform(&normalizer.normalize("unseen; phrases; entirely"))
            .unwrap();
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn test_transform_is_bit_identical_for_same_input() {
        let (builder, normalizer) = fitted_builder();
        let a = builder
            .transform(&normalizer.normalize("fever; headache; fatigue"))
            .unwrap();
        let b = builder
            .transform(&normalizer.normalize("fever; headache; fatigue"))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let lexicon = MedicalLexicon::new();
        let normalizer = TextNormalizer::new(&lexicon).unwrap();
        let builder = FeatureBuilder::new(TfIdfConfig::default(), lexicon);
        assert!(builder.transform(&normalizer.normalize("fever; cough")).is_err());
    }

    #[test]
    fn test_feature_names_match_length() {
        let (builder, _) = fitted_builder();
        assert_eq!(builder.feature_names().len(), builder.n_features());
    }
}
