//! Multinomial naive Bayes on raw (non-negative) features.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrognosError, Result};
use crate::model::{
    Classifier, FeatureScaling, ModelMetadata, argmax, softmax, validate_input,
    validate_training_data,
};

/// Multinomial naive Bayes with Laplace smoothing.
///
/// Works directly on the raw TF-IDF/indicator features, which are all
/// non-negative. Class priors come from the empirical label distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    class_log_prior: Vec<f64>,
    /// Per-class log feature probabilities, `[class][feature]`.
    feature_log_prob: Vec<Vec<f64>>,
    n_features: usize,
    metadata: ModelMetadata,
}

impl MultinomialNb {
    /// Create an untrained model with the given smoothing parameter.
    pub fn new(alpha: f64) -> Self {
        let mut metadata = ModelMetadata::new("naive_bayes");
        metadata.hyperparameters.insert("alpha".to_string(), alpha);
        Self {
            alpha,
            class_log_prior: Vec::new(),
            feature_log_prob: Vec::new(),
            n_features: 0,
            metadata,
        }
    }

    /// Load a trained model from a JSON artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&content)?;
        Ok(model)
    }

    fn joint_log_likelihood(&self, x: &[f64]) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(self.feature_log_prob.iter())
            .map(|(&prior, log_probs)| {
                prior
                    + x.iter()
                        .zip(log_probs.iter())
                        .map(|(&value, &log_prob)| value * log_prob)
                        .sum::<f64>()
            })
            .collect()
    }
}

impl Default for MultinomialNb {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Classifier for MultinomialNb {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<()> {
        validate_training_data(x, y, n_classes)?;

        let n_features = x[0].len();
        for row in x {
            if row.iter().any(|&value| value < 0.0) {
                return Err(PrognosError::config(
                    "multinomial naive Bayes requires non-negative features",
                ));
            }
        }

        let mut class_counts = vec![0usize; n_classes];
        let mut feature_sums = vec![vec![0.0; n_features]; n_classes];
        for (row, &label) in x.iter().zip(y.iter()) {
            class_counts[label] += 1;
            for (sum, &value) in feature_sums[label].iter_mut().zip(row.iter()) {
                *sum += value;
            }
        }

        let n_samples = x.len() as f64;
        self.class_log_prior = class_counts
            .iter()
            .map(|&count| ((count as f64).max(f64::MIN_POSITIVE) / n_samples).ln())
            .collect();

        self.feature_log_prob = feature_sums
            .into_iter()
            .map(|sums| {
                let total: f64 = sums.iter().sum::<f64>() + self.alpha * n_features as f64;
                sums.into_iter()
                    .map(|sum| ((sum + self.alpha) / total).ln())
                    .collect()
            })
            .collect();

        self.n_features = n_features;
        self.metadata.trained_at = chrono::Utc::now();
        self.metadata.training_examples = x.len();
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> Result<usize> {
        validate_input(x, self.n_features, self.is_trained())?;
        Ok(argmax(&self.joint_log_likelihood(x)))
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        validate_input(x, self.n_features, self.is_trained())?;
        Ok(softmax(&self.joint_log_likelihood(x)))
    }

    fn scaling(&self) -> FeatureScaling {
        FeatureScaling::Raw
    }

    fn name(&self) -> &'static str {
        "naive_bayes"
    }

    fn is_trained(&self) -> bool {
        !self.feature_log_prob.is_empty()
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
