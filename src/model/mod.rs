//! Classifier implementations for the disease prediction model bank.
//!
//! Each model is trained independently on the identical train split and
//! declares which feature representation it expects (raw or standardized).
//! Probability outputs always cover the full class range and sum to 1.

pub mod bank;
pub mod logistic_regression;
pub mod mlp;
pub mod naive_bayes;
pub mod random_forest;
pub mod svm;

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use bank::{MODEL_FILES, ModelBank};
pub use logistic_regression::{LogisticRegression, LogisticRegressionConfig};
pub use mlp::{MlpClassifier, MlpConfig};
pub use naive_bayes::MultinomialNb;
pub use random_forest::{RandomForest, RandomForestConfig};
pub use svm::{LinearSvm, SvmConfig};

use crate::error::{PrognosError, Result};

/// Feature representation a classifier expects at fit and predict time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureScaling {
    /// The raw feature vector.
    Raw,
    /// The standardized feature vector (per-dimension mean/variance).
    Standardized,
}

/// Model metadata for tracking model information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier.
    pub name: String,
    /// Model version.
    pub version: String,
    /// Training timestamp.
    pub trained_at: chrono::DateTime<chrono::Utc>,
    /// Number of training examples used.
    pub training_examples: usize,
    /// Model hyperparameters.
    pub hyperparameters: HashMap<String, f64>,
}

impl ModelMetadata {
    /// Create metadata for an untrained model.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: "1.0".to_string(),
            trained_at: chrono::Utc::now(),
            training_examples: 0,
            hyperparameters: HashMap::new(),
        }
    }
}

/// Trait for classifiers in the model bank.
pub trait Classifier: Send + Sync {
    /// Train on a feature matrix and encoded labels.
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<()>;

    /// Predict the class id for one feature vector.
    fn predict(&self, x: &[f64]) -> Result<usize>;

    /// Predict the probability vector over all classes; entries sum to 1.
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>>;

    /// Which feature representation this model expects.
    fn scaling(&self) -> FeatureScaling;

    /// Stable model name, used for artifact files and result maps.
    fn name(&self) -> &'static str;

    /// Check if the model is trained.
    fn is_trained(&self) -> bool;

    /// Get model metadata.
    fn metadata(&self) -> &ModelMetadata;

    /// Save the trained model to a file.
    fn save(&self, path: &Path) -> Result<()>;
}

/// Validate a training set before fitting.
///
/// Fewer samples than classes cannot produce a usable classifier and is a
/// data error, not a crash.
pub(crate) fn validate_training_data(
    x: &[Vec<f64>],
    y: &[usize],
    n_classes: usize,
) -> Result<()> {
    if x.is_empty() || n_classes == 0 {
        return Err(PrognosError::data_insufficient("empty training set"));
    }
    if x.len() != y.len() {
        return Err(PrognosError::config(format!(
            "feature matrix has {} rows but {} labels",
            x.len(),
            y.len()
        )));
    }
    if x.len() < n_classes {
        return Err(PrognosError::data_insufficient(format!(
            "{} samples for {} classes",
            x.len(),
            n_classes
        )));
    }
    let n_features = x[0].len();
    if x.iter().any(|row| row.len() != n_features) {
        return Err(PrognosError::config("ragged training feature matrix"));
    }
    if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
        return Err(PrognosError::config(format!(
            "label {bad} outside class range 0..{n_classes}"
        )));
    }
    Ok(())
}

/// Check that a prediction input matches the fitted feature count.
pub(crate) fn validate_input(x: &[f64], n_features: usize, trained: bool) -> Result<()> {
    if !trained {
        return Err(PrognosError::config("model used before training"));
    }
    if x.len() != n_features {
        return Err(PrognosError::config(format!(
            "input has {} features, model was trained on {n_features}",
            x.len()
        )));
    }
    Ok(())
}

/// Balanced per-class weights: `n_samples / (n_classes * class_count)`.
pub(crate) fn balanced_class_weights(y: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &label in y {
        counts[label] += 1;
    }
    counts
        .into_iter()
        .map(|count| {
            if count == 0 {
                0.0
            } else {
                y.len() as f64 / (n_classes as f64 * count as f64)
            }
        })
        .collect()
}

/// Numerically stable softmax.
pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest entry; ties go to the lowest index.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &value) in values.iter().enumerate() {
        if value > values[best] {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_fewer_samples_than_classes() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![0, 1];
        let err = validate_training_data(&x, &y, 3).unwrap_err();
        assert!(matches!(err, PrognosError::DataInsufficient(_)));
    }

    #[test]
    fn test_validate_rejects_out_of_range_label() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![0, 5];
        assert!(validate_training_data(&x, &y, 2).is_err());
    }

    #[test]
    fn test_balanced_weights_favor_rare_classes() {
        let weights = balanced_class_weights(&[0, 0, 0, 1], 2);
        assert!(weights[1] > weights[0]);
        assert!((weights[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((weights[1] - 4.0 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_handles_large_scores() {
        let probs = softmax(&[1000.0, 1001.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_argmax_breaks_ties_low() {
        assert_eq!(argmax(&[0.5, 0.5, 0.1]), 0);
        assert_eq!(argmax(&[0.1, 0.9, 0.9]), 1);
    }
}
