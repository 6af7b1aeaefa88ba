//! One-vs-rest linear SVM on standardized features.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    Classifier, FeatureScaling, ModelMetadata, argmax, balanced_class_weights, softmax,
    validate_input, validate_training_data,
};

/// Hyperparameters for the linear SVM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmConfig {
    /// L2 regularization strength.
    pub lambda: f64,
    /// Number of full passes over the training set.
    pub epochs: usize,
    /// Initial learning rate; decays per epoch.
    pub learning_rate: f64,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            lambda: 1e-4,
            epochs: 200,
            learning_rate: 0.1,
        }
    }
}

/// One-vs-rest linear SVM trained with hinge-loss subgradient descent.
///
/// Examples are weighted by balanced class weights so rare diseases are not
/// drowned out. Margins are turned into probabilities with a softmax, a
/// documented approximation rather than a calibrated estimate. Training
/// iterates samples in corpus order, so fitting is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    config: SvmConfig,
    /// Per-class weight vectors, `[class][feature]`.
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    n_features: usize,
    metadata: ModelMetadata,
}

impl LinearSvm {
    /// Create an untrained model.
    pub fn new(config: SvmConfig) -> Self {
        let mut metadata = ModelMetadata::new("svm");
        metadata
            .hyperparameters
            .insert("lambda".to_string(), config.lambda);
        metadata
            .hyperparameters
            .insert("epochs".to_string(), config.epochs as f64);
        metadata
            .hyperparameters
            .insert("learning_rate".to_string(), config.learning_rate);
        Self {
            config,
            weights: Vec::new(),
            bias: Vec::new(),
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

    fn margins(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(self.bias.iter())
            .map(|(w, &b)| {
                w.iter().zip(x.iter()).map(|(&wi, &xi)| wi * xi).sum::<f64>() + b
            })
            .collect()
    }
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self::new(SvmConfig::default())
    }
}

impl Classifier for LinearSvm {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<()> {
        validate_training_data(x, y, n_classes)?;

        let n_features = x[0].len();
        let class_weights = balanced_class_weights(y, n_classes);

        let mut weights = vec![vec![0.0; n_features]; n_classes];
        let mut bias = vec![0.0; n_classes];

        for epoch in 0..self.config.epochs {
            let lr = self.config.learning_rate / (1.0 + 0.01 * epoch as f64);

            for (row, &label) in x.iter().zip(y.iter()) {
                for class in 0..n_classes {
                    let target = if label == class { 1.0 } else { -1.0 };
                    let example_weight = class_weights[label];

                    let margin: f64 = weights[class]
                        .iter()
                        .zip(row.iter())
                        .map(|(&wi, &xi)| wi * xi)
                        .sum::<f64>()
                        + bias[class];

                    let w = &mut weights[class];
                    if target * margin < 1.0 {
                        for (wi, &xi) in w.iter_mut().zip(row.iter()) {
                            *wi += lr * (target * example_weight * xi - self.config.lambda * *wi);
                        }
                        bias[class] += lr * target * example_weight;
                    } else {
                        for wi in w.iter_mut() {
                            *wi -= lr * self.config.lambda * *wi;
                        }
                    }
                }
            }
        }

        self.weights = weights;
        self.bias = bias;
        self.n_features = n_features;
        self.metadata.trained_at = chrono::Utc::now();
        self.metadata.training_examples = x.len();
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> Result<usize> {
        validate_input(x, self.n_features, self.is_trained())?;
        Ok(argmax(&self.margins(x)))
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        validate_input(x, self.n_features, self.is_trained())?;
        Ok(softmax(&self.margins(x)))
    }

    fn scaling(&self) -> FeatureScaling {
        FeatureScaling::Standardized
    }

    fn name(&self) -> &'static str {
        "svm"
    }

    fn is_trained(&self) -> bool {
        !self.weights.is_empty()
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

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let x = vec![
            vec![1.0, 0.1],
            vec![0.9, -0.1],
            vec![1.1, 0.0],
            vec![-1.0, 0.1],
            vec![-0.9, -0.2],
            vec![-1.1, 0.0],
        ];
        let y = vec![0, 0, 0, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_fit_separates_classes() {
        let (x, y) = separable_data();
        let mut model = LinearSvm::default();
        model.fit(&x, &y, 2).unwrap();

        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), 0);
        assert_eq!(model.predict(&[-1.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn test_proba_is_valid_distribution() {
        let (x, y) = separable_data();
        let mut model = LinearSvm::default();
        model.fit(&x, &y, 2).unwrap();

        let probs = model.predict_proba(&[0.5, 0.0]).unwrap();
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_training_is_deterministic() {
        let (x, y) = separable_data();
        let mut a = LinearSvm::default();
        let mut b = LinearSvm::default();
        a.fit(&x, &y, 2).unwrap();
        b.fit(&x, &y, 2).unwrap();

        assert_eq!(
            a.predict_proba(&[0.3, -0.2]).unwrap(),
            b.predict_proba(&[0.3, -0.2]).unwrap()
        );
    }

    #[test]
    fn test_insufficient_data_rejected() {
        let mut model = LinearSvm::default();
        let err = model.fit(&[vec![1.0]], &[0], 2).unwrap_err();
        assert!(matches!(
            err,
            crate::error::PrognosError::DataInsufficient(_)
        ));
    }
}
