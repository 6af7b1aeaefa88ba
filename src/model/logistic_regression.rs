//! Multinomial logistic regression on standardized features.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    Classifier, FeatureScaling, ModelMetadata, argmax, balanced_class_weights, softmax,
    validate_input, validate_training_data,
};

/// Hyperparameters for logistic regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionConfig {
    /// L2 regularization strength.
    pub l2: f64,
    /// Maximum gradient-descent iterations.
    pub max_iter: usize,
    /// Gradient-descent step size.
    pub learning_rate: f64,
    /// Stop when the loss improvement falls below this threshold.
    pub tol: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            l2: 1e-3,
            max_iter: 1000,
            learning_rate: 0.5,
            tol: 1e-6,
        }
    }
}

/// Softmax regression trained by full-batch gradient descent with L2
/// regularization and balanced class weighting.
///
/// Weights initialize to zero, so training is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    config: LogisticRegressionConfig,
    /// Per-class weight vectors, `[class][feature]`.
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    n_features: usize,
    metadata: ModelMetadata,
}

impl LogisticRegression {
    /// Create an untrained model.
    pub fn new(config: LogisticRegressionConfig) -> Self {
        let mut metadata = ModelMetadata::new("logistic_regression");
        metadata.hyperparameters.insert("l2".to_string(), config.l2);
        metadata
            .hyperparameters
            .insert("max_iter".to_string(), config.max_iter as f64);
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

    fn scores(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(self.bias.iter())
            .map(|(w, &b)| {
                w.iter().zip(x.iter()).map(|(&wi, &xi)| wi * xi).sum::<f64>() + b
            })
            .collect()
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(LogisticRegressionConfig::default())
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<()> {
        validate_training_data(x, y, n_classes)?;

        let n_features = x[0].len();
        let class_weights = balanced_class_weights(y, n_classes);
        let weight_total: f64 = y.iter().map(|&label| class_weights[label]).sum();

        let mut weights = vec![vec![0.0; n_features]; n_classes];
        let mut bias = vec![0.0; n_classes];
        let mut prev_loss = f64::INFINITY;

        for _ in 0..self.config.max_iter {
            let mut grad_w = vec![vec![0.0; n_features]; n_classes];
            let mut grad_b = vec![0.0; n_classes];
            let mut loss = 0.0;

            for (row, &label) in x.iter().zip(y.iter()) {
                let sample_weight = class_weights[label];
                let scores: Vec<f64> = weights
                    .iter()
                    .zip(bias.iter())
                    .map(|(w, &b)| {
                        w.iter().zip(row.iter()).map(|(&wi, &xi)| wi * xi).sum::<f64>() + b
                    })
                    .collect();
                let probs = softmax(&scores);

                loss -= sample_weight * probs[label].max(f64::MIN_POSITIVE).ln();

                for class in 0..n_classes {
                    let indicator = if class == label { 1.0 } else { 0.0 };
                    let g = sample_weight * (probs[class] - indicator);
                    for (gw, &xi) in grad_w[class].iter_mut().zip(row.iter()) {
                        *gw += g * xi;
                    }
                    grad_b[class] += g;
                }
            }

            loss /= weight_total;
            for (w_row, g_row) in weights.iter_mut().zip(grad_w.iter()) {
                for (wi, &gi) in w_row.iter_mut().zip(g_row.iter()) {
                    *wi -= self.config.learning_rate * (gi / weight_total + self.config.l2 * *wi);
                }
            }
            for (b, &g) in bias.iter_mut().zip(grad_b.iter()) {
                *b -= self.config.learning_rate * g / weight_total;
            }

            if (prev_loss - loss).abs() < self.config.tol {
                break;
            }
            prev_loss = loss;
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
        Ok(argmax(&self.scores(x)))
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        validate_input(x, self.n_features, self.is_trained())?;
        Ok(softmax(&self.scores(x)))
    }

    fn scaling(&self) -> FeatureScaling {
        FeatureScaling::Standardized
    }

    fn name(&self) -> &'static str {
        "logistic_regression"
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
            vec![1.0, 0.0],
            vec![0.8, 0.2],
            vec![1.2, -0.1],
            vec![-1.0, 0.0],
            vec![-0.8, 0.1],
            vec![-1.2, -0.2],
        ];
        let y = vec![0, 0, 0, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_fit_separates_classes() {
        let (x, y) = separable_data();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y, 2).unwrap();

        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), 0);
        assert_eq!(model.predict(&[-1.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn test_proba_is_valid_distribution() {
        let (x, y) = separable_data();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y, 2).unwrap();

        let probs = model.predict_proba(&[0.2, 0.1]).unwrap();
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_training_is_deterministic() {
        let (x, y) = separable_data();
        let mut a = LogisticRegression::default();
        let mut b = LogisticRegression::default();
        a.fit(&x, &y, 2).unwrap();
        b.fit(&x, &y, 2).unwrap();

        assert_eq!(
            a.predict_proba(&[0.5, -0.5]).unwrap(),
            b.predict_proba(&[0.5, -0.5]).unwrap()
        );
    }

    #[test]
    fn test_balanced_weighting_handles_imbalance() {
        // Nine samples of class 0 against three of class 1.
        let mut x = vec![vec![1.0, 0.0]; 9];
        x.extend(vec![vec![-1.0, 0.0]; 3]);
        let mut y = vec![0; 9];
        y.extend(vec![1; 3]);

        let mut model = LogisticRegression::default();
        model.fit(&x, &y, 2).unwrap();
        assert_eq!(model.predict(&[-1.0, 0.0]).unwrap(), 1);
    }
}
