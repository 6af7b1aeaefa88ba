//! Feed-forward neural network on standardized features.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    Classifier, FeatureScaling, ModelMetadata, argmax, softmax, validate_input,
    validate_training_data,
};

/// Hyperparameters for the feed-forward network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Hidden layer widths.
    pub hidden_layers: Vec<usize>,
    /// Adam step size.
    pub learning_rate: f64,
    /// Maximum number of training epochs.
    pub max_epochs: usize,
    /// Mini-batch size.
    pub batch_size: usize,
    /// Fraction of the training set held out for early stopping.
    pub validation_fraction: f64,
    /// Epochs without validation improvement before stopping.
    pub patience: usize,
    /// Minimum loss improvement that counts as progress.
    pub tol: f64,
    /// Seed for weight initialization and batch shuffling.
    pub seed: u64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![512, 256, 128],
            learning_rate: 1e-3,
            max_epochs: 500,
            batch_size: 32,
            validation_fraction: 0.1,
            patience: 10,
            tol: 1e-4,
            seed: 42,
        }
    }
}

/// One dense layer: `weights[out][in]` plus a bias per output unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Layer {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl Layer {
    /// Glorot-uniform initialization from a seeded generator.
    fn glorot(n_in: usize, n_out: usize, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (n_in + n_out) as f64).sqrt();
        let weights = (0..n_out)
            .map(|_| {
                (0..n_in)
                    .map(|_| rng.random_range(-limit..limit))
                    .collect()
            })
            .collect();
        Self {
            weights,
            bias: vec![0.0; n_out],
        }
    }

    fn zeros_like(&self) -> Layer {
        Layer {
            weights: self.weights.iter().map(|row| vec![0.0; row.len()]).collect(),
            bias: vec![0.0; self.bias.len()],
        }
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(self.bias.iter())
            .map(|(w, &b)| {
                w.iter()
                    .zip(input.iter())
                    .map(|(&wi, &xi)| wi * xi)
                    .sum::<f64>()
                    + b
            })
            .collect()
    }
}

/// Feed-forward classifier: ReLU hidden layers and a softmax output, trained
/// with mini-batch Adam and early stopping on a held-out validation split.
///
/// Initialization, shuffling, and the validation split all derive from the
/// configured seed, so training is reproducible and inference deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpClassifier {
    config: MlpConfig,
    layers: Vec<Layer>,
    n_features: usize,
    n_classes: usize,
    metadata: ModelMetadata,
}

impl MlpClassifier {
    /// Create an untrained network.
    pub fn new(config: MlpConfig) -> Self {
        let mut metadata = ModelMetadata::new("neural_network");
        metadata
            .hyperparameters
            .insert("learning_rate".to_string(), config.learning_rate);
        metadata
            .hyperparameters
            .insert("max_epochs".to_string(), config.max_epochs as f64);
        metadata
            .hyperparameters
            .insert("hidden_layers".to_string(), config.hidden_layers.len() as f64);
        metadata.hyperparameters.insert(
            "validation_fraction".to_string(),
            config.validation_fraction,
        );
        Self {
            config,
            layers: Vec::new(),
            n_features: 0,
            n_classes: 0,
            metadata,
        }
    }

    /// Load a trained model from a JSON artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&content)?;
        Ok(model)
    }

    /// Forward pass returning the pre-activation and activation of every
    /// layer; the final activation is the softmax output.
    fn forward_all(layers: &[Layer], x: &[f64]) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let mut pre = Vec::with_capacity(layers.len());
        let mut act = Vec::with_capacity(layers.len());
        let mut input = x.to_vec();

        for (idx, layer) in layers.iter().enumerate() {
            let z = layer.forward(&input);
            let a = if idx + 1 == layers.len() {
                softmax(&z)
            } else {
                z.iter().map(|&v| v.max(0.0)).collect()
            };
            pre.push(z);
            input = a.clone();
            act.push(a);
        }

        (pre, act)
    }

    fn output(&self, x: &[f64]) -> Vec<f64> {
        let (_, act) = Self::forward_all(&self.layers, x);
        act.last().cloned().unwrap_or_default()
    }

    /// Mean cross-entropy over a set of rows.
    fn loss(layers: &[Layer], x: &[Vec<f64>], y: &[usize], indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        let total: f64 = indices
            .iter()
            .map(|&i| {
                let (_, act) = Self::forward_all(layers, &x[i]);
                let probs = &act[act.len() - 1];
                -probs[y[i]].max(f64::MIN_POSITIVE).ln()
            })
            .sum();
        total / indices.len() as f64
    }
}

impl Default for MlpClassifier {
    fn default() -> Self {
        Self::new(MlpConfig::default())
    }
}

/// Per-layer Adam accumulators.
struct AdamState {
    m: Vec<Layer>,
    v: Vec<Layer>,
    step: usize,
}

impl AdamState {
    fn new(layers: &[Layer]) -> Self {
        Self {
            m: layers.iter().map(Layer::zeros_like).collect(),
            v: layers.iter().map(Layer::zeros_like).collect(),
            step: 0,
        }
    }

    fn update(&mut self, layers: &mut [Layer], grads: &[Layer], lr: f64) {
        const BETA1: f64 = 0.9;
        const BETA2: f64 = 0.999;
        const EPS: f64 = 1e-8;

        self.step += 1;
        let bias1 = 1.0 - BETA1.powi(self.step as i32);
        let bias2 = 1.0 - BETA2.powi(self.step as i32);

        for (layer_idx, grad) in grads.iter().enumerate() {
            let layer = &mut layers[layer_idx];
            let m = &mut self.m[layer_idx];
            let v = &mut self.v[layer_idx];

            for out in 0..layer.weights.len() {
                for inp in 0..layer.weights[out].len() {
                    let g = grad.weights[out][inp];
                    m.weights[out][inp] = BETA1 * m.weights[out][inp] + (1.0 - BETA1) * g;
                    v.weights[out][inp] = BETA2 * v.weights[out][inp] + (1.0 - BETA2) * g * g;
                    let m_hat = m.weights[out][inp] / bias1;
                    let v_hat = v.weights[out][inp] / bias2;
                    layer.weights[out][inp] -= lr * m_hat / (v_hat.sqrt() + EPS);
                }
                let g = grad.bias[out];
                m.bias[out] = BETA1 * m.bias[out] + (1.0 - BETA1) * g;
                v.bias[out] = BETA2 * v.bias[out] + (1.0 - BETA2) * g * g;
                let m_hat = m.bias[out] / bias1;
                let v_hat = v.bias[out] / bias2;
                layer.bias[out] -= lr * m_hat / (v_hat.sqrt() + EPS);
            }
        }
    }
}

impl Classifier for MlpClassifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<()> {
        validate_training_data(x, y, n_classes)?;

        let n_samples = x.len();
        let n_features = x[0].len();
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        // Held-out validation split for early stopping. Too few samples to
        // spare any means training runs the full epoch budget instead.
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(&mut rng);
        let n_val = ((n_samples as f64 * self.config.validation_fraction).round() as usize)
            .min(n_samples.saturating_sub(2));
        let (val_indices, train_indices) = indices.split_at(n_val);
        let val_indices = val_indices.to_vec();
        let mut train_indices = train_indices.to_vec();

        // Layer sizes: input -> hidden... -> classes.
        let mut sizes = vec![n_features];
        sizes.extend(self.config.hidden_layers.iter().copied());
        sizes.push(n_classes);

        let mut layers: Vec<Layer> = sizes
            .windows(2)
            .map(|pair| Layer::glorot(pair[0], pair[1], &mut rng))
            .collect();
        let mut adam = AdamState::new(&layers);

        let mut best_loss = f64::INFINITY;
        let mut best_layers: Option<Vec<Layer>> = None;
        let mut stale_epochs = 0;

        for _ in 0..self.config.max_epochs {
            train_indices.shuffle(&mut rng);

            for batch in train_indices.chunks(self.config.batch_size.max(1)) {
                let mut grads: Vec<Layer> = layers.iter().map(Layer::zeros_like).collect();
                let scale = 1.0 / batch.len() as f64;

                for &i in batch {
                    let (pre, act) = Self::forward_all(&layers, &x[i]);

                    // Output delta: softmax probabilities minus the one-hot
                    // target.
                    let mut delta: Vec<f64> = act[layers.len() - 1].clone();
                    delta[y[i]] -= 1.0;

                    for layer_idx in (0..layers.len()).rev() {
                        let input: &[f64] = if layer_idx == 0 {
                            &x[i]
                        } else {
                            &act[layer_idx - 1]
                        };

                        let grad = &mut grads[layer_idx];
                        for (out, &d) in delta.iter().enumerate() {
                            for (g, &inp) in grad.weights[out].iter_mut().zip(input.iter()) {
                                *g += scale * d * inp;
                            }
                            grad.bias[out] += scale * d;
                        }

                        if layer_idx > 0 {
                            let weights = &layers[layer_idx].weights;
                            let z_prev = &pre[layer_idx - 1];
                            delta = (0..weights[0].len())
                                .map(|inp| {
                                    if z_prev[inp] <= 0.0 {
                                        0.0
                                    } else {
                                        delta
                                            .iter()
                                            .enumerate()
                                            .map(|(out, &d)| d * weights[out][inp])
                                            .sum()
                                    }
                                })
                                .collect();
                        }
                    }
                }

                adam.update(&mut layers, &grads, self.config.learning_rate);
            }

            let monitored = if val_indices.is_empty() {
                Self::loss(&layers, x, y, &train_indices)
            } else {
                Self::loss(&layers, x, y, &val_indices)
            };

            if monitored < best_loss - self.config.tol {
                best_loss = monitored;
                best_layers = Some(layers.clone());
                stale_epochs = 0;
            } else {
                stale_epochs += 1;
                if stale_epochs >= self.config.patience {
                    break;
                }
            }
        }

        self.layers = best_layers.unwrap_or(layers);
        self.n_features = n_features;
        self.n_classes = n_classes;
        self.metadata.trained_at = chrono::Utc::now();
        self.metadata.training_examples = n_samples;
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> Result<usize> {
        validate_input(x, self.n_features, self.is_trained())?;
        Ok(argmax(&self.output(x)))
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        validate_input(x, self.n_features, self.is_trained())?;
        Ok(self.output(x))
    }

    fn scaling(&self) -> FeatureScaling {
        FeatureScaling::Standardized
    }

    fn name(&self) -> &'static str {
        "neural_network"
    }

    fn is_trained(&self) -> bool {
        !self.layers.is_empty()
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
