//! Bagged gini decision trees on raw features.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    Classifier, FeatureScaling, ModelMetadata, argmax, balanced_class_weights, validate_input,
    validate_training_data,
};

/// Hyperparameters for the random forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestConfig {
    /// Number of bagged trees.
    pub n_estimators: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Seed for the bootstrap and feature subsampling.
    pub seed: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeNode {
    /// Feature index for split (-1 for leaf).
    feature_idx: i32,
    /// Threshold value for split.
    threshold: f64,
    /// Class distribution (for leaf nodes).
    probabilities: Vec<f64>,
    /// Left child.
    left: Option<Box<TreeNode>>,
    /// Right child.
    right: Option<Box<TreeNode>>,
}

/// Random forest: depth-bounded gini trees over bootstrap samples, with
/// balanced class weighting and per-split feature subsampling.
///
/// Each tree draws its bootstrap and feature subsets from a seed derived
/// from the configured seed and the tree index, so training is reproducible
/// and inference is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: RandomForestConfig,
    trees: Vec<TreeNode>,
    n_features: usize,
    n_classes: usize,
    metadata: ModelMetadata,
}

impl RandomForest {
    /// Create an untrained model.
    pub fn new(config: RandomForestConfig) -> Self {
        let mut metadata = ModelMetadata::new("random_forest");
        metadata
            .hyperparameters
            .insert("n_estimators".to_string(), config.n_estimators as f64);
        metadata
            .hyperparameters
            .insert("max_depth".to_string(), config.max_depth as f64);
        metadata
            .hyperparameters
            .insert("min_samples_split".to_string(), config.min_samples_split as f64);
        Self {
            config,
            trees: Vec::new(),
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

    fn tree_proba<'a>(mut node: &'a TreeNode, x: &[f64]) -> &'a [f64] {
        loop {
            if node.feature_idx < 0 {
                return &node.probabilities;
            }
            let value = x[node.feature_idx as usize];
            let child = if value <= node.threshold {
                node.left.as_deref()
            } else {
                node.right.as_deref()
            };
            match child {
                Some(next) => node = next,
                None => return &node.probabilities,
            }
        }
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<()> {
        validate_training_data(x, y, n_classes)?;

        let n_samples = x.len();
        let n_features = x[0].len();
        let class_weights = balanced_class_weights(y, n_classes);
        let features_per_split = ((n_features as f64).sqrt().round() as usize).max(1);

        let mut trees = Vec::with_capacity(self.config.n_estimators);
        for tree_idx in 0..self.config.n_estimators {
            let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(tree_idx as u64));

            let indices: Vec<usize> = (0..n_samples)
                .map(|_| rng.random_range(0..n_samples))
                .collect();

            let builder = TreeBuilder {
                x,
                y,
                class_weights: &class_weights,
                n_classes,
                n_features,
                features_per_split,
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
            };
            trees.push(builder.build(&indices, 0, &mut rng));
        }

        self.trees = trees;
        self.n_features = n_features;
        self.n_classes = n_classes;
        self.metadata.trained_at = chrono::Utc::now();
        self.metadata.training_examples = n_samples;
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> Result<usize> {
        let probs = self.predict_proba(x)?;
        Ok(argmax(&probs))
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        validate_input(x, self.n_features, self.is_trained())?;

        let mut probs = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (total, &p) in probs.iter_mut().zip(Self::tree_proba(tree, x).iter()) {
                *total += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        for p in &mut probs {
            *p /= n_trees;
        }
        Ok(probs)
    }

    fn scaling(&self) -> FeatureScaling {
        FeatureScaling::Raw
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn is_trained(&self) -> bool {
        !self.trees.is_empty()
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

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    class_weights: &'a [f64],
    n_classes: usize,
    n_features: usize,
    features_per_split: usize,
    max_depth: usize,
    min_samples_split: usize,
}

impl TreeBuilder<'_> {
    fn build(&self, indices: &[usize], depth: usize, rng: &mut StdRng) -> TreeNode {
        let mass = self.class_mass(indices);

        if depth >= self.max_depth
            || indices.len() < self.min_samples_split
            || is_pure(&mass)
        {
            return self.leaf(mass);
        }

        match self.find_best_split(indices, rng) {
            Some((feature_idx, threshold, left, right)) => {
                let left_child = self.build(&left, depth + 1, rng);
                let right_child = self.build(&right, depth + 1, rng);
                TreeNode {
                    feature_idx: feature_idx as i32,
                    threshold,
                    probabilities: normalize(mass),
                    left: Some(Box::new(left_child)),
                    right: Some(Box::new(right_child)),
                }
            }
            None => self.leaf(mass),
        }
    }

    fn leaf(&self, mass: Vec<f64>) -> TreeNode {
        TreeNode {
            feature_idx: -1,
            threshold: 0.0,
            probabilities: normalize(mass),
            left: None,
            right: None,
        }
    }

    fn class_mass(&self, indices: &[usize]) -> Vec<f64> {
        let mut mass = vec![0.0; self.n_classes];
        for &i in indices {
            mass[self.y[i]] += self.class_weights[self.y[i]];
        }
        mass
    }

    fn find_best_split(
        &self,
        indices: &[usize],
        rng: &mut StdRng,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
        let mut candidates: Vec<usize> = (0..self.n_features).collect();
        candidates.shuffle(rng);
        candidates.truncate(self.features_per_split);
        candidates.sort_unstable();

        let mut best_impurity = f64::INFINITY;
        let mut best_split = None;

        for &feature in &candidates {
            let mut values: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (self.x[i][feature], i))
                .collect();
            values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(a.1.cmp(&b.1)));

            let mut left_mass = vec![0.0; self.n_classes];
            let mut right_mass = self.class_mass(indices);

            for pos in 1..values.len() {
                let (prev_value, prev_idx) = values[pos - 1];
                let weight = self.class_weights[self.y[prev_idx]];
                left_mass[self.y[prev_idx]] += weight;
                right_mass[self.y[prev_idx]] -= weight;

                if prev_value == values[pos].0 {
                    continue;
                }

                let left_total: f64 = left_mass.iter().sum();
                let right_total: f64 = right_mass.iter().sum();
                let impurity =
                    left_total * gini(&left_mass) + right_total * gini(&right_mass);

                if impurity < best_impurity {
                    let threshold = (prev_value + values[pos].0) / 2.0;
                    best_impurity = impurity;
                    best_split = Some((feature, threshold, pos));
                }
            }
        }

        best_split.map(|(feature, threshold, _)| {
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| self.x[i][feature] <= threshold);
            (feature, threshold, left, right)
        })
    }
}

fn gini(mass: &[f64]) -> f64 {
    let total: f64 = mass.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    1.0 - mass
        .iter()
        .map(|&m| {
            let p = m / total;
            p * p
        })
        .sum::<f64>()
}

fn is_pure(mass: &[f64]) -> bool {
    mass.iter().filter(|&&m| m > 0.0).count() <= 1
}

fn normalize(mass: Vec<f64>) -> Vec<f64> {
    let total: f64 = mass.iter().sum();
    if total == 0.0 {
        let uniform = 1.0 / mass.len() as f64;
        return vec![uniform; mass.len()];
    }
    mass.into_iter().map(|m| m / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RandomForestConfig {
        RandomForestConfig {
            n_estimators: 10,
            max_depth: 5,
            min_samples_split: 2,
            seed: 7,
        }
    }

    fn separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let x = vec![
            vec![0.0, 1.0],
            vec![0.1, 0.9],
            vec![0.2, 1.1],
            vec![0.9, 0.0],
            vec![1.0, 0.1],
            vec![1.1, 0.2],
        ];
        let y = vec![0, 0, 0, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_fit_and_predict() {
        let (x, y) = separable_data();
        let mut model = RandomForest::new(small_config());
        model.fit(&x, &y, 2).unwrap();

        assert_eq!(model.predict(&[0.05, 1.0]).unwrap(), 0);
        assert_eq!(model.predict(&[1.0, 0.05]).unwrap(), 1);
    }

    #[test]
    fn test_proba_is_valid_distribution() {
        let (x, y) = separable_data();
        let mut model = RandomForest::new(small_config());
        model.fit(&x, &y, 2).unwrap();

        let probs = model.predict_proba(&[0.5, 0.5]).unwrap();
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let (x, y) = separable_data();
        let mut a = RandomForest::new(small_config());
        let mut b = RandomForest::new(small_config());
        a.fit(&x, &y, 2).unwrap();
        b.fit(&x, &y, 2).unwrap();

        assert_eq!(
            a.predict_proba(&[0.4, 0.6]).unwrap(),
            b.predict_proba(&[0.4, 0.6]).unwrap()
        );
    }

    #[test]
    fn test_gini_bounds() {
        assert_eq!(gini(&[1.0, 0.0]), 0.0);
        assert!((gini(&[1.0, 1.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_save_load_preserves_predictions() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("random_forest.json");

        let (x, y) = separable_data();
        let mut model = RandomForest::new(small_config());
        model.fit(&x, &y, 2).unwrap();
        model.save(&path).unwrap();

        let loaded = RandomForest::load(&path).unwrap();
        assert_eq!(
            model.predict_proba(&[0.3, 0.7]).unwrap(),
            loaded.predict_proba(&[0.3, 0.7]).unwrap()
        );
    }
}
