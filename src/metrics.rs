//! Evaluation metrics for trained classifiers.

use serde::{Deserialize, Serialize};

/// Evaluation results for one model on the held-out test split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEvaluation {
    /// Model name.
    pub model: String,
    /// Fraction of exactly correct predictions.
    pub accuracy: f64,
    /// Precision, weighted by class support.
    pub precision: f64,
    /// Recall, weighted by class support.
    pub recall: f64,
    /// F1, weighted by class support.
    pub f1: f64,
    /// Fraction of samples whose true class is in the top 3 by probability.
    pub top3_accuracy: f64,
    /// Fraction of samples whose true class is in the top 5 by probability.
    pub top5_accuracy: f64,
}

/// Evaluation results for every model plus the ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Per-model results, in training order; the ensemble is last.
    pub models: Vec<ModelEvaluation>,
    /// Name of the model with the highest accuracy.
    pub best_model: String,
}

impl EvaluationReport {
    /// Build a report, recording the most accurate model.
    pub fn new(models: Vec<ModelEvaluation>) -> Self {
        let best_model = models
            .iter()
            .max_by(|a, b| {
                a.accuracy
                    .partial_cmp(&b.accuracy)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|m| m.model.clone())
            .unwrap_or_default();
        Self { models, best_model }
    }
}

/// Fraction of predictions equal to the true label.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Weighted precision, recall, and F1 over all classes.
///
/// Per-class scores are averaged with each class weighted by its support in
/// `y_true`; classes with no predicted (or true) members contribute zero.
pub fn weighted_precision_recall_f1(
    y_true: &[usize],
    y_pred: &[usize],
    n_classes: usize,
) -> (f64, f64, f64) {
    if y_true.is_empty() || n_classes == 0 {
        return (0.0, 0.0, 0.0);
    }

    let mut true_positive = vec![0usize; n_classes];
    let mut predicted = vec![0usize; n_classes];
    let mut support = vec![0usize; n_classes];

    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        support[t] += 1;
        predicted[p] += 1;
        if t == p {
            true_positive[t] += 1;
        }
    }

    let total = y_true.len() as f64;
    let mut precision = 0.0;
    let mut recall = 0.0;
    let mut f1 = 0.0;

    for class in 0..n_classes {
        if support[class] == 0 {
            continue;
        }
        let weight = support[class] as f64 / total;

        let class_precision = if predicted[class] == 0 {
            0.0
        } else {
            true_positive[class] as f64 / predicted[class] as f64
        };
        let class_recall = true_positive[class] as f64 / support[class] as f64;
        let class_f1 = if class_precision + class_recall == 0.0 {
            0.0
        } else {
            2.0 * class_precision * class_recall / (class_precision + class_recall)
        };

        precision += weight * class_precision;
        recall += weight * class_recall;
        f1 += weight * class_f1;
    }

    (precision, recall, f1)
}

/// Fraction of samples whose true class is among the `k` most probable.
///
/// Ties are broken by ascending class id, matching the ensemble's ranking
/// rule.
pub fn top_k_accuracy(y_true: &[usize], probabilities: &[Vec<f64>], k: usize) -> f64 {
    if y_true.is_empty() || k == 0 {
        return 0.0;
    }

    let hits = y_true
        .iter()
        .zip(probabilities.iter())
        .filter(|&(&truth, ref probs)| {
            let mut order: Vec<usize> = (0..probs.len()).collect();
            order.sort_by(|&a, &b| {
                probs[b]
                    .partial_cmp(&probs[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(&b))
            });
            order.iter().take(k).any(|&idx| idx == truth)
        })
        .count();

    hits as f64 / y_true.len() as f64
}
