//! Ensemble prediction over the model bank.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PrognosError, Result};
use crate::features::StandardScaler;
use crate::model::{FeatureScaling, ModelBank};

/// Largest permitted `top_k` request.
pub const MAX_TOP_K: usize = 10;

/// One entry of the ranked prediction list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    /// 1-indexed rank.
    pub rank: usize,
    /// Class id of the predicted disease.
    pub class_id: usize,
    /// Averaged ensemble probability for this class.
    pub probability: f64,
}

/// The combined output of every model in the bank for one feature vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleResult {
    /// Class id chosen by each model, keyed by model name.
    pub per_model_predictions: BTreeMap<String, usize>,
    /// Probability vector produced by each model, keyed by model name.
    pub per_model_probabilities: BTreeMap<String, Vec<f64>>,
    /// Class chosen by plurality vote.
    pub winning_class: usize,
    /// Ensemble probability of the winning class.
    pub winning_probability: f64,
    /// Element-wise mean of the per-model probability vectors.
    pub probabilities: Vec<f64>,
    /// The `top_k` highest-probability classes, ranked.
    pub ranked_top_k: Vec<RankedPrediction>,
}

/// Combines model bank outputs into a single ranked prediction.
///
/// Raw and standardized feature vectors are routed per model contract. The
/// final class is a plurality vote with ties broken by the lowest class id,
/// and the final probability vector is the mean over all models. Both rules
/// are deterministic, so repeated calls with the same artifacts and input
/// return identical results.
#[derive(Debug)]
pub struct EnsemblePredictor {
    bank: ModelBank,
    scaler: StandardScaler,
}

impl EnsemblePredictor {
    /// Build a predictor over a loaded bank and fitted scaler.
    pub fn new(bank: ModelBank, scaler: StandardScaler) -> Result<Self> {
        if bank.is_empty() {
            return Err(PrognosError::config(
                "cannot build ensemble over an empty model bank",
            ));
        }
        if !scaler.is_fitted() {
            return Err(PrognosError::config(
                "cannot build ensemble over an unfitted scaler",
            ));
        }
        Ok(Self { bank, scaler })
    }

    /// The underlying model bank.
    pub fn bank(&self) -> &ModelBank {
        &self.bank
    }

    /// Predict over every model and combine into a ranked result.
    ///
    /// `top_k` is clamped to `1..=10`; the ranked list holds
    /// `min(top_k, n_classes)` entries sorted descending by probability,
    /// ties broken by ascending class id.
    pub fn predict(&self, features: &[f64], top_k: usize) -> Result<EnsembleResult> {
        let top_k = top_k.clamp(1, MAX_TOP_K);
        let scaled = self.scaler.transform(features)?;

        let mut per_model_predictions = BTreeMap::new();
        let mut per_model_probabilities = BTreeMap::new();

        for model in self.bank.models() {
            let input: &[f64] = match model.scaling() {
                FeatureScaling::Raw => features,
                FeatureScaling::Standardized => &scaled,
            };

            let prediction = model.predict(input)?;
            let probabilities = model.predict_proba(input)?;
            per_model_predictions.insert(model.name().to_string(), prediction);
            per_model_probabilities.insert(model.name().to_string(), probabilities);
        }

        let winning_class = plurality_vote(per_model_predictions.values().copied());

        let probabilities = match mean_probabilities(per_model_probabilities.values()) {
            Some(mean) => mean,
            None => {
                // No probability estimates available: degrade to a one-hot
                // vector on the voted class.
                let n_classes = winning_class + 1;
                let mut one_hot = vec![0.0; n_classes];
                one_hot[winning_class] = 1.0;
                one_hot
            }
        };

        let ranked_top_k = rank_top_k(&probabilities, top_k);
        let winning_probability = probabilities.get(winning_class).copied().unwrap_or(0.0);

        Ok(EnsembleResult {
            per_model_predictions,
            per_model_probabilities,
            winning_class,
            winning_probability,
            probabilities,
            ranked_top_k,
        })
    }
}

/// Plurality vote; ties break to the lowest class id.
fn plurality_vote(votes: impl Iterator<Item = usize>) -> usize {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for vote in votes {
        *counts.entry(vote).or_insert(0) += 1;
    }

    let mut winner = 0;
    let mut winner_count = 0;
    // BTreeMap iterates in ascending class id order, so the first class
    // with the maximum count wins ties.
    for (&class, &count) in &counts {
        if count > winner_count {
            winner = class;
            winner_count = count;
        }
    }
    winner
}

/// Element-wise mean over probability vectors; `None` when there are none.
fn mean_probabilities<'a>(vectors: impl Iterator<Item = &'a Vec<f64>>) -> Option<Vec<f64>> {
    let mut sum: Option<Vec<f64>> = None;
    let mut count = 0usize;

    for vector in vectors {
        match &mut sum {
            Some(total) => {
                for (t, &p) in total.iter_mut().zip(vector.iter()) {
                    *t += p;
                }
            }
            None => sum = Some(vector.clone()),
        }
        count += 1;
    }

    sum.map(|mut total| {
        for t in &mut total {
            *t /= count as f64;
        }
        total
    })
}

/// Indices of the `top_k` largest probabilities, descending, ties broken by
/// ascending class id. Ranks are 1-indexed.
fn rank_top_k(probabilities: &[f64], top_k: usize) -> Vec<RankedPrediction> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| {
        probabilities[b]
            .partial_cmp(&probabilities[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    order
        .into_iter()
        .take(top_k)
        .enumerate()
        .map(|(idx, class_id)| RankedPrediction {
            rank: idx + 1,
            class_id,
            probability: probabilities[class_id],
        })
        .collect()
}
