//! Per-dimension standardization of feature vectors.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrognosError, Result};

/// Standard scaler: per-dimension mean and standard deviation, fit once on
/// the training matrix.
///
/// `transform` computes `(x - mean) / std`; dimensions with zero variance
/// keep a scale of 1 so constant columns pass through unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Create an unfitted scaler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit mean and standard deviation per dimension on the training matrix.
    pub fn fit(&mut self, matrix: &[Vec<f64>]) -> Result<()> {
        if matrix.is_empty() {
            return Err(PrognosError::data_insufficient(
                "cannot fit scaler on an empty matrix",
            ));
        }

        let n_features = matrix[0].len();
        let n_samples = matrix.len() as f64;

        let mut mean = vec![0.0; n_features];
        for row in matrix {
            if row.len() != n_features {
                return Err(PrognosError::config(format!(
                    "ragged feature matrix: expected {} dimensions, found {}",
                    n_features,
                    row.len()
                )));
            }
            for (m, &value) in mean.iter_mut().zip(row.iter()) {
                *m += value;
            }
        }
        for m in &mut mean {
            *m /= n_samples;
        }

        let mut variance = vec![0.0; n_features];
        for row in matrix {
            for (v, (&value, &m)) in variance.iter_mut().zip(row.iter().zip(mean.iter())) {
                *v += (value - m) * (value - m);
            }
        }

        let scale = variance
            .into_iter()
            .map(|v| {
                let std = (v / n_samples).sqrt();
                if std == 0.0 { 1.0 } else { std }
            })
            .collect();

        self.mean = mean;
        self.scale = scale;
        Ok(())
    }

    /// Standardize one feature vector.
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(PrognosError::config("scaler used before fitting"));
        }
        if x.len() != self.mean.len() {
            return Err(PrognosError::config(format!(
                "scaler dimension mismatch: fitted on {}, got {}",
                self.mean.len(),
                x.len()
            )));
        }

        Ok(x.iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&value, (&m, &s))| (value - m) / s)
            .collect())
    }

    /// Standardize every row of a matrix.
    pub fn transform_matrix(&self, matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        matrix.iter().map(|row| self.transform(row)).collect()
    }

    /// Check whether the scaler has been fitted.
    pub fn is_fitted(&self) -> bool {
        !self.mean.is_empty()
    }

    /// Number of dimensions the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Save the fitted scaler as a JSON artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a fitted scaler from a JSON artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let scaler: Self = serde_json::from_str(&content)?;
        Ok(scaler)
    }
}
