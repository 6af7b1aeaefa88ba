//! The fixed set of classifiers behind the ensemble.

use std::path::Path;

use log::{info, warn};

use crate::error::{PrognosError, Result};
use crate::model::{
    Classifier, LinearSvm, LogisticRegression, MlpClassifier, MultinomialNb, RandomForest,
};

/// Artifact file name per model slot, in fixed slot order.
pub const MODEL_FILES: &[&str] = &[
    "naive_bayes.json",
    "svm.json",
    "random_forest.json",
    "logistic_regression.json",
    "neural_network.json",
];

/// The trained classifiers available for ensemble prediction.
///
/// Slots are loaded independently: a missing or corrupt model artifact
/// excludes that slot for the life of the process rather than failing the
/// load. Zero loadable slots is a configuration error, since no prediction
/// is possible.
pub struct ModelBank {
    models: Vec<Box<dyn Classifier>>,
}

impl std::fmt::Debug for ModelBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBank")
            .field("models", &self.model_names())
            .finish()
    }
}

impl ModelBank {
    /// Build a bank from already-trained models.
    pub fn from_models(models: Vec<Box<dyn Classifier>>) -> Result<Self> {
        if models.is_empty() {
            return Err(PrognosError::config("model bank has no models"));
        }
        Ok(Self { models })
    }

    /// Load every model slot from the artifact directory.
    ///
    /// Each slot is attempted separately; failures are logged and the slot
    /// is excluded. Only zero successful slots is fatal.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut models: Vec<Box<dyn Classifier>> = Vec::new();

        for &file in MODEL_FILES {
            let path = dir.join(file);
            match load_slot(&path) {
                Ok(model) => {
                    info!("loaded model {} from {}", model.name(), path.display());
                    models.push(model);
                }
                Err(e) => {
                    warn!("excluding model {file}: {e}");
                }
            }
        }

        if models.is_empty() {
            return Err(PrognosError::config(format!(
                "no model artifacts could be loaded from {}",
                dir.display()
            )));
        }

        Ok(Self { models })
    }

    /// The loaded models, in slot order.
    pub fn models(&self) -> &[Box<dyn Classifier>] {
        &self.models
    }

    /// Names of the loaded models, in slot order.
    pub fn model_names(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.name()).collect()
    }

    /// Number of loaded models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check whether the bank has no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Save every model to its slot file in the artifact directory.
    pub fn save(&self, dir: &Path) -> Result<()> {
        for model in &self.models {
            let path = dir.join(format!("{}.json", model.name()));
            model.save(&path)?;
        }
        Ok(())
    }
}

/// Load one model slot, dispatching on the artifact file name.
fn load_slot(path: &Path) -> Result<Box<dyn Classifier>> {
    let file = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    let model: Box<dyn Classifier> = match file {
        "naive_bayes.json" => Box::new(MultinomialNb::load(path)?),
        "svm.json" => Box::new(LinearSvm::load(path)?),
        "random_forest.json" => Box::new(RandomForest::load(path)?),
        "logistic_regression.json" => Box::new(LogisticRegression::load(path)?),
        "neural_network.json" => Box::new(MlpClassifier::load(path)?),
        other => {
            return Err(PrognosError::config(format!(
                "unknown model artifact {other}"
            )));
        }
    };

    if !model.is_trained() {
        return Err(PrognosError::config(format!(
            "model artifact {} holds an untrained model",
            path.display()
        )));
    }

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Classifier;
    use tempfile::TempDir;

    fn trained_nb() -> MultinomialNb {
        let x = vec![
            vec![3.0, 0.0],
            vec![4.0, 1.0],
            vec![0.0, 3.0],
            vec![1.0, 4.0],
        ];
        let y = vec![0, 0, 1, 1];
        let mut model = MultinomialNb::default();
        model.fit(&x, &y, 2).unwrap();
        model
    }

    #[test]
    fn test_empty_bank_rejected() {
        assert!(ModelBank::from_models(Vec::new()).is_err());
    }

    #[test]
    fn test_load_excludes_missing_slots() {
        let dir = TempDir::new().unwrap();
        trained_nb().save(&dir.path().join("naive_bayes.json")).unwrap();

        let bank = ModelBank::load(dir.path()).unwrap();
        assert_eq!(bank.model_names(), vec!["naive_bayes"]);
    }

    #[test]
    fn test_load_excludes_corrupt_slots() {
        let dir = TempDir::new().unwrap();
        trained_nb().save(&dir.path().join("naive_bayes.json")).unwrap();
        std::fs::write(dir.path().join("svm.json"), "not json").unwrap();

        let bank = ModelBank::load(dir.path()).unwrap();
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn test_load_with_no_artifacts_fails() {
        let dir = TempDir::new().unwrap();
        let err = ModelBank::load(dir.path()).unwrap_err();
        assert!(matches!(err, PrognosError::Configuration(_)));
    }

    #[test]
    fn test_untrained_artifact_is_excluded() {
        let dir = TempDir::new().unwrap();
        MultinomialNb::default()
            .save(&dir.path().join("naive_bayes.json"))
            .unwrap();
        trained_nb()
            .save(&dir.path().join("random_forest.json"))
            .unwrap();

        // The untrained naive Bayes artifact fails the slot check; the
        // mismatched random forest artifact fails to deserialize.
        assert!(ModelBank::load(dir.path()).is_err());
    }
}
