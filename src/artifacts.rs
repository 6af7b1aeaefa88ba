//! Persisted artifact set: file-per-artifact inside a versioned directory.

use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{PrognosError, Result};
use crate::features::{ENGINEERED_FEATURE_COUNT, StandardScaler, TfIdfVectorizer};
use crate::labels::LabelCodec;
use crate::model::ModelBank;

/// Fitted TF-IDF vectorizer artifact.
pub const VECTORIZER_FILE: &str = "vectorizer.json";
/// Fitted label codec artifact.
pub const LABEL_CODEC_FILE: &str = "label_codec.json";
/// Fitted feature scaler artifact.
pub const SCALER_FILE: &str = "scaler.json";
/// Metadata sidecar for load-time compatibility checks.
pub const METADATA_FILE: &str = "metadata.json";
/// Per-model evaluation results table.
pub const RESULTS_FILE: &str = "model_results.json";
/// Training run summary.
pub const TRAINING_METADATA_FILE: &str = "training_metadata.json";

/// Sidecar recording the frozen feature schema and class list, used to
/// sanity-check artifact compatibility at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// When the artifact set was produced.
    pub created_at: DateTime<Utc>,
    /// Number of training samples the artifacts were fitted on.
    pub n_samples: usize,
    /// Total feature vector length.
    pub n_features: usize,
    /// Feature names in vector order.
    pub feature_names: Vec<String>,
    /// Class names in id order.
    pub classes: Vec<String>,
}

/// Summary of one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// When training finished.
    pub trained_at: DateTime<Utc>,
    /// Samples in the training split.
    pub training_samples: usize,
    /// Samples in the held-out test split.
    pub test_samples: usize,
    /// Total feature vector length.
    pub n_features: usize,
    /// Number of disease classes.
    pub n_classes: usize,
    /// Names of the models trained.
    pub models_trained: Vec<String>,
    /// Most accurate model on the test split.
    pub best_model: String,
    /// Augmentation factor applied to the corpus, if any.
    pub augmentation_factor: Option<usize>,
    /// Seed the run was trained with.
    pub seed: u64,
}

/// The complete read-only state a serving process needs.
#[derive(Debug)]
pub struct LoadedArtifacts {
    /// Fitted vectorizer with frozen vocabulary and idf weights.
    pub vectorizer: TfIdfVectorizer,
    /// Fitted label codec.
    pub codec: LabelCodec,
    /// Fitted feature scaler.
    pub scaler: StandardScaler,
    /// The loadable model slots, possibly a degraded subset.
    pub bank: ModelBank,
    /// The metadata sidecar the artifacts were checked against.
    pub metadata: ArtifactMetadata,
}

/// Write a serializable value as a pretty-printed JSON artifact.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a JSON artifact, reporting the artifact name on failure.
pub fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PrognosError::config(format!("cannot read artifact {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        PrognosError::config(format!("corrupt artifact {}: {e}", path.display()))
    })
}

/// Load and cross-check the full artifact set from a directory.
///
/// The vectorizer, codec, scaler, and metadata sidecar are all required;
/// individual model slots may be missing (the bank loads degraded). Any
/// shape mismatch against the sidecar is a configuration error naming the
/// offending artifact.
pub fn load_artifacts(dir: &Path) -> Result<LoadedArtifacts> {
    let metadata: ArtifactMetadata = load_json(&dir.join(METADATA_FILE))?;
    let vectorizer: TfIdfVectorizer = load_json(&dir.join(VECTORIZER_FILE))?;
    let codec: LabelCodec = load_json(&dir.join(LABEL_CODEC_FILE))?;
    let scaler: StandardScaler = load_json(&dir.join(SCALER_FILE))?;

    let vector_features = vectorizer.vocabulary_size() + ENGINEERED_FEATURE_COUNT;
    if vector_features != metadata.n_features {
        return Err(PrognosError::config(format!(
            "{VECTORIZER_FILE} produces {vector_features} features but {METADATA_FILE} records {}",
            metadata.n_features
        )));
    }
    if codec.classes() != metadata.classes.as_slice() {
        return Err(PrognosError::config(format!(
            "{LABEL_CODEC_FILE} class list does not match {METADATA_FILE}"
        )));
    }
    if scaler.n_features() != metadata.n_features {
        return Err(PrognosError::config(format!(
            "{SCALER_FILE} was fitted on {} features but {METADATA_FILE} records {}",
            scaler.n_features(),
            metadata.n_features
        )));
    }
    if metadata.feature_names.len() != metadata.n_features {
        return Err(PrognosError::config(format!(
            "{METADATA_FILE} holds {} feature names for {} features",
            metadata.feature_names.len(),
            metadata.n_features
        )));
    }

    let bank = ModelBank::load(dir)?;
    info!(
        "loaded artifact set from {} ({} features, {} classes, {} models)",
        dir.display(),
        metadata.n_features,
        metadata.classes.len(),
        bank.len()
    );

    Ok(LoadedArtifacts {
        vectorizer,
        codec,
        scaler,
        bank,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{MedicalLexicon, TextNormalizer};
    use crate::features::{FeatureBuilder, TfIdfConfig};
    use crate::model::{Classifier, MultinomialNb};
    use tempfile::TempDir;

    fn write_artifact_set(dir: &Path) -> (FeatureBuilder, LabelCodec) {
        let lexicon = MedicalLexicon::new();
        let normalizer = TextNormalizer::new(&lexicon).unwrap();
        let corpus: Vec<_> = [
            "fever; headache; fatigue",
            "abdominal pain; nausea; vomiting",
            "cough; chest pain; shortness of breath",
        ]
        .iter()
        .map(|t| normalizer.normalize(t))
        .collect();

        let mut builder = FeatureBuilder::new(TfIdfConfig::default(), lexicon);
        builder.fit(&corpus).unwrap();

        let codec = LabelCodec::fit(&[
            "influenza".to_string(),
            "gastritis".to_string(),
            "pneumonia".to_string(),
        ])
        .unwrap();

        let x = builder.transform_corpus(&corpus).unwrap();
        let y = vec![1, 0, 2];

        let mut scaler = StandardScaler::new();
        scaler.fit(&x).unwrap();

        let mut nb = MultinomialNb::default();
        nb.fit(&x, &y, 3).unwrap();

        let metadata = ArtifactMetadata {
            created_at: Utc::now(),
            n_samples: x.len(),
            n_features: builder.n_features(),
            feature_names: builder.feature_names(),
            classes: codec.classes().to_vec(),
        };

        save_json(builder.vectorizer(), &dir.join(VECTORIZER_FILE)).unwrap();
        save_json(&codec, &dir.join(LABEL_CODEC_FILE)).unwrap();
        save_json(&scaler, &dir.join(SCALER_FILE)).unwrap();
        save_json(&metadata, &dir.join(METADATA_FILE)).unwrap();
        nb.save(&dir.join("naive_bayes.json")).unwrap();

        (builder, codec)
    }

    #[test]
    fn test_load_full_artifact_set() {
        let dir = TempDir::new().unwrap();
        let (builder, codec) = write_artifact_set(dir.path());

        let loaded = load_artifacts(dir.path()).unwrap();
        assert_eq!(loaded.metadata.n_features, builder.n_features());
        assert_eq!(loaded.codec.classes(), codec.classes());
        assert_eq!(loaded.bank.model_names(), vec!["naive_bayes"]);
    }

    #[test]
    fn test_missing_vectorizer_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_artifact_set(dir.path());
        std::fs::remove_file(dir.path().join(VECTORIZER_FILE)).unwrap();

        let err = load_artifacts(dir.path()).unwrap_err();
        assert!(err.to_string().contains(VECTORIZER_FILE));
    }

    #[test]
    fn test_missing_metadata_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_artifact_set(dir.path());
        std::fs::remove_file(dir.path().join(METADATA_FILE)).unwrap();

        assert!(load_artifacts(dir.path()).is_err());
    }

    #[test]
    fn test_class_list_mismatch_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_artifact_set(dir.path());

        let other = LabelCodec::fit(&["measles".to_string(), "mumps".to_string()]).unwrap();
        save_json(&other, &dir.path().join(LABEL_CODEC_FILE)).unwrap();

        let err = load_artifacts(dir.path()).unwrap_err();
        assert!(err.to_string().contains(LABEL_CODEC_FILE));
    }

    #[test]
    fn test_scaler_shape_mismatch_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_artifact_set(dir.path());

        let mut small = StandardScaler::new();
        small.fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        save_json(&small, &dir.path().join(SCALER_FILE)).unwrap();

        let err = load_artifacts(dir.path()).unwrap_err();
        assert!(err.to_string().contains(SCALER_FILE));
    }
}
