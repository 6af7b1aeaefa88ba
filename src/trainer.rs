//! Offline training orchestration: split, fit, evaluate, persist.

use std::path::Path;

use chrono::Utc;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::analysis::{MedicalLexicon, NormalizedSymptoms, TextNormalizer};
use crate::artifacts::{
    ArtifactMetadata, LABEL_CODEC_FILE, METADATA_FILE, RESULTS_FILE, SCALER_FILE,
    TRAINING_METADATA_FILE, TrainingMetadata, VECTORIZER_FILE, save_json,
};
use crate::augment::{AugmentConfig, SymptomAugmenter};
use crate::dataset::SymptomRecord;
use crate::ensemble::EnsemblePredictor;
use crate::error::{PrognosError, Result};
use crate::features::{FeatureBuilder, StandardScaler, TfIdfConfig};
use crate::labels::LabelCodec;
use crate::metrics::{
    EvaluationReport, ModelEvaluation, accuracy, top_k_accuracy, weighted_precision_recall_f1,
};
use crate::model::{
    Classifier, FeatureScaling, LinearSvm, LogisticRegression, LogisticRegressionConfig,
    MlpClassifier, MlpConfig, ModelBank, MultinomialNb, RandomForest, RandomForestConfig,
    SvmConfig,
};

/// Configuration for one training run.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Fraction of the corpus held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the stratified split.
    pub seed: u64,
    /// Augment the corpus before feature building, when set.
    pub augmentation: Option<AugmentConfig>,
    /// TF-IDF vectorizer settings.
    pub tfidf: TfIdfConfig,
    /// Naive Bayes smoothing parameter.
    pub nb_alpha: f64,
    /// Linear SVM settings.
    pub svm: SvmConfig,
    /// Random forest settings.
    pub forest: RandomForestConfig,
    /// Logistic regression settings.
    pub logistic: LogisticRegressionConfig,
    /// Feed-forward network settings.
    pub mlp: MlpConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            augmentation: None,
            tfidf: TfIdfConfig::default(),
            nb_alpha: 1.0,
            svm: SvmConfig::default(),
            forest: RandomForestConfig::default(),
            logistic: LogisticRegressionConfig::default(),
            mlp: MlpConfig::default(),
        }
    }
}

/// The result of a completed training run.
#[derive(Debug)]
pub struct TrainingOutcome {
    /// Per-model and ensemble evaluation on the held-out split.
    pub report: EvaluationReport,
    /// The persisted training summary.
    pub metadata: TrainingMetadata,
}

/// Trains the full model bank from a symptom corpus and persists every
/// artifact the serving process needs.
#[derive(Debug, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Create a trainer with the given configuration.
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Run the complete training pipeline and write artifacts to `dir`.
    pub fn train(&self, records: &[SymptomRecord], dir: &Path) -> Result<TrainingOutcome> {
        let lexicon = MedicalLexicon::new();
        let normalizer = TextNormalizer::new(&lexicon)?;

        let records = match &self.config.augmentation {
            Some(augment_config) => {
                let augmenter = SymptomAugmenter::new(lexicon.clone(), augment_config.clone());
                augmenter.augment_corpus(records, &normalizer)?
            }
            None => records.to_vec(),
        };

        // Normalize every record, dropping those with no usable symptoms.
        let mut diseases: Vec<String> = Vec::with_capacity(records.len());
        let mut corpus: Vec<NormalizedSymptoms> = Vec::with_capacity(records.len());
        for record in &records {
            let normalized = normalizer.normalize(&record.raw_text);
            if normalized.is_empty() {
                warn!(
                    "dropping record for {} with no usable symptom text",
                    record.disease
                );
                continue;
            }
            diseases.push(record.disease.clone());
            corpus.push(normalized);
        }

        let codec = LabelCodec::fit(&diseases)?;
        let n_classes = codec.num_classes();
        let y: Vec<usize> = diseases
            .iter()
            .map(|disease| codec.encode(disease))
            .collect::<Result<_>>()?;

        let (train_idx, test_idx) =
            stratified_split(&y, &codec, self.config.test_fraction, self.config.seed)?;
        info!(
            "split corpus into {} train / {} test samples over {} classes",
            train_idx.len(),
            test_idx.len(),
            n_classes
        );

        // The vocabulary is fitted on the training split only.
        let train_corpus: Vec<NormalizedSymptoms> =
            train_idx.iter().map(|&i| corpus[i].clone()).collect();
        let mut builder = FeatureBuilder::new(self.config.tfidf.clone(), lexicon);
        builder.fit(&train_corpus)?;

        let x_train = builder.transform_corpus(&train_corpus)?;
        let y_train: Vec<usize> = train_idx.iter().map(|&i| y[i]).collect();

        let test_corpus: Vec<NormalizedSymptoms> =
            test_idx.iter().map(|&i| corpus[i].clone()).collect();
        let x_test = builder.transform_corpus(&test_corpus)?;
        let y_test: Vec<usize> = test_idx.iter().map(|&i| y[i]).collect();

        let mut scaler = StandardScaler::new();
        scaler.fit(&x_train)?;
        let x_train_scaled = scaler.transform_matrix(&x_train)?;
        let x_test_scaled = scaler.transform_matrix(&x_test)?;

        // Five independent models, identical train split, per-model feature
        // routing.
        let mut models: Vec<Box<dyn Classifier>> = vec![
            Box::new(MultinomialNb::new(self.config.nb_alpha)),
            Box::new(LinearSvm::new(self.config.svm.clone())),
            Box::new(RandomForest::new(self.config.forest.clone())),
            Box::new(LogisticRegression::new(self.config.logistic.clone())),
            Box::new(MlpClassifier::new(self.config.mlp.clone())),
        ];

        let mut evaluations = Vec::with_capacity(models.len() + 1);
        for model in &mut models {
            let (train_input, test_input) = match model.scaling() {
                FeatureScaling::Raw => (&x_train, &x_test),
                FeatureScaling::Standardized => (&x_train_scaled, &x_test_scaled),
            };

            info!("training {}", model.name());
            model.fit(train_input, &y_train, n_classes)?;
            evaluations.push(evaluate_model(model.as_ref(), test_input, &y_test, n_classes)?);
        }

        let bank = ModelBank::from_models(models)?;
        let model_names: Vec<String> =
            bank.model_names().iter().map(|n| n.to_string()).collect();

        let ensemble = EnsemblePredictor::new(bank, scaler.clone())?;
        evaluations.push(evaluate_ensemble(&ensemble, &x_test, &y_test, n_classes)?);

        let report = EvaluationReport::new(evaluations);

        std::fs::create_dir_all(dir)?;
        save_json(builder.vectorizer(), &dir.join(VECTORIZER_FILE))?;
        save_json(&codec, &dir.join(LABEL_CODEC_FILE))?;
        save_json(&scaler, &dir.join(SCALER_FILE))?;
        ensemble.bank().save(dir)?;

        let artifact_metadata = ArtifactMetadata {
            created_at: Utc::now(),
            n_samples: x_train.len(),
            n_features: builder.n_features(),
            feature_names: builder.feature_names(),
            classes: codec.classes().to_vec(),
        };
        save_json(&artifact_metadata, &dir.join(METADATA_FILE))?;
        save_json(&report, &dir.join(RESULTS_FILE))?;

        let metadata = TrainingMetadata {
            trained_at: Utc::now(),
            training_samples: x_train.len(),
            test_samples: x_test.len(),
            n_features: builder.n_features(),
            n_classes,
            models_trained: model_names,
            best_model: report.best_model.clone(),
            augmentation_factor: self.config.augmentation.as_ref().map(|a| a.factor),
            seed: self.config.seed,
        };
        save_json(&metadata, &dir.join(TRAINING_METADATA_FILE))?;

        info!(
            "training complete: best model {} (artifacts in {})",
            report.best_model,
            dir.display()
        );
        Ok(TrainingOutcome { report, metadata })
    }
}

/// Seeded stratified split preserving class proportions.
///
/// Every class contributes at least one sample to each side, which requires
/// at least two examples per class.
pub fn stratified_split(
    y: &[usize],
    codec: &LabelCodec,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(PrognosError::config(format!(
            "test fraction {test_fraction} outside (0, 1)"
        )));
    }

    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); codec.num_classes()];
    for (idx, &label) in y.iter().enumerate() {
        by_class[label].push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_idx = Vec::new();
    let mut test_idx = Vec::new();

    for (class, mut indices) in by_class.into_iter().enumerate() {
        if indices.len() < 2 {
            return Err(PrognosError::data_insufficient(format!(
                "class {:?} has {} example(s); at least 2 are required for a stratified split",
                codec.decode(class)?,
                indices.len()
            )));
        }

        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64 * test_fraction).round() as usize)
            .clamp(1, indices.len() - 1);
        test_idx.extend_from_slice(&indices[..n_test]);
        train_idx.extend_from_slice(&indices[n_test..]);
    }

    train_idx.sort_unstable();
    test_idx.sort_unstable();
    Ok((train_idx, test_idx))
}

/// Evaluate one trained model on the held-out split.
fn evaluate_model(
    model: &dyn Classifier,
    x_test: &[Vec<f64>],
    y_test: &[usize],
    n_classes: usize,
) -> Result<ModelEvaluation> {
    let mut predictions = Vec::with_capacity(x_test.len());
    let mut probabilities = Vec::with_capacity(x_test.len());
    for row in x_test {
        predictions.push(model.predict(row)?);
        probabilities.push(model.predict_proba(row)?);
    }
    Ok(build_evaluation(
        model.name().to_string(),
        y_test,
        &predictions,
        &probabilities,
        n_classes,
    ))
}

/// Evaluate the combined ensemble on the held-out split.
fn evaluate_ensemble(
    ensemble: &EnsemblePredictor,
    x_test: &[Vec<f64>],
    y_test: &[usize],
    n_classes: usize,
) -> Result<ModelEvaluation> {
    let mut predictions = Vec::with_capacity(x_test.len());
    let mut probabilities = Vec::with_capacity(x_test.len());
    for row in x_test {
        let result = ensemble.predict(row, 1)?;
        predictions.push(result.winning_class);
        probabilities.push(result.probabilities);
    }
    Ok(build_evaluation(
        "ensemble".to_string(),
        y_test,
        &predictions,
        &probabilities,
        n_classes,
    ))
}

fn build_evaluation(
    name: String,
    y_test: &[usize],
    predictions: &[usize],
    probabilities: &[Vec<f64>],
    n_classes: usize,
) -> ModelEvaluation {
    let (precision, recall, f1) = weighted_precision_recall_f1(y_test, predictions, n_classes);
    ModelEvaluation {
        model: name,
        accuracy: accuracy(y_test, predictions),
        precision,
        recall,
        f1,
        top3_accuracy: top_k_accuracy(y_test, probabilities, 3),
        top5_accuracy: top_k_accuracy(y_test, probabilities, 5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec_for(names: &[&str]) -> LabelCodec {
        let owned: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        LabelCodec::fit(&owned).unwrap()
    }

    #[test]
    fn test_split_keeps_every_class_on_both_sides() {
        let codec = codec_for(&["a", "b", "c"]);
        let y = vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2];
        let (train, test) = stratified_split(&y, &codec, 0.25, 42).unwrap();

        assert_eq!(train.len() + test.len(), y.len());
        for class in 0..3 {
            assert!(train.iter().any(|&i| y[i] == class));
            assert!(test.iter().any(|&i| y[i] == class));
        }
    }

    #[test]
    fn test_split_rejects_singleton_class() {
        let codec = codec_for(&["a", "b"]);
        let y = vec![0, 0, 0, 1];
        let err = stratified_split(&y, &codec, 0.2, 42).unwrap_err();
        assert!(matches!(err, PrognosError::DataInsufficient(_)));
    }

    #[test]
    fn test_split_is_seeded() {
        let codec = codec_for(&["a", "b"]);
        let y = vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1];

        let a = stratified_split(&y, &codec, 0.4, 7).unwrap();
        let b = stratified_split(&y, &codec, 0.4, 7).unwrap();
        assert_eq!(a, b);

        let c = stratified_split(&y, &codec, 0.4, 8).unwrap();
        // Same sizes regardless of seed.
        assert_eq!(a.0.len(), c.0.len());
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        let codec = codec_for(&["a"]);
        assert!(stratified_split(&[0, 0], &codec, 0.0, 1).is_err());
        assert!(stratified_split(&[0, 0], &codec, 1.0, 1).is_err());
    }

    #[test]
    fn test_disjoint_split() {
        let codec = codec_for(&["a", "b"]);
        let y = vec![0, 1, 0, 1, 0, 1, 0, 1];
        let (train, test) = stratified_split(&y, &codec, 0.25, 3).unwrap();
        for idx in &test {
            assert!(!train.contains(idx));
        }
    }
}
