//! Command implementations for the Prognos CLI.

use std::time::Instant;

use crate::analysis::{MedicalLexicon, TextNormalizer};
use crate::artifacts::{METADATA_FILE, TRAINING_METADATA_FILE, load_json};
use crate::augment::{AugmentConfig, SymptomAugmenter};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::dataset::{load_corpus, save_corpus};
use crate::error::Result;
use crate::features::TfIdfConfig;
use crate::predictor::{DiseasePredictor, validate_symptom_set};
use crate::trainer::{Trainer, TrainerConfig};

/// Execute a CLI command.
pub fn execute_command(args: PrognosArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Predict(predict_args) => predict(predict_args.clone(), &args),
        Command::Validate(validate_args) => validate(validate_args.clone(), &args),
        Command::Augment(augment_args) => augment(augment_args.clone(), &args),
        Command::Stats(stats_args) => stats(stats_args.clone(), &args),
    }
}

/// Train the model bank and persist artifacts.
fn train(args: TrainArgs, cli_args: &PrognosArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Loading corpus from: {}", args.corpus.display());
    }
    let records = load_corpus(&args.corpus)?;

    let config = TrainerConfig {
        test_fraction: args.test_fraction,
        seed: args.seed,
        augmentation: args.augment.map(|factor| AugmentConfig {
            factor,
            seed: args.seed,
            ..AugmentConfig::default()
        }),
        tfidf: TfIdfConfig {
            max_features: args.max_features,
            ..TfIdfConfig::default()
        },
        ..TrainerConfig::default()
    };

    let start = Instant::now();
    let outcome = Trainer::new(config).train(&records, &args.model_dir)?;

    output_result(
        "Training complete",
        &TrainingSummary {
            corpus_records: records.len(),
            training_samples: outcome.metadata.training_samples,
            test_samples: outcome.metadata.test_samples,
            n_features: outcome.metadata.n_features,
            n_classes: outcome.metadata.n_classes,
            best_model: outcome.report.best_model.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
            models: outcome.report.models,
        },
        cli_args,
    )
}

/// Predict diseases for one symptom string.
fn predict(args: PredictArgs, cli_args: &PrognosArgs) -> Result<()> {
    let predictor = DiseasePredictor::load(&args.model_dir)?;
    let response = predictor.predict(&args.symptoms, args.top_k)?;
    output_result("Prediction", &response, cli_args)
}

/// Validate a symptom string against the accepted phrase-count bounds.
///
/// Validation needs no trained artifacts, only the normalizer.
fn validate(args: ValidateArgs, cli_args: &PrognosArgs) -> Result<()> {
    let lexicon = MedicalLexicon::new();
    let normalizer = TextNormalizer::new(&lexicon)?;
    let report = validate_symptom_set(&normalizer.normalize(&args.symptoms));

    output_result("Validation", &report, cli_args)
}

/// Write an augmented copy of a corpus.
fn augment(args: AugmentArgs, cli_args: &PrognosArgs) -> Result<()> {
    let records = load_corpus(&args.corpus)?;

    let lexicon = MedicalLexicon::new();
    let normalizer = TextNormalizer::new(&lexicon)?;
    let augmenter = SymptomAugmenter::new(
        lexicon,
        AugmentConfig {
            factor: args.factor,
            seed: args.seed,
            ..AugmentConfig::default()
        },
    );

    let augmented = augmenter.augment_corpus(&records, &normalizer)?;
    save_corpus(&augmented, &args.output)?;

    output_result(
        "Augmentation complete",
        &AugmentationSummary {
            input_records: records.len(),
            output_records: augmented.len(),
            factor: args.factor,
            output_path: args.output.display().to_string(),
        },
        cli_args,
    )
}

/// Show the persisted metadata of a trained artifact directory.
fn stats(args: StatsArgs, cli_args: &PrognosArgs) -> Result<()> {
    let training: crate::artifacts::TrainingMetadata =
        load_json(&args.model_dir.join(TRAINING_METADATA_FILE))?;
    let artifact: crate::artifacts::ArtifactMetadata =
        load_json(&args.model_dir.join(METADATA_FILE))?;

    output_result(
        "Artifact statistics",
        &StatsSummary {
            trained_at: training.trained_at.to_rfc3339(),
            training_samples: training.training_samples,
            test_samples: training.test_samples,
            n_features: training.n_features,
            n_classes: training.n_classes,
            classes: artifact.classes,
            models_trained: training.models_trained,
            best_model: training.best_model,
        },
        cli_args,
    )
}
