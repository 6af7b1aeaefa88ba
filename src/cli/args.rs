//! Command line argument parsing for the Prognos CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Prognos - symptom-based disease prediction
#[derive(Parser, Debug, Clone)]
#[command(name = "prognos")]
#[command(about = "Symptom-based disease prediction with an ensemble of classical classifiers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PrognosArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PrognosArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train the model bank from a symptom corpus
    Train(TrainArgs),

    /// Predict diseases for a symptom string
    Predict(PredictArgs),

    /// Validate a symptom string without predicting
    Validate(ValidateArgs),

    /// Write an augmented copy of a symptom corpus
    Augment(AugmentArgs),

    /// Show metadata for a trained artifact directory
    Stats(StatsArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Path to the JSONL symptom corpus
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Directory to write trained artifacts into
    #[arg(value_name = "MODEL_DIR")]
    pub model_dir: PathBuf,

    /// Fraction of the corpus held out for evaluation
    #[arg(long, default_value = "0.2")]
    pub test_fraction: f64,

    /// Seed for splits, bagging, and network initialization
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Augment the corpus with this many synthetic variants per record
    #[arg(long, value_name = "FACTOR")]
    pub augment: Option<usize>,

    /// Maximum TF-IDF vocabulary size
    #[arg(long, default_value = "1000")]
    pub max_features: usize,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Directory holding trained artifacts
    #[arg(value_name = "MODEL_DIR")]
    pub model_dir: PathBuf,

    /// Semicolon-delimited symptom text
    #[arg(value_name = "SYMPTOMS")]
    pub symptoms: String,

    /// Number of ranked candidates to return (1-10)
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,
}

/// Arguments for input validation
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Semicolon-delimited symptom text
    #[arg(value_name = "SYMPTOMS")]
    pub symptoms: String,
}

/// Arguments for corpus augmentation
#[derive(Parser, Debug, Clone)]
pub struct AugmentArgs {
    /// Path to the JSONL symptom corpus
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Path for the augmented JSONL corpus
    #[arg(value_name = "OUTPUT_FILE")]
    pub output: PathBuf,

    /// Synthetic variants per source record
    #[arg(long, default_value = "2")]
    pub factor: usize,

    /// Seed for the augmentation choices
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

/// Arguments for artifact statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Directory holding trained artifacts
    #[arg(value_name = "MODEL_DIR")]
    pub model_dir: PathBuf,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_basic_predict_command() {
        let args = PrognosArgs::try_parse_from([
            "prognos",
            "predict",
            "/path/to/models",
            "fever; headache",
            "--top-k",
            "3",
        ])
        .unwrap();

        if let Command::Predict(predict_args) = args.command {
            assert_eq!(predict_args.model_dir, PathBuf::from("/path/to/models"));
            assert_eq!(predict_args.symptoms, "fever; headache");
            assert_eq!(predict_args.top_k, 3);
        } else {
            panic!("Expected Predict command");
        }
    }

    #[test]
    fn test_train_command_with_augmentation() {
        let args = PrognosArgs::try_parse_from([
            "prognos",
            "train",
            "corpus.jsonl",
            "models",
            "--augment",
            "3",
            "--seed",
            "7",
        ])
        .unwrap();

        if let Command::Train(train_args) = args.command {
            assert_eq!(train_args.augment, Some(3));
            assert_eq!(train_args.seed, 7);
            assert_eq!(train_args.test_fraction, 0.2);
        } else {
            panic!("Expected Train command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = PrognosArgs::try_parse_from(["prognos", "validate", "fever"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = PrognosArgs::try_parse_from(["prognos", "-vv", "validate", "fever"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args =
            PrognosArgs::try_parse_from(["prognos", "--quiet", "validate", "fever"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            PrognosArgs::try_parse_from(["prognos", "--format", "json", "validate", "fever"])
                .unwrap();
        assert!(matches!(args.output_format, OutputFormat::Json));
    }
}
