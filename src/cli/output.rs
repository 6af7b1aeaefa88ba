//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::args::{OutputFormat, PrognosArgs};
use crate::error::Result;
use crate::metrics::ModelEvaluation;

/// Result structure for training runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub corpus_records: usize,
    pub training_samples: usize,
    pub test_samples: usize,
    pub n_features: usize,
    pub n_classes: usize,
    pub best_model: String,
    pub duration_ms: u64,
    pub models: Vec<ModelEvaluation>,
}

/// Result structure for corpus augmentation.
#[derive(Debug, Serialize, Deserialize)]
pub struct AugmentationSummary {
    pub input_records: usize,
    pub output_records: usize,
    pub factor: usize,
    pub output_path: String,
}

/// Result structure for artifact statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsSummary {
    pub trained_at: String,
    pub training_samples: usize,
    pub test_samples: usize,
    pub n_features: usize,
    pub n_classes: usize,
    pub classes: Vec<String>,
    pub models_trained: Vec<String>,
    pub best_model: String,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &PrognosArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &PrognosArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    let type_name = std::any::type_name::<T>();

    if type_name.contains("PredictionResponse") {
        output_prediction_human(&value);
    } else if type_name.contains("ValidationReport") {
        output_validation_human(&value);
    } else if type_name.contains("TrainingSummary") {
        output_training_human(&value);
    } else if type_name.contains("StatsSummary") {
        output_stats_human(&value);
    } else if type_name.contains("AugmentationSummary") {
        output_augmentation_human(&value);
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    Ok(())
}

/// Output as JSON.
fn output_json<T: Serialize>(result: &T, args: &PrognosArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

fn output_prediction_human(value: &Value) {
    if let Some(symptoms) = value["input_symptoms"].as_array() {
        let joined: Vec<&str> = symptoms.iter().filter_map(|s| s.as_str()).collect();
        println!("Input symptoms:    {}", joined.join(", "));
    }
    println!(
        "Predicted disease: {} ({:.1}% confidence)",
        value["predicted_disease"].as_str().unwrap_or("?"),
        value["confidence"].as_f64().unwrap_or(0.0) * 100.0
    );
    println!();

    if let Some(ranked) = value["top_predictions"].as_array() {
        println!("{:<6} {:<30} {}", "Rank", "Disease", "Probability");
        for entry in ranked {
            println!(
                "{:<6} {:<30} {:.4}",
                entry["rank"].as_u64().unwrap_or(0),
                entry["disease"].as_str().unwrap_or("?"),
                entry["probability"].as_f64().unwrap_or(0.0)
            );
        }
    }

    if let Some(votes) = value["individual_predictions"].as_object() {
        println!();
        println!("Individual model votes:");
        for (model, disease) in votes {
            println!("  {:<22} -> {}", model, disease.as_str().unwrap_or("?"));
        }
    }
}

fn output_validation_human(value: &Value) {
    let valid = value["valid"].as_bool().unwrap_or(false);
    println!(
        "{} {}",
        if valid { "OK:" } else { "Rejected:" },
        value["message"].as_str().unwrap_or("")
    );
    if let Some(suggestions) = value["suggestions"].as_array() {
        for suggestion in suggestions {
            println!("  - {}", suggestion.as_str().unwrap_or(""));
        }
    }
}

fn output_training_human(value: &Value) {
    println!(
        "Corpus records:    {}",
        value["corpus_records"].as_u64().unwrap_or(0)
    );
    println!(
        "Train/test split:  {} / {}",
        value["training_samples"].as_u64().unwrap_or(0),
        value["test_samples"].as_u64().unwrap_or(0)
    );
    println!(
        "Feature count:     {}",
        value["n_features"].as_u64().unwrap_or(0)
    );
    println!(
        "Disease classes:   {}",
        value["n_classes"].as_u64().unwrap_or(0)
    );
    println!(
        "Duration:          {} ms",
        value["duration_ms"].as_u64().unwrap_or(0)
    );
    println!();

    if let Some(models) = value["models"].as_array() {
        println!(
            "{:<22} {:>9} {:>9} {:>9} {:>9} {:>7} {:>7}",
            "Model", "Accuracy", "Precision", "Recall", "F1", "Top-3", "Top-5"
        );
        for model in models {
            println!(
                "{:<22} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>7.4} {:>7.4}",
                model["model"].as_str().unwrap_or("?"),
                model["accuracy"].as_f64().unwrap_or(0.0),
                model["precision"].as_f64().unwrap_or(0.0),
                model["recall"].as_f64().unwrap_or(0.0),
                model["f1"].as_f64().unwrap_or(0.0),
                model["top3_accuracy"].as_f64().unwrap_or(0.0),
                model["top5_accuracy"].as_f64().unwrap_or(0.0)
            );
        }
    }

    println!();
    println!(
        "Best model:        {}",
        value["best_model"].as_str().unwrap_or("?")
    );
}

fn output_stats_human(value: &Value) {
    println!(
        "Trained at:        {}",
        value["trained_at"].as_str().unwrap_or("?")
    );
    println!(
        "Train/test split:  {} / {}",
        value["training_samples"].as_u64().unwrap_or(0),
        value["test_samples"].as_u64().unwrap_or(0)
    );
    println!(
        "Feature count:     {}",
        value["n_features"].as_u64().unwrap_or(0)
    );
    println!(
        "Disease classes:   {}",
        value["n_classes"].as_u64().unwrap_or(0)
    );
    if let Some(models) = value["models_trained"].as_array() {
        let names: Vec<&str> = models.iter().filter_map(|m| m.as_str()).collect();
        println!("Models:            {}", names.join(", "));
    }
    println!(
        "Best model:        {}",
        value["best_model"].as_str().unwrap_or("?")
    );
}

fn output_augmentation_human(value: &Value) {
    println!(
        "Augmented {} records into {} (factor {})",
        value["input_records"].as_u64().unwrap_or(0),
        value["output_records"].as_u64().unwrap_or(0),
        value["factor"].as_u64().unwrap_or(0)
    );
    println!(
        "Wrote:             {}",
        value["output_path"].as_str().unwrap_or("?")
    );
}
