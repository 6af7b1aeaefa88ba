//! Artifact loading scenarios: degraded model banks, fatal artifacts, and
//! sidecar compatibility checks.

use tempfile::TempDir;

use prognos::dataset::SymptomRecord;
use prognos::error::PrognosError;
use prognos::model::{MlpConfig, RandomForestConfig, SvmConfig};
use prognos::predictor::DiseasePredictor;
use prognos::trainer::{Trainer, TrainerConfig};

fn corpus() -> Vec<SymptomRecord> {
    [
        ("influenza", "fever; headache; fatigue; chills"),
        ("influenza", "fever; cough; muscle pain"),
        ("influenza", "high temperature; chills; fatigue"),
        ("gastritis", "abdominal pain; nausea; vomiting"),
        ("gastritis", "stomach pain; nausea; bloating"),
        ("gastritis", "abdominal pain; heartburn; loss of appetite"),
        ("cystitis", "dysuria; frequent urination; pelvic pain"),
        ("cystitis", "burning when peeing; pelvic pain"),
        ("cystitis", "painful urination; urgency; pelvic pain"),
    ]
    .into_iter()
    .map(|(disease, symptoms)| SymptomRecord::new(disease, symptoms))
    .collect()
}

fn train_artifacts(dir: &TempDir) {
    let config = TrainerConfig {
        test_fraction: 0.34,
        svm: SvmConfig {
            epochs: 40,
            ..SvmConfig::default()
        },
        forest: RandomForestConfig {
            n_estimators: 8,
            max_depth: 4,
            ..RandomForestConfig::default()
        },
        mlp: MlpConfig {
            hidden_layers: vec![12],
            max_epochs: 40,
            batch_size: 4,
            ..MlpConfig::default()
        },
        ..TrainerConfig::default()
    };
    Trainer::new(config).train(&corpus(), dir.path()).unwrap();
}

#[test]
fn test_missing_model_degrades_but_still_predicts() {
    let dir = TempDir::new().unwrap();
    train_artifacts(&dir);
    std::fs::remove_file(dir.path().join("svm.json")).unwrap();

    let predictor = DiseasePredictor::load(dir.path()).unwrap();
    assert_eq!(predictor.model_names().len(), 4);
    assert!(!predictor.model_names().contains(&"svm"));

    let response = predictor.predict("fever; chills; fatigue", 3).unwrap();
    assert_eq!(response.top_predictions.len(), 3);
    assert!(!response.individual_predictions.contains_key("svm"));
}

#[test]
fn test_corrupt_model_is_excluded() {
    let dir = TempDir::new().unwrap();
    train_artifacts(&dir);
    std::fs::write(dir.path().join("neural_network.json"), "{ truncated").unwrap();

    let predictor = DiseasePredictor::load(dir.path()).unwrap();
    assert_eq!(predictor.model_names().len(), 4);
    assert!(!predictor.model_names().contains(&"neural_network"));
}

#[test]
fn test_no_models_at_all_is_fatal() {
    let dir = TempDir::new().unwrap();
    train_artifacts(&dir);
    for file in [
        "naive_bayes.json",
        "svm.json",
        "random_forest.json",
        "logistic_regression.json",
        "neural_network.json",
    ] {
        std::fs::remove_file(dir.path().join(file)).unwrap();
    }

    let err = DiseasePredictor::load(dir.path()).unwrap_err();
    assert!(matches!(err, PrognosError::Configuration(_)));
}

#[test]
fn test_missing_vectorizer_is_fatal() {
    let dir = TempDir::new().unwrap();
    train_artifacts(&dir);
    std::fs::remove_file(dir.path().join("vectorizer.json")).unwrap();

    let err = DiseasePredictor::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("vectorizer.json"));
}

#[test]
fn test_missing_scaler_is_fatal() {
    let dir = TempDir::new().unwrap();
    train_artifacts(&dir);
    std::fs::remove_file(dir.path().join("scaler.json")).unwrap();

    assert!(DiseasePredictor::load(dir.path()).is_err());
}

#[test]
fn test_sidecar_mismatch_is_fatal() {
    let dir = TempDir::new().unwrap();
    train_artifacts(&dir);

    // Rewrite the sidecar with a wrong feature count.
    let metadata_path = dir.path().join("metadata.json");
    let content = std::fs::read_to_string(&metadata_path).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&content).unwrap();
    value["n_features"] = serde_json::json!(3);
    std::fs::write(&metadata_path, serde_json::to_string(&value).unwrap()).unwrap();

    let err = DiseasePredictor::load(dir.path()).unwrap_err();
    assert!(matches!(err, PrognosError::Configuration(_)));
}

#[test]
fn test_degraded_bank_excludes_model_from_votes() {
    let dir = TempDir::new().unwrap();
    train_artifacts(&dir);

    let full = DiseasePredictor::load(dir.path()).unwrap();
    let full_response = full.predict("abdominal pain; nausea; vomiting", 2).unwrap();
    assert_eq!(full_response.individual_predictions.len(), 5);

    std::fs::remove_file(dir.path().join("random_forest.json")).unwrap();
    let degraded = DiseasePredictor::load(dir.path()).unwrap();
    let degraded_response = degraded
        .predict("abdominal pain; nausea; vomiting", 2)
        .unwrap();
    assert_eq!(degraded_response.individual_predictions.len(), 4);
}
