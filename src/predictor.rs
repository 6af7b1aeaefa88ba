//! Serving facade: load artifacts once, validate input, predict diseases.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{MedicalLexicon, NormalizedSymptoms, TextNormalizer};
use crate::artifacts::{ArtifactMetadata, load_artifacts};
use crate::ensemble::EnsemblePredictor;
use crate::error::{PrognosError, Result};
use crate::features::FeatureBuilder;
use crate::labels::LabelCodec;

/// Minimum accepted symptom phrase count.
pub const MIN_SYMPTOMS: usize = 2;
/// Maximum accepted symptom phrase count.
pub const MAX_SYMPTOMS: usize = 15;

/// Outcome of input validation, with actionable suggestions on rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the input may proceed to prediction.
    pub valid: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Suggestions for fixing rejected input.
    pub suggestions: Vec<String>,
}

/// One ranked disease candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDisease {
    /// 1-indexed rank.
    pub rank: usize,
    /// Disease name.
    pub disease: String,
    /// Averaged ensemble probability.
    pub probability: f64,
}

/// The full prediction response for one symptom input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// The normalized symptom phrases the prediction was made from.
    pub input_symptoms: Vec<String>,
    /// Disease chosen by the ensemble vote.
    pub predicted_disease: String,
    /// Ensemble probability of the predicted disease.
    pub confidence: f64,
    /// The `top_k` ranked candidates.
    pub top_predictions: Vec<RankedDisease>,
    /// Disease chosen by each individual model, keyed by model name.
    pub individual_predictions: BTreeMap<String, String>,
    /// When the prediction was produced.
    pub timestamp: DateTime<Utc>,
}

/// Static advisory information about a predicted disease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseInfo {
    /// Disease name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Advisory note attached to every entry.
    pub note: String,
}

/// Check a normalized symptom set against the accepted phrase-count bounds.
///
/// Rejections carry actionable suggestions rather than failing silently.
pub fn validate_symptom_set(normalized: &NormalizedSymptoms) -> ValidationReport {
    if normalized.is_empty() {
        return ValidationReport {
            valid: false,
            message: "Please enter at least one symptom.".to_string(),
            suggestions: Vec::new(),
        };
    }

    if normalized.len() < MIN_SYMPTOMS {
        return ValidationReport {
            valid: false,
            message: format!("Please enter at least {MIN_SYMPTOMS} symptoms for better accuracy."),
            suggestions: vec![
                "Add more specific symptoms".to_string(),
                "Include severity indicators (mild, severe, etc.)".to_string(),
            ],
        };
    }

    if normalized.len() > MAX_SYMPTOMS {
        return ValidationReport {
            valid: false,
            message: format!(
                "Too many symptoms. Please limit to {MAX_SYMPTOMS} symptoms for better accuracy."
            ),
            suggestions: vec![
                "Focus on the most prominent symptoms".to_string(),
                "Remove less relevant symptoms".to_string(),
            ],
        };
    }

    ValidationReport {
        valid: true,
        message: format!("Valid input with {} symptoms.", normalized.len()),
        suggestions: Vec::new(),
    }
}

/// The serving-side entry point.
///
/// All artifacts load once at construction into read-only state; nothing is
/// mutated afterwards, so one predictor can serve any number of requests
/// without locking. A missing individual model degrades the bank; a missing
/// vectorizer, codec, scaler, or metadata sidecar fails the load.
#[derive(Debug)]
pub struct DiseasePredictor {
    normalizer: TextNormalizer,
    builder: FeatureBuilder,
    ensemble: EnsemblePredictor,
    codec: LabelCodec,
    metadata: ArtifactMetadata,
}

impl DiseasePredictor {
    /// Load every artifact from a training output directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let artifacts = load_artifacts(dir)?;
        let lexicon = MedicalLexicon::new();
        let normalizer = TextNormalizer::new(&lexicon)?;
        let builder = FeatureBuilder::from_vectorizer(artifacts.vectorizer, lexicon);
        let ensemble = EnsemblePredictor::new(artifacts.bank, artifacts.scaler)?;

        Ok(Self {
            normalizer,
            builder,
            ensemble,
            codec: artifacts.codec,
            metadata: artifacts.metadata,
        })
    }

    /// Validate raw symptom text against the accepted phrase-count bounds.
    ///
    /// Validation runs before any feature building and returns actionable
    /// suggestions instead of failing silently.
    pub fn validate_symptoms(&self, text: &str) -> ValidationReport {
        validate_symptom_set(&self.normalizer.normalize(text))
    }

    /// Predict the most likely diseases for raw symptom text.
    ///
    /// The input must pass [`Self::validate_symptoms`]; rejected input
    /// surfaces as a validation error carrying the same suggestions.
    pub fn predict(&self, text: &str, top_k: usize) -> Result<PredictionResponse> {
        let report = self.validate_symptoms(text);
        if !report.valid {
            return Err(PrognosError::validation(report.message, report.suggestions));
        }

        let normalized = self.normalizer.normalize(text);
        let features = self.builder.transform(&normalized)?;
        let result = self.ensemble.predict(&features, top_k)?;

        let mut top_predictions = Vec::with_capacity(result.ranked_top_k.len());
        for ranked in &result.ranked_top_k {
            top_predictions.push(RankedDisease {
                rank: ranked.rank,
                disease: self.codec.decode(ranked.class_id)?.to_string(),
                probability: ranked.probability,
            });
        }

        let mut individual_predictions = BTreeMap::new();
        for (model, &class_id) in &result.per_model_predictions {
            individual_predictions
                .insert(model.clone(), self.codec.decode(class_id)?.to_string());
        }

        Ok(PredictionResponse {
            input_symptoms: normalized.phrases().to_vec(),
            predicted_disease: self.codec.decode(result.winning_class)?.to_string(),
            confidence: result.winning_probability,
            top_predictions,
            individual_predictions,
            timestamp: Utc::now(),
        })
    }

    /// Advisory information for one fitted disease class.
    ///
    /// Unknown disease names are rejected rather than silently answered.
    pub fn disease_info(&self, name: &str) -> Result<DiseaseInfo> {
        self.codec.encode(name)?;
        Ok(DiseaseInfo {
            name: name.to_string(),
            description: format!("Information about {name}"),
            note: "This is a prediction based on symptoms. Please consult a healthcare \
                   professional for proper diagnosis."
                .to_string(),
        })
    }

    /// Names of the models that loaded successfully.
    pub fn model_names(&self) -> Vec<&'static str> {
        self.ensemble.bank().model_names()
    }

    /// Number of disease classes the artifacts were fitted on.
    pub fn num_classes(&self) -> usize {
        self.codec.num_classes()
    }

    /// The metadata sidecar the artifacts were checked against.
    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }
}
