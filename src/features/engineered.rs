//! Hand-crafted indicator features over normalized symptom text.

use crate::analysis::{MedicalLexicon, NormalizedSymptoms};

/// Number of engineered features: symptom count, 8 body-system indicators,
/// 3 severity indicators, and symptom diversity.
pub const ENGINEERED_FEATURE_COUNT: usize = 13;

/// Compute the engineered feature sub-vector, in fixed order.
///
/// Layout: symptom count, one 0/1 indicator per body system, one 0/1
/// indicator per severity band, then symptom diversity (the number of body
/// systems affected, 0-8). Indicators use substring matching against the
/// space-joined symptom text.
pub fn engineered_features(lexicon: &MedicalLexicon, symptoms: &NormalizedSymptoms) -> Vec<f64> {
    let text = symptoms.joined();
    let mut features = Vec::with_capacity(ENGINEERED_FEATURE_COUNT);

    features.push(symptoms.len() as f64);

    let mut diversity = 0.0;
    for system in lexicon.body_systems() {
        let hit = system.matches(&text);
        if hit {
            diversity += 1.0;
        }
        features.push(if hit { 1.0 } else { 0.0 });
    }

    for band in lexicon.severity_bands() {
        features.push(if band.matches(&text) { 1.0 } else { 0.0 });
    }

    features.push(diversity);
    features
}

/// Engineered feature names, matching the order of [`engineered_features`].
pub fn engineered_feature_names(lexicon: &MedicalLexicon) -> Vec<String> {
    let mut names = Vec::with_capacity(ENGINEERED_FEATURE_COUNT);
    names.push("symptom_count".to_string());
    for system in lexicon.body_systems() {
        names.push(format!("has_{}_symptoms", system.name));
    }
    for band in lexicon.severity_bands() {
        names.push(format!("has_{}_indicators", band.name));
    }
    names.push("symptom_diversity".to_string());
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symptoms(phrases: &[&str]) -> NormalizedSymptoms {
        NormalizedSymptoms::new(phrases.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn test_feature_count_matches_constant() {
        let lexicon = MedicalLexicon::new();
        let features = engineered_features(&lexicon, &symptoms(&["fever", "cough"]));
        assert_eq!(features.len(), ENGINEERED_FEATURE_COUNT);
        assert_eq!(
            engineered_feature_names(&lexicon).len(),
            ENGINEERED_FEATURE_COUNT
        );
    }

    #[test]
    fn test_symptom_count_is_first() {
        let lexicon = MedicalLexicon::new();
        let features =
            engineered_features(&lexicon, &symptoms(&["fever", "cough", "headache"]));
        assert_eq!(features[0], 3.0);
    }

    #[test]
    fn test_body_system_indicators() {
        let lexicon = MedicalLexicon::new();
        let features = engineered_features(&lexicon, &symptoms(&["dry cough", "headache"]));
        let names = engineered_feature_names(&lexicon);

        let respiratory = names
            .iter()
            .position(|n| n == "has_respiratory_symptoms")
            .unwrap();
        let neurological = names
            .iter()
            .position(|n| n == "has_neurological_symptoms")
            .unwrap();
        let dermatological = names
            .iter()
            .position(|n| n == "has_dermatological_symptoms")
            .unwrap();

        assert_eq!(features[respiratory], 1.0);
        assert_eq!(features[neurological], 1.0);
        assert_eq!(features[dermatological], 0.0);
    }

    #[test]
    fn test_severity_indicators() {
        let lexicon = MedicalLexicon::new();
        let features = engineered_features(&lexicon, &symptoms(&["severe abdominal pain"]));
        let names = engineered_feature_names(&lexicon);

        let severe = names
            .iter()
            .position(|n| n == "has_severe_indicators")
            .unwrap();
        let mild = names
            .iter()
            .position(|n| n == "has_mild_indicators")
            .unwrap();

        assert_eq!(features[severe], 1.0);
        assert_eq!(features[mild], 0.0);
    }

    #[test]
    fn test_diversity_counts_affected_systems() {
        let lexicon = MedicalLexicon::new();
        // cough -> respiratory, nausea -> gastrointestinal, rash -> dermatological
        let features = engineered_features(&lexicon, &symptoms(&["cough", "nausea", "rash"]));
        let diversity = features[ENGINEERED_FEATURE_COUNT - 1];
        assert_eq!(diversity, 3.0);
    }

    #[test]
    fn test_empty_symptoms_yield_zero_vector() {
        let lexicon = MedicalLexicon::new();
        let features = engineered_features(&lexicon, &symptoms(&[]));
        assert!(features.iter().all(|&f| f == 0.0));
    }
}
