//! Training-time synthetic symptom-list generation.

use log::info;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::analysis::{MedicalLexicon, TextNormalizer};
use crate::dataset::SymptomRecord;
use crate::error::Result;

/// Configuration for the augmentation generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentConfig {
    /// Synthetic variants produced per source record.
    pub factor: usize,
    /// Seed for all stochastic choices.
    pub seed: u64,
    /// Probability of swapping a symptom for one of its variations.
    pub p_variation: f64,
    /// Probability of adding a related symptom from an affected body system.
    pub p_add_related: f64,
    /// Probability of dropping one symptom when more than three remain.
    pub p_drop: f64,
    /// Probability of shuffling symptom order.
    pub p_shuffle: f64,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            factor: 2,
            seed: 42,
            p_variation: 0.3,
            p_add_related: 0.4,
            p_drop: 0.2,
            p_shuffle: 0.3,
        }
    }
}

/// Produces synthetic variants of normalized symptom lists to enlarge the
/// training corpus.
///
/// Variants come from synonym-style variation substitution, adding a related
/// symptom from an affected body system, dropping a symptom from longer
/// lists, and order shuffling. Every choice draws from a generator seeded
/// per record, so a fixed seed reproduces the same augmented corpus.
#[derive(Debug)]
pub struct SymptomAugmenter {
    lexicon: MedicalLexicon,
    config: AugmentConfig,
}

impl SymptomAugmenter {
    /// Create an augmenter over the shared lexicon.
    pub fn new(lexicon: MedicalLexicon, config: AugmentConfig) -> Self {
        Self { lexicon, config }
    }

    /// Augment a whole corpus, keeping every original record and appending
    /// `factor` variants of each.
    pub fn augment_corpus(
        &self,
        records: &[SymptomRecord],
        normalizer: &TextNormalizer,
    ) -> Result<Vec<SymptomRecord>> {
        let mut augmented = Vec::with_capacity(records.len() * (self.config.factor + 1));

        for (idx, record) in records.iter().enumerate() {
            augmented.push(record.clone());

            let normalized = normalizer.normalize(&record.raw_text);
            if normalized.is_empty() {
                continue;
            }

            let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(idx as u64));
            for variant in self.variants(normalized.phrases(), &mut rng) {
                augmented.push(SymptomRecord::new(
                    record.disease.clone(),
                    variant.join("; "),
                ));
            }
        }

        info!(
            "augmented {} records into {} (factor {})",
            records.len(),
            augmented.len(),
            self.config.factor
        );
        Ok(augmented)
    }

    /// Produce `factor` synthetic variants of one symptom list.
    fn variants(&self, phrases: &[String], rng: &mut StdRng) -> Vec<Vec<String>> {
        (0..self.config.factor)
            .map(|_| self.one_variant(phrases, rng))
            .collect()
    }

    fn one_variant(&self, phrases: &[String], rng: &mut StdRng) -> Vec<String> {
        let mut variant: Vec<String> = phrases
            .iter()
            .map(|phrase| {
                if rng.random::<f64>() < self.config.p_variation {
                    if let Some(variations) = self.lexicon.variations_of(phrase) {
                        if let Some(&choice) = variations.choose(rng) {
                            return choice.to_string();
                        }
                    }
                }
                phrase.clone()
            })
            .collect();

        if rng.random::<f64>() < self.config.p_add_related {
            if let Some(related) = self.related_symptom(phrases, rng) {
                if !variant.contains(&related) {
                    variant.push(related);
                }
            }
        }

        if variant.len() > 3 && rng.random::<f64>() < self.config.p_drop {
            let drop_idx = rng.random_range(0..variant.len());
            variant.remove(drop_idx);
        }

        if rng.random::<f64>() < self.config.p_shuffle {
            variant.shuffle(rng);
        }

        variant
    }

    /// Pick a symptom from one of the body systems the list already touches.
    fn related_symptom(&self, phrases: &[String], rng: &mut StdRng) -> Option<String> {
        let affected: Vec<&Vec<&'static str>> = self
            .lexicon
            .system_symptoms()
            .iter()
            .filter(|(_, symptoms)| {
                phrases
                    .iter()
                    .any(|phrase| symptoms.contains(&phrase.as_str()))
            })
            .map(|(_, symptoms)| symptoms)
            .collect();

        let system = affected.choose(rng)?;
        system.choose(rng).map(|symptom| symptom.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SymptomAugmenter, TextNormalizer) {
        let lexicon = MedicalLexicon::new();
        let normalizer = TextNormalizer::new(&lexicon).unwrap();
        let augmenter = SymptomAugmenter::new(lexicon, AugmentConfig::default());
        (augmenter, normalizer)
    }

    fn corpus() -> Vec<SymptomRecord> {
        vec![
            SymptomRecord::new("influenza", "fever; headache; fatigue; cough"),
            SymptomRecord::new("gastritis", "abdominal pain; nausea; vomiting"),
        ]
    }

    #[test]
    fn test_originals_are_kept_and_variants_added() {
        let (augmenter, normalizer) = setup();
        let records = corpus();
        let augmented = augmenter.augment_corpus(&records, &normalizer).unwrap();

        assert_eq!(augmented.len(), records.len() * 3);
        assert_eq!(augmented[0], records[0]);
        assert_eq!(augmented[3], records[1]);
    }

    #[test]
    fn test_variants_keep_the_source_label() {
        let (augmenter, normalizer) = setup();
        let augmented = augmenter.augment_corpus(&corpus(), &normalizer).unwrap();

        for record in &augmented[..3] {
            assert_eq!(record.disease, "influenza");
        }
        for record in &augmented[3..] {
            assert_eq!(record.disease, "gastritis");
        }
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let (augmenter, normalizer) = setup();
        let a = augmenter.augment_corpus(&corpus(), &normalizer).unwrap();
        let b = augmenter.augment_corpus(&corpus(), &normalizer).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let lexicon = MedicalLexicon::new();
        let normalizer = TextNormalizer::new(&lexicon).unwrap();
        let a = SymptomAugmenter::new(
            lexicon.clone(),
            AugmentConfig {
                seed: 1,
                ..AugmentConfig::default()
            },
        )
        .augment_corpus(&corpus(), &normalizer)
        .unwrap();
        let b = SymptomAugmenter::new(
            lexicon,
            AugmentConfig {
                seed: 2,
                ..AugmentConfig::default()
            },
        )
        .augment_corpus(&corpus(), &normalizer)
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_records_produce_no_variants() {
        let (augmenter, normalizer) = setup();
        let records = vec![SymptomRecord::new("unknown", "   ")];
        let augmented = augmenter.augment_corpus(&records, &normalizer).unwrap();
        assert_eq!(augmented.len(), 1);
    }

    #[test]
    fn test_variants_renormalize_to_canonical_phrases() {
        let (augmenter, normalizer) = setup();
        let augmented = augmenter.augment_corpus(&corpus(), &normalizer).unwrap();

        // Substituted variations are colloquial on purpose; normalizing a
        // variant must still produce non-empty canonical phrases.
        for record in &augmented {
            assert!(!normalizer.normalize(&record.raw_text).is_empty());
        }
    }
}
