//! Text analysis for raw symptom input.
//!
//! This module turns free-text symptom strings into ordered sequences of
//! canonical symptom phrases. The pipeline is: character cleaning, synonym
//! standardization, then splitting on the semicolon delimiter. Everything is
//! deterministic and idempotent so that training and serving see identical
//! text for identical input.

pub mod lexicon;
pub mod normalizer;
pub mod synonym;

pub use lexicon::{KeywordGroup, MedicalLexicon};
pub use normalizer::{NormalizedSymptoms, TextNormalizer};
pub use synonym::SynonymTable;
