//! Whole-phrase synonym substitution for medical term standardization.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{PrognosError, Result};

/// Maps colloquial phrases to canonical medical phrases.
///
/// All patterns are compiled into a single word-bounded alternation, ordered
/// longest-first so a phrase like "throwing up blood" wins over "throwing up".
/// Substitution never matches inside a longer word: "weak" does not rewrite
/// "weakness".
pub struct SynonymTable {
    pattern: Option<Regex>,
    replacements: HashMap<String, String>,
}

impl std::fmt::Debug for SynonymTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynonymTable")
            .field("entries", &self.replacements.len())
            .finish()
    }
}

impl SynonymTable {
    /// Build a synonym table from (colloquial, canonical) pairs.
    ///
    /// Keys are expected to already be in cleaned form (lowercase, no
    /// punctuation); the normalizer takes care of that before construction.
    pub fn new(pairs: &[(String, String)]) -> Result<Self> {
        let mut replacements = HashMap::new();
        let mut keys = Vec::new();

        for (colloquial, canonical) in pairs {
            if colloquial.is_empty() {
                continue;
            }
            if replacements
                .insert(colloquial.clone(), canonical.clone())
                .is_none()
            {
                keys.push(colloquial.clone());
            }
        }

        if keys.is_empty() {
            return Ok(Self {
                pattern: None,
                replacements,
            });
        }

        // Longest-first so the alternation prefers full phrases.
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let alternation = keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"\b(?:{alternation})\b"))
            .map_err(|e| PrognosError::analysis(format!("invalid synonym pattern: {e}")))?;

        Ok(Self {
            pattern: Some(pattern),
            replacements,
        })
    }

    /// Replace every colloquial phrase in `text` with its canonical form.
    pub fn apply(&self, text: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern
                .replace_all(text, |caps: &regex::Captures| {
                    self.replacements[&caps[0]].clone()
                })
                .into_owned(),
            None => text.to_string(),
        }
    }

    /// Number of synonym entries.
    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    /// Check whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }
}
