//! Bidirectional mapping between disease names and integer class ids.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrognosError, Result};

/// Injective disease-name to class-id mapping, fit once over the training
/// corpus.
///
/// Ids are assigned in sorted order of the distinct names seen at fit time,
/// so id assignment is stable between training runs over the same corpus
/// and matches any coefficient-indexed array built from it. The codec is
/// immutable after fitting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelCodec {
    classes: Vec<String>,
}

impl LabelCodec {
    /// Fit a codec over the disease names of the training corpus.
    ///
    /// Duplicates are collapsed; ids cover exactly `0..num_classes`.
    pub fn fit(disease_names: &[String]) -> Result<Self> {
        if disease_names.is_empty() {
            return Err(PrognosError::data_insufficient(
                "cannot fit label codec on an empty corpus",
            ));
        }

        let distinct: BTreeSet<&String> = disease_names.iter().collect();
        let classes = distinct.into_iter().cloned().collect();

        Ok(Self { classes })
    }

    /// Encode a disease name into its class id.
    pub fn encode(&self, name: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(name))
            .map_err(|_| PrognosError::UnknownLabel(name.to_string()))
    }

    /// Decode a class id back into its disease name.
    pub fn decode(&self, id: usize) -> Result<&str> {
        self.classes
            .get(id)
            .map(|name| name.as_str())
            .ok_or(PrognosError::LabelIndexOutOfRange {
                id,
                num_classes: self.classes.len(),
            })
    }

    /// Number of distinct classes seen at fit time.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// The class names in id order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Check whether the codec has been fitted.
    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Save the codec as a JSON artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a codec from a JSON artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let codec: Self = serde_json::from_str(&content)?;
        Ok(codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fit_assigns_sorted_ids() {
        let codec = LabelCodec::fit(&names(&["influenza", "anemia", "migraine"])).unwrap();
        assert_eq!(codec.classes(), &["anemia", "influenza", "migraine"]);
        assert_eq!(codec.encode("anemia").unwrap(), 0);
        assert_eq!(codec.encode("influenza").unwrap(), 1);
        assert_eq!(codec.encode("migraine").unwrap(), 2);
    }

    #[test]
    fn test_fit_collapses_duplicates() {
        let codec = LabelCodec::fit(&names(&["flu", "flu", "cold", "flu"])).unwrap();
        assert_eq!(codec.num_classes(), 2);
    }

    #[test]
    fn test_encode_unknown_name_fails() {
        let codec = LabelCodec::fit(&names(&["flu"])).unwrap();
        let err = codec.encode("plague").unwrap_err();
        assert!(matches!(err, PrognosError::UnknownLabel(_)));
    }

    #[test]
    fn test_decode_out_of_range_fails() {
        let codec = LabelCodec::fit(&names(&["flu", "cold"])).unwrap();
        assert_eq!(codec.decode(0).unwrap(), "cold");
        let err = codec.decode(2).unwrap_err();
        assert!(matches!(
            err,
            PrognosError::LabelIndexOutOfRange { id: 2, num_classes: 2 }
        ));
    }

    #[test]
    fn test_fit_empty_corpus_fails() {
        assert!(LabelCodec::fit(&[]).is_err());
    }

    #[test]
    fn test_roundtrip_encode_decode() {
        let codec = LabelCodec::fit(&names(&["malaria", "dengue", "typhoid"])).unwrap();
        for id in 0..codec.num_classes() {
            let name = codec.decode(id).unwrap().to_string();
            assert_eq!(codec.encode(&name).unwrap(), id);
        }
    }
}
