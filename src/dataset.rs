//! Symptom corpus records and JSONL loading.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrognosError, Result};

/// One source-of-truth corpus row: a disease and its raw symptom text.
///
/// Records are immutable once loaded; all cleaning happens downstream in
/// the text normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomRecord {
    /// Disease name, used as the training label.
    pub disease: String,
    /// Raw semicolon-delimited symptom text.
    #[serde(rename = "symptoms")]
    pub raw_text: String,
}

impl SymptomRecord {
    /// Create a new record.
    pub fn new<D: Into<String>, S: Into<String>>(disease: D, raw_text: S) -> Self {
        Self {
            disease: disease.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// Load a corpus from a JSON-lines file, one record per line.
///
/// Blank lines are skipped; malformed lines are reported with their line
/// number.
pub fn load_corpus(path: &Path) -> Result<Vec<SymptomRecord>> {
    let file = File::open(path).map_err(|e| {
        PrognosError::dataset(format!("cannot open corpus {}: {e}", path.display()))
    })?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record: SymptomRecord = serde_json::from_str(&line).map_err(|e| {
            PrognosError::dataset(format!(
                "malformed record on line {} of {}: {e}",
                line_num + 1,
                path.display()
            ))
        })?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(PrognosError::dataset(format!(
            "corpus {} contains no records",
            path.display()
        )));
    }

    Ok(records)
}

/// Write a corpus as a JSON-lines file, one record per line.
pub fn save_corpus(records: &[SymptomRecord], path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    for record in records {
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}")?;
    }
    Ok(())
}
