//! Error types for the Prognos library.
//!
//! All fallible operations return [`Result`], an alias over [`PrognosError`].
//! The variants follow the pipeline's failure taxonomy: configuration
//! problems (missing or mismatched artifacts), input validation failures,
//! label-codec violations, and training-time data insufficiency.
//!
//! # Examples
//!
//! ```
//! use prognos::error::{PrognosError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PrognosError::config("scaler artifact missing"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Prognos operations.
#[derive(Error, Debug)]
pub enum PrognosError {
    /// I/O errors (artifact files, corpus files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Artifacts missing, corrupt, or shape-mismatched at load time,
    /// or a component used before it was fitted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Inference input rejected before feature building.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        suggestions: Vec<String>,
    },

    /// A disease name that was not present when the label codec was fitted.
    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    /// A class id outside the fitted range `0..num_classes`.
    #[error("Label id {id} out of range 0..{num_classes}")]
    LabelIndexOutOfRange { id: usize, num_classes: usize },

    /// Training-time only: not enough samples to fit or split.
    #[error("Insufficient training data: {0}")]
    DataInsufficient(String),

    /// Text analysis errors (normalization, synonym table construction).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Corpus parsing errors.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PrognosError.
pub type Result<T> = std::result::Result<T, PrognosError>;

impl PrognosError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PrognosError::Configuration(msg.into())
    }

    /// Create a new validation error with actionable suggestions.
    pub fn validation<S: Into<String>>(msg: S, suggestions: Vec<String>) -> Self {
        PrognosError::Validation {
            message: msg.into(),
            suggestions,
        }
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        PrognosError::Analysis(msg.into())
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        PrognosError::Dataset(msg.into())
    }

    /// Create a new insufficient-training-data error.
    pub fn data_insufficient<S: Into<String>>(msg: S) -> Self {
        PrognosError::DataInsufficient(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PrognosError::Other(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        PrognosError::Other(format!("Internal error: {}", msg.into()))
    }
}
