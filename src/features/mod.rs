//! Feature extraction: TF-IDF vectorization, engineered indicator features,
//! standard scaling, and the combined feature builder.
//!
//! The feature schema is frozen at fit time; every vector produced afterwards
//! (training or inference) has identical length and feature order.

pub mod builder;
pub mod engineered;
pub mod scaler;
pub mod tfidf;

pub use builder::FeatureBuilder;
pub use engineered::{ENGINEERED_FEATURE_COUNT, engineered_feature_names, engineered_features};
pub use scaler::StandardScaler;
pub use tfidf::{TfIdfConfig, TfIdfVectorizer};
