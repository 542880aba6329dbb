//! ML inference backends

mod features;
pub(crate) mod inference;
mod linear;
mod output;
mod vectorizer;

pub use features::{is_truthy, row_matrix};
pub use inference::OnnxPredictor;
pub use linear::{ClassLabel, LinearArtifact, LinearClassifier, LinearRegressor, NearestCentroid};
pub use output::{normalize_sentiment_label, to_float, to_integer, OutputFormatter};
pub use vectorizer::{TfidfVectorizer, VectorizerArtifact};

use crate::models::Prediction;
use anyhow::Result;
use tract_onnx::prelude::tract_ndarray;

/// Dense numeric input, one row per sample, kept in double precision
pub type Matrix = tract_ndarray::Array2<f64>;

/// Trait for prediction implementations
pub trait Predictor: Send + Sync {
    /// Predict one value per input row
    fn predict(&self, input: &Matrix) -> Result<Vec<Prediction>>;

    /// Short backend name used in logs and error messages
    fn kind(&self) -> &str;
}

/// Trait for text vectorizers feeding the sentiment model
pub trait Vectorizer: Send + Sync {
    /// Map each document to one fixed-width row
    fn transform(&self, documents: &[&str]) -> Result<Matrix>;

    /// Width of the produced rows
    fn vocabulary_size(&self) -> usize;
}
