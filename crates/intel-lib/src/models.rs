//! Core data models for the customer intelligence service

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Discriminator selecting which model handles a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Churn,
    Segment,
    Forecast,
    Sentiment,
}

impl ModelType {
    pub const ALL: [ModelType; 4] = [
        ModelType::Churn,
        ModelType::Segment,
        ModelType::Forecast,
        ModelType::Sentiment,
    ];

    /// Exact, case-sensitive match on the wire name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "churn" => Some(ModelType::Churn),
            "segment" => Some(ModelType::Segment),
            "forecast" => Some(ModelType::Forecast),
            "sentiment" => Some(ModelType::Sentiment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Churn => "churn",
            ModelType::Segment => "segment",
            ModelType::Forecast => "forecast",
            ModelType::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated prediction request, one variant per code path
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionRequest {
    /// Churn or segment classification over a flat feature vector
    Classify { model_type: ModelType, features: Value },
    /// Next-period sales forecast
    Forecast { past_sales: Value },
    /// Raw text, passed to the vectorizer as given
    Sentiment { text: String },
}

impl PredictionRequest {
    pub fn model_type(&self) -> ModelType {
        match self {
            PredictionRequest::Classify { model_type, .. } => *model_type,
            PredictionRequest::Forecast { .. } => ModelType::Forecast,
            PredictionRequest::Sentiment { .. } => ModelType::Sentiment,
        }
    }
}

/// Raw value produced by a model for one input row
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Integer(i64),
    Float(f64),
    Label(String),
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Integer(v) => write!(f, "{}", v),
            // Integral floats render with a trailing ".0"
            Prediction::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            Prediction::Float(v) => write!(f, "{}", v),
            Prediction::Label(label) => f.write_str(label),
        }
    }
}

/// Response body for a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Classification {
        model_type: ModelType,
        prediction: i64,
    },
    Forecast {
        model_type: ModelType,
        next_period_forecast: f64,
    },
    Sentiment {
        sentiment: String,
    },
}

impl PredictionResponse {
    pub fn model_type(&self) -> ModelType {
        match self {
            PredictionResponse::Classification { model_type, .. } => *model_type,
            PredictionResponse::Forecast { .. } => ModelType::Forecast,
            PredictionResponse::Sentiment { .. } => ModelType::Sentiment,
        }
    }
}

/// Fixed liveness payload for `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

pub const LIVENESS_MESSAGE: &str = "Customer Intelligence API is running";

impl StatusMessage {
    pub fn running() -> Self {
        Self {
            message: LIVENESS_MESSAGE.to_string(),
        }
    }
}
