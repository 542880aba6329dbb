//! Dispatch of validated requests to the bound models

use crate::error::PredictError;
use crate::models::{PredictionRequest, PredictionResponse};
use crate::predictor::{row_matrix, OutputFormatter};
use crate::registry::ModelRegistry;
use crate::validation::validate;
use serde_json::Value;
use std::sync::Arc;

/// Routes requests to exactly one model and shapes its output
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ModelRegistry>,
    formatter: OutputFormatter,
}

impl Dispatcher {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            formatter: OutputFormatter::new(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Validate a parsed body and run the selected model
    pub fn handle(&self, payload: &Value) -> Result<PredictionResponse, PredictError> {
        let request = validate(payload)?;
        self.dispatch(&request)
    }

    /// Run the model selected by an already validated request
    pub fn dispatch(&self, request: &PredictionRequest) -> Result<PredictionResponse, PredictError> {
        let response = match request {
            PredictionRequest::Classify {
                model_type,
                features,
            } => {
                let input = row_matrix(features)?;
                let predictions = self.registry.predictor(*model_type).predict(&input)?;
                self.formatter.classification(*model_type, &predictions)?
            }
            PredictionRequest::Forecast { past_sales } => {
                let input = row_matrix(past_sales)?;
                let predictions = self
                    .registry
                    .predictor(request.model_type())
                    .predict(&input)?;
                self.formatter.forecast(&predictions)?
            }
            PredictionRequest::Sentiment { text } => {
                let input = self
                    .registry
                    .sentiment_vectorizer()
                    .transform(&[text.as_str()])?;
                let predictions = self
                    .registry
                    .predictor(request.model_type())
                    .predict(&input)?;
                self.formatter.sentiment(&predictions)?
            }
        };
        Ok(response)
    }
}
