//! Request-level error taxonomy

use thiserror::Error;

/// Request fields whose absence is reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    ModelType,
    Features,
    PastSales,
    Text,
}

impl RequiredField {
    /// JSON key of the field
    pub fn key(&self) -> &'static str {
        match self {
            RequiredField::ModelType => "model_type",
            RequiredField::Features => "features",
            RequiredField::PastSales => "past_sales",
            RequiredField::Text => "text",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            RequiredField::ModelType => "model_type is required",
            RequiredField::Features => "features are required",
            RequiredField::PastSales => "past_sales is required",
            RequiredField::Text => "text is required",
        }
    }
}

/// Failure of a single prediction request
#[derive(Debug, Error)]
pub enum PredictError {
    /// A required field is absent or empty
    #[error("{}", .0.message())]
    MissingField(RequiredField),

    /// The discriminator is not one of the known model types
    #[error("Invalid model_type")]
    InvalidModelType,

    /// Anything raised while shaping input, running a model or shaping output
    #[error("{0}")]
    Inference(String),
}

impl PredictError {
    /// Returns true for failures caused by the request itself
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictError::MissingField(_) | PredictError::InvalidModelType
        )
    }
}

impl From<anyhow::Error> for PredictError {
    fn from(err: anyhow::Error) -> Self {
        PredictError::Inference(format!("{:#}", err))
    }
}

impl From<serde_json::Error> for PredictError {
    fn from(err: serde_json::Error) -> Self {
        PredictError::Inference(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_messages() {
        assert_eq!(
            PredictError::MissingField(RequiredField::ModelType).to_string(),
            "model_type is required"
        );
        assert_eq!(
            PredictError::MissingField(RequiredField::Features).to_string(),
            "features are required"
        );
        assert_eq!(
            PredictError::MissingField(RequiredField::PastSales).to_string(),
            "past_sales is required"
        );
        assert_eq!(
            PredictError::MissingField(RequiredField::Text).to_string(),
            "text is required"
        );
    }

    #[test]
    fn test_invalid_model_type_message() {
        assert_eq!(PredictError::InvalidModelType.to_string(), "Invalid model_type");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(PredictError::InvalidModelType.is_client_error());
        assert!(PredictError::MissingField(RequiredField::Text).is_client_error());
        assert!(!PredictError::Inference("boom".to_string()).is_client_error());
    }

    #[test]
    fn test_anyhow_chain_is_preserved() {
        let err = anyhow::anyhow!("shape mismatch").context("churn model failed");
        let predict_err = PredictError::from(err);
        assert_eq!(predict_err.to_string(), "churn model failed: shape mismatch");
    }
}
