//! Request validation
//!
//! Checks the discriminator and the fields each model type needs. No shape
//! checks happen here; a feature vector of the wrong width is left for the
//! model to reject.

use crate::error::{PredictError, RequiredField};
use crate::models::{ModelType, PredictionRequest};
use crate::predictor::is_truthy;
use serde_json::Value;

fn required<'a>(payload: &'a Value, field: RequiredField) -> Result<&'a Value, PredictError> {
    payload
        .get(field.key())
        .filter(|value| is_truthy(value))
        .ok_or(PredictError::MissingField(field))
}

/// Validate a parsed request body
pub fn validate(payload: &Value) -> Result<PredictionRequest, PredictError> {
    if !payload.is_object() {
        return Err(PredictError::Inference(
            "request body must be a JSON object".to_string(),
        ));
    }

    let model_type = required(payload, RequiredField::ModelType)?;
    let model_type = model_type
        .as_str()
        .and_then(ModelType::from_name)
        .ok_or(PredictError::InvalidModelType)?;

    match model_type {
        ModelType::Churn | ModelType::Segment => {
            let features = required(payload, RequiredField::Features)?;
            Ok(PredictionRequest::Classify {
                model_type,
                features: features.clone(),
            })
        }
        ModelType::Forecast => {
            let past_sales = required(payload, RequiredField::PastSales)?;
            Ok(PredictionRequest::Forecast {
                past_sales: past_sales.clone(),
            })
        }
        ModelType::Sentiment => match payload.get(RequiredField::Text.key()) {
            Some(Value::String(text)) if !text.trim().is_empty() => {
                Ok(PredictionRequest::Sentiment { text: text.clone() })
            }
            _ => Err(PredictError::MissingField(RequiredField::Text)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn error_message(payload: Value) -> String {
        validate(&payload).unwrap_err().to_string()
    }

    #[test]
    fn test_missing_model_type() {
        assert_eq!(error_message(json!({})), "model_type is required");
        assert_eq!(error_message(json!({"model_type": ""})), "model_type is required");
        assert_eq!(error_message(json!({"model_type": null})), "model_type is required");
    }

    #[test]
    fn test_unknown_model_type() {
        assert_eq!(error_message(json!({"model_type": "bogus"})), "Invalid model_type");
        assert_eq!(error_message(json!({"model_type": "Churn"})), "Invalid model_type");
        assert_eq!(error_message(json!({"model_type": 5})), "Invalid model_type");
    }

    #[test]
    fn test_unknown_model_type_wins_over_missing_fields() {
        let err = validate(&json!({"model_type": "bogus"})).unwrap_err();
        assert!(matches!(err, PredictError::InvalidModelType));
    }

    #[test]
    fn test_classification_requires_features() {
        assert_eq!(error_message(json!({"model_type": "churn"})), "features are required");
        assert_eq!(
            error_message(json!({"model_type": "segment", "features": []})),
            "features are required"
        );
        // past_sales does not stand in for features
        assert_eq!(
            error_message(json!({"model_type": "churn", "past_sales": [1, 2]})),
            "features are required"
        );
    }

    #[test]
    fn test_forecast_requires_past_sales() {
        assert_eq!(
            error_message(json!({"model_type": "forecast", "features": [1]})),
            "past_sales is required"
        );
    }

    #[test]
    fn test_sentiment_requires_non_blank_text() {
        assert_eq!(error_message(json!({"model_type": "sentiment"})), "text is required");
        assert_eq!(
            error_message(json!({"model_type": "sentiment", "text": ""})),
            "text is required"
        );
        assert_eq!(
            error_message(json!({"model_type": "sentiment", "text": "   "})),
            "text is required"
        );
        assert_eq!(
            error_message(json!({"model_type": "sentiment", "text": 42})),
            "text is required"
        );
    }

    #[test]
    fn test_sentiment_text_is_kept_untrimmed() {
        let request = validate(&json!({"model_type": "sentiment", "text": "  great  "})).unwrap();
        assert_eq!(
            request,
            PredictionRequest::Sentiment {
                text: "  great  ".to_string()
            }
        );
    }

    #[test]
    fn test_valid_requests() {
        let request = validate(&json!({"model_type": "segment", "features": [1, 2]})).unwrap();
        assert_eq!(request.model_type(), ModelType::Segment);

        let request = validate(&json!({"model_type": "forecast", "past_sales": [10, 20]})).unwrap();
        assert_eq!(
            request,
            PredictionRequest::Forecast {
                past_sales: json!([10, 20])
            }
        );
    }

    #[test]
    fn test_non_object_body_is_not_a_validation_error() {
        let err = validate(&json!([1, 2, 3])).unwrap_err();
        assert!(!err.is_client_error());
    }
}
