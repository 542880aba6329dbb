//! Prediction output formatting
//!
//! Converts raw model outputs into the JSON-safe response shape fixed for
//! each model type.

use crate::models::{ModelType, Prediction, PredictionResponse};
use anyhow::{anyhow, bail, Result};

/// Canonical spellings for the sentiment labels the service knows about
const SENTIMENT_LABELS: &[(&str, &str)] = &[
    ("positive", "Positive"),
    ("negative", "Negative"),
    ("neutral", "Neutral"),
];

/// Map a raw sentiment label to its canonical form
///
/// Known labels are matched after trimming and lower-casing. Unknown labels
/// are returned exactly as the model produced them.
pub fn normalize_sentiment_label(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    SENTIMENT_LABELS
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Coerce a prediction to an integer class id
pub fn to_integer(prediction: &Prediction) -> Result<i64> {
    match prediction {
        Prediction::Integer(v) => Ok(*v),
        Prediction::Float(v) => {
            if v.is_nan() {
                bail!("cannot convert float NaN to integer");
            }
            if v.is_infinite() {
                bail!("cannot convert float infinity to integer");
            }
            let truncated = v.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                bail!("prediction {} does not fit in a 64-bit integer", v);
            }
            Ok(truncated as i64)
        }
        Prediction::Label(label) => label
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("invalid literal for int() with base 10: '{}'", label)),
    }
}

/// Coerce a prediction to a finite float
pub fn to_float(prediction: &Prediction) -> Result<f64> {
    let value = match prediction {
        Prediction::Integer(v) => *v as f64,
        Prediction::Float(v) => *v,
        Prediction::Label(label) => label
            .trim()
            .parse::<f64>()
            .map_err(|_| anyhow!("could not convert string to float: '{}'", label))?,
    };
    if !value.is_finite() {
        bail!("forecast {} is not representable in JSON", value);
    }
    Ok(value)
}

/// Formats raw model outputs into per-type responses
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Take the first prediction of a batch
    fn first(predictions: &[Prediction]) -> Result<&Prediction> {
        predictions
            .first()
            .ok_or_else(|| anyhow!("model returned no predictions"))
    }

    /// Churn and segment: `{"model_type", "prediction": <int>}`
    pub fn classification(
        &self,
        model_type: ModelType,
        predictions: &[Prediction],
    ) -> Result<PredictionResponse> {
        let prediction = to_integer(Self::first(predictions)?)?;
        Ok(PredictionResponse::Classification {
            model_type,
            prediction,
        })
    }

    /// Forecast: `{"model_type": "forecast", "next_period_forecast": <float>}`
    pub fn forecast(&self, predictions: &[Prediction]) -> Result<PredictionResponse> {
        let next_period_forecast = to_float(Self::first(predictions)?)?;
        Ok(PredictionResponse::Forecast {
            model_type: ModelType::Forecast,
            next_period_forecast,
        })
    }

    /// Sentiment: `{"sentiment": <label>}`
    pub fn sentiment(&self, predictions: &[Prediction]) -> Result<PredictionResponse> {
        let raw = Self::first(predictions)?.to_string();
        Ok(PredictionResponse::Sentiment {
            sentiment: normalize_sentiment_label(&raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels_are_title_cased() {
        assert_eq!(normalize_sentiment_label("positive"), "Positive");
        assert_eq!(normalize_sentiment_label("NEGATIVE"), "Negative");
        assert_eq!(normalize_sentiment_label("  Neutral\n"), "Neutral");
    }

    #[test]
    fn test_unknown_labels_pass_through_unchanged() {
        assert_eq!(normalize_sentiment_label("Mixed"), "Mixed");
        assert_eq!(normalize_sentiment_label(" VERY_POSITIVE "), " VERY_POSITIVE ");
        assert_eq!(normalize_sentiment_label("1"), "1");
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(to_integer(&Prediction::Integer(4)).unwrap(), 4);
        assert_eq!(to_integer(&Prediction::Float(2.9)).unwrap(), 2);
        assert_eq!(to_integer(&Prediction::Float(-2.9)).unwrap(), -2);
        assert_eq!(to_integer(&Prediction::Label(" 3 ".to_string())).unwrap(), 3);
        assert!(to_integer(&Prediction::Float(f64::NAN)).is_err());
        assert!(to_integer(&Prediction::Float(f64::INFINITY)).is_err());
        assert!(to_integer(&Prediction::Label("churned".to_string())).is_err());
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(to_float(&Prediction::Integer(150)).unwrap(), 150.0);
        assert_eq!(to_float(&Prediction::Float(12.5)).unwrap(), 12.5);
        assert_eq!(to_float(&Prediction::Label("7.25".to_string())).unwrap(), 7.25);
        assert!(to_float(&Prediction::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_classification_takes_first_prediction() {
        let formatter = OutputFormatter::new();
        let response = formatter
            .classification(
                ModelType::Churn,
                &[Prediction::Integer(1), Prediction::Integer(0)],
            )
            .unwrap();
        assert_eq!(
            response,
            PredictionResponse::Classification {
                model_type: ModelType::Churn,
                prediction: 1
            }
        );
    }

    #[test]
    fn test_forecast_from_integer_output_is_float() {
        let formatter = OutputFormatter::new();
        let response = formatter.forecast(&[Prediction::Integer(42)]).unwrap();
        let body = serde_json::to_string(&response).unwrap();
        assert!(body.contains("\"next_period_forecast\":42.0"));
    }

    #[test]
    fn test_sentiment_from_numeric_label() {
        let formatter = OutputFormatter::new();
        let response = formatter.sentiment(&[Prediction::Integer(1)]).unwrap();
        assert_eq!(
            response,
            PredictionResponse::Sentiment {
                sentiment: "1".to_string()
            }
        );
    }

    #[test]
    fn test_empty_predictions_fail() {
        let formatter = OutputFormatter::new();
        let err = formatter.forecast(&[]).unwrap_err();
        assert_eq!(err.to_string(), "model returned no predictions");
    }
}
