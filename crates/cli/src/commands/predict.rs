//! Prediction commands

use crate::client::{ApiClient, PredictRequest, PredictResponse};
use crate::output::{color_sentiment, format_forecast, print_json, print_table, OutputFormat};
use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

/// Prediction row for table display
#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl PredictionRow {
    fn from_response(model: &str, response: &PredictResponse) -> Self {
        let model = response
            .model_type
            .clone()
            .unwrap_or_else(|| model.to_string());

        if let Some(prediction) = response.prediction {
            return Self {
                model,
                field: "prediction".to_string(),
                value: prediction.to_string(),
            };
        }
        if let Some(forecast) = response.next_period_forecast {
            return Self {
                model,
                field: "next_period_forecast".to_string(),
                value: format_forecast(forecast),
            };
        }
        Self {
            model,
            field: "sentiment".to_string(),
            value: response.sentiment.clone().unwrap_or_default(),
        }
    }
}

/// Churn or segment prediction from a feature vector
pub async fn predict_features(
    client: &ApiClient,
    model_type: &str,
    features: Vec<f64>,
    format: OutputFormat,
) -> Result<()> {
    let response = client
        .predict(&PredictRequest::features(model_type, features))
        .await?;
    render(model_type, &response, format);
    Ok(())
}

/// Next-period forecast from a sales history
pub async fn predict_forecast(
    client: &ApiClient,
    past_sales: Vec<f64>,
    format: OutputFormat,
) -> Result<()> {
    let response = client.predict(&PredictRequest::forecast(past_sales)).await?;
    render("forecast", &response, format);
    Ok(())
}

/// Sentiment label for a piece of text
pub async fn predict_sentiment(client: &ApiClient, text: &str, format: OutputFormat) -> Result<()> {
    let response = client.predict(&PredictRequest::sentiment(text)).await?;

    match format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Table => {
            let label = response.sentiment.as_deref().unwrap_or_default();
            println!("{}", "Sentiment".bold());
            println!("{}", "=".repeat(50));
            println!("  Text:      {}", text.cyan());
            println!("  Sentiment: {}", color_sentiment(label));
        }
    }

    Ok(())
}

fn render(model_type: &str, response: &PredictResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(response),
        OutputFormat::Table => print_table(&[PredictionRow::from_response(model_type, response)]),
    }
}
