//! Customer Intelligence CLI
//!
//! A command-line client for the Customer Intelligence API: liveness checks
//! and churn, segment, forecast and sentiment predictions.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{health, predict};

/// Customer Intelligence CLI
#[derive(Parser)]
#[command(name = "intel")]
#[command(author, version, about = "CLI for the Customer Intelligence API", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via INTEL_API_URL env var)
    #[arg(long, env = "INTEL_API_URL")]
    pub api_url: Option<String>,

    /// Output format (defaults to the config file setting, then table)
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the API is running
    Health,

    /// Run a prediction
    #[command(subcommand)]
    Predict(PredictCommands),
}

#[derive(Subcommand)]
pub enum PredictCommands {
    /// Predict whether a customer will churn
    Churn {
        /// Comma-separated feature values
        #[arg(long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
        features: Vec<f64>,
    },

    /// Assign a customer to a segment
    Segment {
        /// Comma-separated feature values
        #[arg(long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
        features: Vec<f64>,
    },

    /// Forecast next-period sales
    Forecast {
        /// Comma-separated sales history, oldest first
        #[arg(long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
        past_sales: Vec<f64>,
    },

    /// Classify the sentiment of a piece of text
    Sentiment {
        /// Text to classify
        #[arg(long)]
        text: String,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| output::OutputFormat::from_config(config.default_format.as_deref()));

    // Initialize client
    let client = client::ApiClient::new(&config.resolve_api_url(cli.api_url))?;

    // Execute command
    match cli.command {
        Commands::Health => health::check_health(&client, format).await?,
        Commands::Predict(predict_cmd) => match predict_cmd {
            PredictCommands::Churn { features } => {
                predict::predict_features(&client, "churn", features, format).await?;
            }
            PredictCommands::Segment { features } => {
                predict::predict_features(&client, "segment", features, format).await?;
            }
            PredictCommands::Forecast { past_sales } => {
                predict::predict_forecast(&client, past_sales, format).await?;
            }
            PredictCommands::Sentiment { text } => {
                predict::predict_sentiment(&client, &text, format).await?;
            }
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}
