//! Customer Intelligence API
//!
//! Loads the churn, segment, forecast and sentiment models at startup and
//! serves predictions over HTTP.

use anyhow::{Context, Result};
use intel_api::{api, config::ServerConfig};
use intel_lib::{ModelRegistry, StructuredLogger};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting customer intelligence API");

    let config = ServerConfig::load()?;
    let addr = config.listen_addr()?;
    info!(instance = %config.instance_name, model_dir = ?config.model_dir, "Service configured");

    // A missing or corrupt artifact aborts startup
    let registry = ModelRegistry::load(&config.artifact_paths())
        .context("Failed to load model artifacts")?;

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(SERVICE_VERSION, &addr.to_string(), registry.artifacts());

    let app_state = Arc::new(
        api::AppState::new(Arc::new(registry), logger.clone())
            .with_max_body_bytes(config.max_body_bytes),
    );

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    api::serve(addr, app_state, shutdown).await?;

    logger.log_shutdown("SIGINT received");
    info!("Shut down");

    Ok(())
}
