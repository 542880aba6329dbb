//! Liveness check command

use crate::client::ApiClient;
use crate::output::{print_json, print_success, OutputFormat};
use anyhow::Result;

/// Query the liveness probe
pub async fn check_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let status = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Table => print_success(&status.message),
    }

    Ok(())
}
