//! Structured JSON logging for service events
//!
//! Every record carries an `event` field so log pipelines can filter on it
//! without parsing messages.

use crate::models::ModelType;
use crate::registry::ArtifactInfo;
use tracing::{error, info, warn};

/// Structured logger for service events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, addr: &str, artifacts: &[ArtifactInfo]) {
        let checksums: Vec<String> = artifacts
            .iter()
            .map(|a| format!("{}={}", a.name, &a.checksum[..a.checksum.len().min(12)]))
            .collect();
        info!(
            event = "service_started",
            instance = %self.instance,
            version = %version,
            addr = %addr,
            artifacts = %checksums.join(","),
            "Customer intelligence API started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Customer intelligence API shutting down"
        );
    }

    /// Log a successful prediction
    pub fn log_prediction(&self, model_type: ModelType, elapsed_us: u128) {
        info!(
            event = "prediction_served",
            instance = %self.instance,
            model_type = %model_type,
            elapsed_us = elapsed_us as u64,
            "Prediction served"
        );
    }

    /// Log a request rejected by validation
    pub fn log_rejection(&self, reason: &str) {
        warn!(
            event = "prediction_rejected",
            instance = %self.instance,
            reason = %reason,
            "Prediction request rejected"
        );
    }

    /// Log a failed prediction
    pub fn log_failure(&self, message: &str) {
        error!(
            event = "prediction_failed",
            instance = %self.instance,
            error = %message,
            "Prediction failed"
        );
    }
}
