//! Server configuration

use crate::api::DEFAULT_MAX_BODY_BYTES;
use anyhow::{Context, Result};
use intel_lib::ArtifactPaths;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// Directory that relative artifact paths are resolved against
    pub model_dir: PathBuf,

    pub churn_model: PathBuf,
    pub segment_model: PathBuf,
    pub forecast_model: PathBuf,
    pub sentiment_vectorizer: PathBuf,
    pub sentiment_model: PathBuf,

    /// Instance name attached to every log record
    pub instance_name: String,

    /// Largest accepted `/predict` body
    pub max_body_bytes: usize,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            model_dir: PathBuf::from("models"),
            churn_model: PathBuf::from("churn_model.onnx"),
            segment_model: PathBuf::from("segment_model.onnx"),
            forecast_model: PathBuf::from("forecast_model.onnx"),
            sentiment_vectorizer: PathBuf::from("sentiment_vectorizer.json"),
            sentiment_model: PathBuf::from("sentiment_model.json"),
            instance_name: default_instance_name(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `intel-api` file and `INTEL_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name("intel-api").required(false))
                .add_source(config::Environment::with_prefix("INTEL").try_parsing(true)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let config = builder.build().context("Failed to read configuration")?;
        config
            .try_deserialize()
            .context("Invalid server configuration")
    }

    /// Socket address to listen on
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.model_dir.join(path)
        }
    }

    /// Artifact locations with relative paths resolved against `model_dir`
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            churn_model: self.resolve(&self.churn_model),
            segment_model: self.resolve(&self.segment_model),
            forecast_model: self.resolve(&self.forecast_model),
            sentiment_vectorizer: self.resolve(&self.sentiment_vectorizer),
            sentiment_model: self.resolve(&self.sentiment_model),
        }
    }
}
