//! Model registry
//!
//! Loads every artifact the service needs once at startup and hands out
//! shared read-only references afterwards. Any load failure is returned to
//! the caller, which is expected to abort startup.

use crate::models::ModelType;
use crate::predictor::{
    LinearArtifact, OnnxPredictor, Predictor, TfidfVectorizer, Vectorizer, VectorizerArtifact,
};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Serialization of an artifact file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Onnx,
    Json,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("onnx") => Ok(ArtifactFormat::Onnx),
            Some("json") => Ok(ArtifactFormat::Json),
            _ => bail!(
                "Unsupported artifact format for {:?} (expected .onnx or .json)",
                path
            ),
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactFormat::Onnx => f.write_str("onnx"),
            ArtifactFormat::Json => f.write_str("json"),
        }
    }
}

/// File locations of the five artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub churn_model: PathBuf,
    pub segment_model: PathBuf,
    pub forecast_model: PathBuf,
    pub sentiment_vectorizer: PathBuf,
    pub sentiment_model: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside a model directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            churn_model: dir.join("churn_model.onnx"),
            segment_model: dir.join("segment_model.onnx"),
            forecast_model: dir.join("forecast_model.onnx"),
            sentiment_vectorizer: dir.join("sentiment_vectorizer.json"),
            sentiment_model: dir.join("sentiment_model.json"),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir("models")
    }
}

/// Fingerprint of a loaded artifact
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub name: &'static str,
    pub path: PathBuf,
    pub format: ArtifactFormat,
    pub backend: String,
    pub checksum: String,
    pub size_bytes: usize,
    pub loaded_at: i64,
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn read_artifact(name: &'static str, path: &Path) -> Result<(Vec<u8>, ArtifactFormat)> {
    let format = ArtifactFormat::from_path(path)?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {} artifact {:?}", name, path))?;
    Ok((bytes, format))
}

fn fingerprint(
    name: &'static str,
    path: &Path,
    format: ArtifactFormat,
    backend: &str,
    bytes: &[u8],
) -> ArtifactInfo {
    let info = ArtifactInfo {
        name,
        path: path.to_path_buf(),
        format,
        backend: backend.to_string(),
        checksum: compute_checksum(bytes),
        size_bytes: bytes.len(),
        loaded_at: chrono::Utc::now().timestamp(),
    };
    info!(
        event = "artifact_loaded",
        artifact = name,
        path = ?info.path,
        backend = %info.backend,
        checksum = %info.checksum,
        size = info.size_bytes,
        "Artifact loaded"
    );
    info
}

/// Load a predictor artifact from disk
pub fn load_predictor(name: &'static str, path: &Path) -> Result<(Arc<dyn Predictor>, ArtifactInfo)> {
    let (bytes, format) = read_artifact(name, path)?;

    let predictor: Arc<dyn Predictor> = match format {
        ArtifactFormat::Onnx => Arc::new(
            OnnxPredictor::new(name, &bytes)
                .with_context(|| format!("Failed to load {} model {:?}", name, path))?,
        ),
        ArtifactFormat::Json => LinearArtifact::from_slice(&bytes)
            .and_then(LinearArtifact::into_predictor)
            .with_context(|| format!("Failed to load {} model {:?}", name, path))?
            .into(),
    };

    let info = fingerprint(name, path, format, predictor.kind(), &bytes);
    Ok((predictor, info))
}

/// Load a vectorizer artifact from disk
pub fn load_vectorizer(
    name: &'static str,
    path: &Path,
) -> Result<(Arc<dyn Vectorizer>, ArtifactInfo)> {
    let (bytes, format) = read_artifact(name, path)?;
    if format != ArtifactFormat::Json {
        bail!("{} artifact {:?} must be a JSON vectorizer", name, path);
    }

    let vectorizer = VectorizerArtifact::from_slice(&bytes)
        .and_then(TfidfVectorizer::from_artifact)
        .with_context(|| format!("Failed to load {} {:?}", name, path))?;

    let info = fingerprint(name, path, format, "tfidf", &bytes);
    Ok((Arc::new(vectorizer), info))
}

/// Immutable set of models shared by all requests
#[derive(Clone)]
pub struct ModelRegistry {
    churn: Arc<dyn Predictor>,
    segment: Arc<dyn Predictor>,
    forecast: Arc<dyn Predictor>,
    sentiment_vectorizer: Arc<dyn Vectorizer>,
    sentiment: Arc<dyn Predictor>,
    artifacts: Vec<ArtifactInfo>,
}

impl ModelRegistry {
    /// Load all five artifacts, failing on the first one that cannot be loaded
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let (churn, churn_info) = load_predictor("churn_model", &paths.churn_model)?;
        let (segment, segment_info) = load_predictor("segment_model", &paths.segment_model)?;
        let (forecast, forecast_info) = load_predictor("forecast_model", &paths.forecast_model)?;
        let (sentiment_vectorizer, vectorizer_info) =
            load_vectorizer("sentiment_vectorizer", &paths.sentiment_vectorizer)?;
        let (sentiment, sentiment_info) =
            load_predictor("sentiment_model", &paths.sentiment_model)?;

        info!(count = 5, "Model registry ready");

        Ok(Self {
            churn,
            segment,
            forecast,
            sentiment_vectorizer,
            sentiment,
            artifacts: vec![
                churn_info,
                segment_info,
                forecast_info,
                vectorizer_info,
                sentiment_info,
            ],
        })
    }

    /// Assemble a registry from already-constructed models
    pub fn from_parts(
        churn: Arc<dyn Predictor>,
        segment: Arc<dyn Predictor>,
        forecast: Arc<dyn Predictor>,
        sentiment_vectorizer: Arc<dyn Vectorizer>,
        sentiment: Arc<dyn Predictor>,
    ) -> Self {
        Self {
            churn,
            segment,
            forecast,
            sentiment_vectorizer,
            sentiment,
            artifacts: Vec::new(),
        }
    }

    /// Predictor bound to a model type
    pub fn predictor(&self, model_type: ModelType) -> &dyn Predictor {
        match model_type {
            ModelType::Churn => self.churn.as_ref(),
            ModelType::Segment => self.segment.as_ref(),
            ModelType::Forecast => self.forecast.as_ref(),
            ModelType::Sentiment => self.sentiment.as_ref(),
        }
    }

    pub fn sentiment_vectorizer(&self) -> &dyn Vectorizer {
        self.sentiment_vectorizer.as_ref()
    }

    /// Fingerprints of the artifacts loaded from disk
    pub fn artifacts(&self) -> &[ArtifactInfo] {
        &self.artifacts
    }
}
