//! HTTP API: liveness probe and the prediction endpoint

use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use intel_lib::{
    Dispatcher, ModelRegistry, PredictError, PredictionResponse, StatusMessage, StructuredLogger,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Default cap on `/predict` request bodies
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub logger: StructuredLogger,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(registry: Arc<ModelRegistry>, logger: StructuredLogger) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry),
            logger,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Liveness probe, independent of model state
async fn home() -> impl IntoResponse {
    (StatusCode::OK, Json(StatusMessage::running()))
}

/// Validate, dispatch and run one prediction
async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let start = Instant::now();

    let result = match body
        .map_err(|rejection| PredictError::Inference(rejection.body_text()))
        .and_then(|body| serde_json::from_slice::<Value>(&body).map_err(PredictError::from))
    {
        Ok(payload) => {
            let dispatcher = state.dispatcher.clone();
            tokio::task::spawn_blocking(move || dispatcher.handle(&payload))
                .await
                .unwrap_or_else(|e| Err(PredictError::Inference(e.to_string())))
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(response) => {
            state
                .logger
                .log_prediction(response.model_type(), start.elapsed().as_micros());
            Ok(Json(response))
        }
        Err(err) => {
            if err.is_client_error() {
                state.logger.log_rejection(&err.to_string());
            } else {
                state.logger.log_failure(&err.to_string());
            }
            Err(err.into())
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve(
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
