//! Core library for the customer intelligence API
//!
//! This crate provides:
//! - Loading of model and vectorizer artifacts into an immutable registry
//! - Request validation and dispatch to churn, segment, forecast and sentiment models
//! - Response shaping and the request error taxonomy
//! - Structured logging helpers

pub mod dispatch;
pub mod error;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod registry;
pub mod validation;

pub use dispatch::Dispatcher;
pub use error::{PredictError, RequiredField};
pub use models::*;
pub use observability::StructuredLogger;
pub use registry::{ArtifactInfo, ArtifactPaths, ModelRegistry};
