//! ONNX inference using tract
//!
//! Provides lightweight ML inference for exported scikit-learn style models
//! loaded via tract-onnx. The graph must declare the width of its first
//! input; it is compiled for a single `[1, width]` row at load time, so a
//! graph tract cannot run is rejected before the service starts.

use super::{Matrix, Predictor};
use crate::models::Prediction;
use anyhow::{anyhow, bail, Context, Result};
use std::time::Instant;
use tract_onnx::pb;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
const MAX_INFERENCE_MS: u128 = 50;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based predictor using tract for lightweight inference
pub struct OnnxPredictor {
    name: String,
    model: TractModel,
    n_features: usize,
}

impl OnnxPredictor {
    /// Parse and compile a predictor from ONNX model bytes
    pub fn new(name: impl Into<String>, model_bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let onnx = tract_onnx::onnx();

        let proto = onnx
            .proto_model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?;
        let n_features = declared_width(&proto).with_context(|| {
            format!("{} model does not declare the width of its first input", name)
        })?;

        let model = onnx
            .model_for_proto_model(&proto)
            .context("Failed to translate ONNX model")?
            .with_input_fact(0, f32::fact([1, n_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .with_context(|| format!("Failed to optimize {} model", name))?
            .into_runnable()
            .context("Failed to create runnable model")?;

        debug!(model = %name, n_features, "Compiled inference plan");

        Ok(Self {
            name,
            model,
            n_features,
        })
    }
}

/// Fixed trailing dimension of the graph's first input
fn declared_width(proto: &pb::ModelProto) -> Option<usize> {
    let input = proto.graph.as_ref()?.input.first()?;
    let pb::type_proto::Value::TensorType(tensor) = input.r#type.as_ref()?.value.as_ref()?;
    match tensor.shape.as_ref()?.dim.last()?.value.as_ref()? {
        pb::tensor_shape_proto::dimension::Value::DimValue(width) if *width > 0 => {
            usize::try_from(*width).ok()
        }
        _ => None,
    }
}

/// Convert the first model output into one prediction per element
fn tensor_to_predictions(output: &Tensor) -> Result<Vec<Prediction>> {
    let datum_type = output.datum_type();

    if datum_type == String::datum_type() {
        let labels = output.as_slice::<String>()?;
        return Ok(labels.iter().cloned().map(Prediction::Label).collect());
    }

    if datum_type.is_float() {
        let values = output.cast_to::<f64>()?;
        return Ok(values
            .as_slice::<f64>()?
            .iter()
            .map(|v| Prediction::Float(*v))
            .collect());
    }

    let values = output.cast_to::<i64>()?;
    Ok(values
        .as_slice::<i64>()?
        .iter()
        .map(|v| Prediction::Integer(*v))
        .collect())
}

impl Predictor for OnnxPredictor {
    fn predict(&self, input: &Matrix) -> Result<Vec<Prediction>> {
        let start = Instant::now();

        let (rows, width) = input.dim();
        if rows != 1 {
            return Err(anyhow!("Expected a single input row, got {}", rows));
        }
        if width != self.n_features {
            bail!(
                "X has {} features, but {} is expecting {} features as input",
                width,
                self.name,
                self.n_features
            );
        }

        // The graph runs in single precision
        let tensor: Tensor = input.mapv(|v| v as f32).into();

        let result = self.model.run(tvec!(tensor.into()))?;
        let output = result.first().context("No output from model")?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                model = %self.name,
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target",
                MAX_INFERENCE_MS
            );
        } else {
            debug!(model = %self.name, elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        tensor_to_predictions(output)
    }

    fn kind(&self) -> &str {
        "onnx"
    }
}

/// Hand-built ONNX graphs for tests
#[cfg(test)]
pub(crate) mod fixtures {
    use prost::Message;
    use tract_onnx::pb;

    const FLOAT: i32 = 1;

    fn dim(value: pb::tensor_shape_proto::dimension::Value) -> pb::tensor_shape_proto::Dimension {
        pb::tensor_shape_proto::Dimension {
            value: Some(value),
            ..Default::default()
        }
    }

    fn float_value(name: &str, shape: Option<pb::TensorShapeProto>) -> pb::ValueInfoProto {
        pb::ValueInfoProto {
            name: name.to_string(),
            r#type: Some(pb::TypeProto {
                value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                    elem_type: FLOAT,
                    shape,
                })),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// `Y = X · W` with `X: [N, weights.len()]`, using `op_type` for the node
    ///
    /// With `declare_width` unset the feature dimension is symbolic.
    pub fn matmul_model(weights: &[f32], op_type: &str, declare_width: bool) -> Vec<u8> {
        use pb::tensor_shape_proto::dimension::Value;

        let width = if declare_width {
            Value::DimValue(weights.len() as i64)
        } else {
            Value::DimParam("K".to_string())
        };
        let input_shape = pb::TensorShapeProto {
            dim: vec![dim(Value::DimParam("N".to_string())), dim(width)],
        };

        let graph = pb::GraphProto {
            name: "matmul".to_string(),
            node: vec![pb::NodeProto {
                name: "Y".to_string(),
                op_type: op_type.to_string(),
                input: vec!["X".to_string(), "W".to_string()],
                output: vec!["Y".to_string()],
                ..Default::default()
            }],
            initializer: vec![pb::TensorProto {
                name: "W".to_string(),
                dims: vec![weights.len() as i64, 1],
                data_type: FLOAT,
                float_data: weights.to_vec(),
                ..Default::default()
            }],
            input: vec![float_value("X", Some(input_shape))],
            output: vec![float_value("Y", None)],
            ..Default::default()
        };

        pb::ModelProto {
            ir_version: 7,
            opset_import: vec![pb::OperatorSetIdProto {
                domain: String::new(),
                version: 13,
            }],
            graph: Some(graph),
            ..Default::default()
        }
        .encode_to_vec()
    }
}
