//! Portable JSON model artifacts
//!
//! Linear regressors, linear classifiers and nearest-centroid segmenters
//! exported as plain coefficients. These cover the common scikit-learn
//! estimators (LinearRegression, LogisticRegression, LinearSVC, KMeans)
//! without needing an ONNX export.

use super::{Matrix, Predictor};
use crate::models::Prediction;
use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};

/// Class label as stored in a classifier artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&ClassLabel> for Prediction {
    fn from(label: &ClassLabel) -> Self {
        match label {
            ClassLabel::Integer(v) => Prediction::Integer(*v),
            ClassLabel::Float(v) => Prediction::Float(*v),
            ClassLabel::Text(s) => Prediction::Label(s.clone()),
        }
    }
}

/// On-disk representation, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinearArtifact {
    LinearRegression {
        coef: Vec<f64>,
        #[serde(default)]
        intercept: f64,
    },
    LinearClassifier {
        classes: Vec<ClassLabel>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    NearestCentroid {
        centroids: Vec<Vec<f64>>,
        #[serde(default)]
        labels: Option<Vec<ClassLabel>>,
    },
}

impl LinearArtifact {
    /// Parse an artifact from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Validate the artifact and bind it to a predictor
    pub fn into_predictor(self) -> Result<Box<dyn Predictor>> {
        Ok(match self {
            LinearArtifact::LinearRegression { coef, intercept } => {
                Box::new(LinearRegressor::new(coef, intercept)?)
            }
            LinearArtifact::LinearClassifier {
                classes,
                coef,
                intercept,
            } => Box::new(LinearClassifier::new(classes, coef, intercept)?),
            LinearArtifact::NearestCentroid { centroids, labels } => {
                Box::new(NearestCentroid::new(centroids, labels)?)
            }
        })
    }
}

fn check_width(input: &Matrix, expected: usize, kind: &str) -> Result<()> {
    let width = input.ncols();
    if width != expected {
        bail!(
            "X has {} features, but {} is expecting {} features as input",
            width,
            kind,
            expected
        );
    }
    Ok(())
}

fn dot(row: &[f64], weights: &[f64]) -> f64 {
    row.iter().zip(weights).map(|(x, w)| x * w).sum()
}

fn rows(input: &Matrix) -> impl Iterator<Item = Vec<f64>> + '_ {
    input.rows().into_iter().map(|row| row.to_vec())
}

/// Ordinary least squares style regressor: `x · coef + intercept`
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    coef: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Result<Self> {
        ensure!(!coef.is_empty(), "linear_regression artifact has no coefficients");
        Ok(Self { coef, intercept })
    }
}

impl Predictor for LinearRegressor {
    fn predict(&self, input: &Matrix) -> Result<Vec<Prediction>> {
        check_width(input, self.coef.len(), self.kind())?;
        Ok(rows(input)
            .map(|row| Prediction::Float(dot(&row, &self.coef) + self.intercept))
            .collect())
    }

    fn kind(&self) -> &str {
        "linear_regression"
    }
}

/// One-vs-rest linear classifier
///
/// A single coefficient row with two classes is treated as binary: a positive
/// decision value selects the second class. Otherwise the class with the
/// highest decision value wins, ties going to the first.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    classes: Vec<ClassLabel>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    n_features: usize,
}

impl LinearClassifier {
    pub fn new(classes: Vec<ClassLabel>, coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> Result<Self> {
        ensure!(classes.len() >= 2, "linear_classifier artifact needs at least two classes");
        ensure!(!coef.is_empty(), "linear_classifier artifact has no coefficients");
        ensure!(
            coef.len() == intercept.len(),
            "linear_classifier artifact has {} coefficient rows but {} intercepts",
            coef.len(),
            intercept.len()
        );

        let binary = coef.len() == 1 && classes.len() == 2;
        ensure!(
            binary || coef.len() == classes.len(),
            "linear_classifier artifact has {} coefficient rows for {} classes",
            coef.len(),
            classes.len()
        );

        let n_features = coef[0].len();
        ensure!(n_features > 0, "linear_classifier artifact has empty coefficient rows");
        ensure!(
            coef.iter().all(|row| row.len() == n_features),
            "linear_classifier coefficient rows have different widths"
        );

        Ok(Self {
            classes,
            coef,
            intercept,
            n_features,
        })
    }

    fn classify(&self, row: &[f64]) -> &ClassLabel {
        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, bias)| dot(row, weights) + bias)
            .collect();

        if scores.len() == 1 {
            return if scores[0] > 0.0 {
                &self.classes[1]
            } else {
                &self.classes[0]
            };
        }

        let mut best = 0;
        for (idx, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = idx;
            }
        }
        &self.classes[best]
    }
}

impl Predictor for LinearClassifier {
    fn predict(&self, input: &Matrix) -> Result<Vec<Prediction>> {
        check_width(input, self.n_features, self.kind())?;
        Ok(rows(input)
            .map(|row| Prediction::from(self.classify(&row)))
            .collect())
    }

    fn kind(&self) -> &str {
        "linear_classifier"
    }
}

/// Assigns each row to the closest centroid (k-means style segmentation)
#[derive(Debug, Clone)]
pub struct NearestCentroid {
    centroids: Vec<Vec<f64>>,
    labels: Option<Vec<ClassLabel>>,
    n_features: usize,
}

impl NearestCentroid {
    pub fn new(centroids: Vec<Vec<f64>>, labels: Option<Vec<ClassLabel>>) -> Result<Self> {
        ensure!(!centroids.is_empty(), "nearest_centroid artifact has no centroids");
        let n_features = centroids[0].len();
        ensure!(n_features > 0, "nearest_centroid artifact has empty centroids");
        ensure!(
            centroids.iter().all(|c| c.len() == n_features),
            "nearest_centroid centroids have different widths"
        );
        if let Some(labels) = &labels {
            ensure!(
                labels.len() == centroids.len(),
                "nearest_centroid artifact has {} labels for {} centroids",
                labels.len(),
                centroids.len()
            );
        }

        Ok(Self {
            centroids,
            labels,
            n_features,
        })
    }

    fn nearest(&self, row: &[f64]) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (idx, centroid) in self.centroids.iter().enumerate() {
            let distance: f64 = row
                .iter()
                .zip(centroid)
                .map(|(x, c)| (x - c).powi(2))
                .sum();
            if distance < best_distance {
                best = idx;
                best_distance = distance;
            }
        }
        best
    }
}

impl Predictor for NearestCentroid {
    fn predict(&self, input: &Matrix) -> Result<Vec<Prediction>> {
        check_width(input, self.n_features, self.kind())?;
        Ok(rows(input)
            .map(|row| {
                let idx = self.nearest(&row);
                match &self.labels {
                    Some(labels) => Prediction::from(&labels[idx]),
                    None => Prediction::Integer(idx as i64),
                }
            })
            .collect())
    }

    fn kind(&self) -> &str {
        "nearest_centroid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single_row(values: &[f64]) -> Matrix {
        Matrix::from_shape_vec((1, values.len()), values.to_vec()).unwrap()
    }

    fn parse(value: serde_json::Value) -> Result<Box<dyn Predictor>> {
        LinearArtifact::from_slice(value.to_string().as_bytes())?.into_predictor()
    }

    #[test]
    fn test_regression_prediction() {
        let model = parse(json!({
            "kind": "linear_regression",
            "coef": [0.5, 0.5],
            "intercept": 10.0
        }))
        .unwrap();

        let predictions = model.predict(&single_row(&[100.0, 200.0])).unwrap();
        assert_eq!(predictions, vec![Prediction::Float(160.0)]);
    }

    #[test]
    fn test_regression_width_mismatch() {
        let model = parse(json!({"kind": "linear_regression", "coef": [1.0, 2.0, 3.0]})).unwrap();
        let err = model.predict(&single_row(&[1.0])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "X has 1 features, but linear_regression is expecting 3 features as input"
        );
    }

    #[test]
    fn test_binary_classifier_uses_sign() {
        let model = parse(json!({
            "kind": "linear_classifier",
            "classes": [0, 1],
            "coef": [[1.0, 1.0, 1.0]],
            "intercept": [-1.5]
        }))
        .unwrap();

        assert_eq!(
            model.predict(&single_row(&[1.0, 1.0, 1.0])).unwrap(),
            vec![Prediction::Integer(1)]
        );
        assert_eq!(
            model.predict(&single_row(&[0.0, 0.0, 0.0])).unwrap(),
            vec![Prediction::Integer(0)]
        );
    }

    #[test]
    fn test_multiclass_argmax_with_string_labels() {
        let model = parse(json!({
            "kind": "linear_classifier",
            "classes": ["positive", "negative", "neutral"],
            "coef": [[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]],
            "intercept": [0.0, 0.0, 0.0]
        }))
        .unwrap();

        assert_eq!(
            model.predict(&single_row(&[0.0, 2.0])).unwrap(),
            vec![Prediction::Label("negative".to_string())]
        );
    }

    #[test]
    fn test_multiclass_ties_go_to_first_class() {
        let model = parse(json!({
            "kind": "linear_classifier",
            "classes": ["a", "b", "c"],
            "coef": [[1.0], [1.0], [1.0]],
            "intercept": [0.0, 0.0, 0.0]
        }))
        .unwrap();

        assert_eq!(
            model.predict(&single_row(&[0.0])).unwrap(),
            vec![Prediction::Label("a".to_string())]
        );
    }

    #[test]
    fn test_classifier_rejects_inconsistent_artifact() {
        let result = parse(json!({
            "kind": "linear_classifier",
            "classes": [0, 1, 2],
            "coef": [[1.0], [1.0]],
            "intercept": [0.0, 0.0]
        }));
        assert!(result.is_err());

        let result = parse(json!({
            "kind": "linear_classifier",
            "classes": [0, 1],
            "coef": [[1.0, 2.0]],
            "intercept": [0.0, 0.0]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_nearest_centroid_returns_index() {
        let model = parse(json!({
            "kind": "nearest_centroid",
            "centroids": [[0.0, 0.0], [10.0, 10.0], [20.0, 20.0]]
        }))
        .unwrap();

        assert_eq!(
            model.predict(&single_row(&[9.0, 11.0])).unwrap(),
            vec![Prediction::Integer(1)]
        );
    }

    #[test]
    fn test_nearest_centroid_with_labels() {
        let model = parse(json!({
            "kind": "nearest_centroid",
            "centroids": [[0.0], [10.0]],
            "labels": [3, 7]
        }))
        .unwrap();

        assert_eq!(
            model.predict(&single_row(&[8.0])).unwrap(),
            vec![Prediction::Integer(7)]
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(parse(json!({"kind": "random_forest", "trees": []})).is_err());
    }

    #[test]
    fn test_mixed_class_labels_deserialize() {
        let labels: Vec<ClassLabel> = serde_json::from_value(json!([1, 2.5, "x"])).unwrap();
        assert_eq!(
            labels,
            vec![
                ClassLabel::Integer(1),
                ClassLabel::Float(2.5),
                ClassLabel::Text("x".to_string())
            ]
        );
    }
}
