//! Input shaping for numeric models
//!
//! Converts the loosely typed JSON arrays carried by requests into the
//! single-row matrices the models consume.

use super::Matrix;
use anyhow::{bail, Result};
use serde_json::Value;

/// JSON truthiness: null, false, zero, empty strings, arrays and objects are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Reshape a JSON value into a 1 x K matrix
///
/// Nested arrays are flattened in row-major order and a bare number becomes a
/// single column. Nested arrays must be rectangular. Booleans count as 0/1.
/// Anything else is rejected.
pub fn row_matrix(value: &Value) -> Result<Matrix> {
    let mut data = Vec::new();
    flatten_into(value, &mut data)?;
    let width = data.len();
    Ok(Matrix::from_shape_vec((1, width), data)?)
}

/// Push every number under `value` and return its shape
fn flatten_into(value: &Value, out: &mut Vec<f64>) -> Result<Vec<usize>> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) => out.push(v),
            None => bail!("could not convert {} to float", n),
        },
        Value::Bool(b) => out.push(if *b { 1.0 } else { 0.0 }),
        Value::Array(items) => {
            let mut inner: Option<Vec<usize>> = None;
            for item in items {
                let shape = flatten_into(item, out)?;
                if *inner.get_or_insert_with(|| shape.clone()) != shape {
                    bail!(
                        "setting an array element with a sequence. \
                         The requested array has an inhomogeneous shape"
                    );
                }
            }
            let mut shape = vec![items.len()];
            shape.extend(inner.unwrap_or_default());
            return Ok(shape);
        }
        Value::String(s) => bail!("could not convert string to float: '{}'", s),
        Value::Null => bail!("could not convert null to float"),
        Value::Object(_) => bail!("could not convert object to float"),
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));

        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!(" ")));
        assert!(is_truthy(&json!([0])));
        assert!(is_truthy(&json!({"a": 1})));
    }

    #[test]
    fn test_flat_array_becomes_single_row() {
        let m = row_matrix(&json!([1, 2.5, -3])).unwrap();
        assert_eq!(m.shape(), &[1, 3]);
        assert_eq!(m[[0, 1]], 2.5);
        assert_eq!(m[[0, 2]], -3.0);
    }

    #[test]
    fn test_nested_arrays_are_flattened() {
        let m = row_matrix(&json!([[1, 2], [3, 4]])).unwrap();
        assert_eq!(m.shape(), &[1, 4]);
        assert_eq!(m.row(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_ragged_arrays_are_rejected() {
        let err = row_matrix(&json!([[1, 2], [3]])).unwrap_err();
        assert!(err.to_string().contains("inhomogeneous shape"));
        assert!(row_matrix(&json!([1, [2]])).is_err());
        assert!(row_matrix(&json!([[1], 2])).is_err());
    }

    #[test]
    fn test_values_keep_double_precision() {
        let m = row_matrix(&json!([1234567.89, 16777217])).unwrap();
        assert_eq!(m[[0, 0]], 1234567.89);
        assert_eq!(m[[0, 1]], 16777217.0);
    }

    #[test]
    fn test_scalar_becomes_single_column() {
        let m = row_matrix(&json!(7)).unwrap();
        assert_eq!(m.shape(), &[1, 1]);
        assert_eq!(m[[0, 0]], 7.0);
    }

    #[test]
    fn test_booleans_count_as_numbers() {
        let m = row_matrix(&json!([true, false])).unwrap();
        assert_eq!(m.row(0).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_strings_are_rejected() {
        let err = row_matrix(&json!([1, "abc"])).unwrap_err();
        assert_eq!(err.to_string(), "could not convert string to float: 'abc'");
    }

    #[test]
    fn test_null_and_objects_are_rejected() {
        assert!(row_matrix(&json!([1, null])).is_err());
        assert!(row_matrix(&json!({"a": 1})).is_err());
    }
}
