//! Reduce a backend prediction response to one scalar.
//!
//! Accepted shapes, checked in order:
//! 1. a sequence: element 0
//! 2. an object with a `predictions` sequence: its element 0
//! 3. the whole response as a number (or numeric string)

use serde_json::Value;
use thiserror::Error;

/// Object key holding the prediction list.
pub const PREDICTIONS_FIELD: &str = "predictions";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("response body is not JSON: {0}")]
    NotJson(String),

    #[error("prediction sequence is empty")]
    Empty,

    #[error("prediction {0} is not numeric")]
    NotNumeric(String),

    #[error("unrecognized response shape: {0}")]
    Unrecognized(String),
}

/// Parse a raw response body and normalize it.
pub fn normalize_body(body: &[u8]) -> Result<f64, NormalizeError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| NormalizeError::NotJson(e.to_string()))?;
    normalize(&value)
}

/// Normalize a decoded response into a scalar prediction.
pub fn normalize(value: &Value) -> Result<f64, NormalizeError> {
    match value {
        Value::Array(items) => first_scalar(items),
        Value::Object(map) => match map.get(PREDICTIONS_FIELD) {
            Some(Value::Array(items)) => first_scalar(items),
            _ => Err(NormalizeError::Unrecognized(abbreviate(value))),
        },
        other => scalar(other),
    }
}

fn first_scalar(items: &[Value]) -> Result<f64, NormalizeError> {
    items.first().ok_or(NormalizeError::Empty).and_then(scalar)
}

fn scalar(value: &Value) -> Result<f64, NormalizeError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| NormalizeError::NotNumeric(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| NormalizeError::NotNumeric(s.clone())),
        other => Err(NormalizeError::NotNumeric(abbreviate(other))),
    }
}

fn abbreviate(value: &Value) -> String {
    crate::backend::truncate_body(&value.to_string()).to_string()
}
