//! Configuration errors
//!
//! Input-quality problems are never errors; they are absorbed by the
//! filters and the classifier. Only configuration is rejected.

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::pose::LandmarkId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("{field} must not be lower than {min_field}: {value} < {min}")]
    BelowMinimum {
        field: &'static str,
        value: f64,
        min_field: &'static str,
        min: f64,
    },

    #[error("history capacity {capacity} must be at least {required} (min history {min_history})")]
    HistoryTooSmall {
        capacity: usize,
        min_history: usize,
        required: usize,
    },

    #[error("weight for {} must be finite and non-negative, got {value}", .landmark.name())]
    InvalidWeight { landmark: LandmarkId, value: f64 },

    #[error("expected {expected} landmark weights, got {actual}")]
    WeightCount { expected: usize, actual: usize },

    #[error("all landmark weights are zero")]
    NoWeightedLandmarks,

    #[error("fingerprint needs at least one landmark")]
    EmptyFingerprint,
}

impl From<ConfigError> for JsValue {
    fn from(err: ConfigError) -> Self {
        JsValue::from_str(&format!("Invalid configuration: {}", err))
    }
}

/// Reject non-finite or non-positive values
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

pub(crate) fn ensure_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

pub(crate) fn below_minimum(
    field: &'static str,
    value: f64,
    min_field: &'static str,
    min: f64,
) -> ConfigError {
    ConfigError::BelowMinimum {
        field,
        value,
        min_field,
        min,
    }
}
