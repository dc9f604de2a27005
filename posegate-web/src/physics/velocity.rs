//! Per-landmark motion fields
//!
//! A motion field holds one optional vector per landmark index: a
//! position, a velocity or an acceleration. `None` marks an index where
//! the quantity is undefined (absent or non-finite), and undefined
//! entries never take part in aggregates.

use nalgebra::Vector3;

use crate::pose::{LandmarkWeights, PoseFrame};

/// One optional 3D vector per landmark index
pub type MotionField = Vec<Option<Vector3<f64>>>;

/// Finite landmark positions of a frame
pub fn positions(frame: &PoseFrame) -> MotionField {
    frame
        .iter()
        .map(|(_, lm)| lm.is_finite().then(|| lm.position()))
        .collect()
}

/// `(current - previous) / dt` per landmark.
///
/// Only indices present in both fields are differentiated; the result has
/// the length of the shorter input.
pub fn finite_difference(current: &MotionField, previous: &MotionField, dt: f64) -> MotionField {
    current
        .iter()
        .zip(previous.iter())
        .map(|(c, p)| match (c, p) {
            (Some(c), Some(p)) => {
                let d = (c - p) / dt;
                d.iter().all(|v| v.is_finite()).then_some(d)
            }
            _ => None,
        })
        .collect()
}

/// Weighted mean magnitude of a field, `None` if nothing is defined
pub fn weighted_magnitude(field: &MotionField, weights: &LandmarkWeights) -> Option<f64> {
    weighted_mean(weights.weighted().filter_map(|(id, w)| {
        field
            .get(id.index())
            .copied()
            .flatten()
            .map(|v| (w, v.norm()))
    }))
}

/// Weighted mean of `(weight, value)` pairs, ignoring non-finite values
pub fn weighted_mean(items: impl Iterator<Item = (f64, f64)>) -> Option<f64> {
    let mut sum = 0.0;
    let mut total = 0.0;
    for (w, v) in items {
        if v.is_finite() && w > 0.0 {
            sum += w * v;
            total += w;
        }
    }
    (total > 0.0).then(|| sum / total)
}
