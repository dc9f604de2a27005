//! Stability sub-metrics over the rolling history
//!
//! Each metric yields a raw measurement and a score in [0, 1]:
//! `1 - clamp(measured / threshold, 0, 1)`. A metric with no defined
//! input (too few frames, landmarks missing or non-finite) yields `None`
//! instead of a made-up value.

use nalgebra::Vector3;
use serde::Serialize;
use std::collections::VecDeque;

use super::history::StabilityHistory;
use crate::physics::{angle_deg, weighted_magnitude, weighted_mean, MotionField};
use crate::pose::{LandmarkId, LandmarkWeights};

/// Joint angles tracked for angular stability: (a, vertex, c)
pub const JOINT_ANGLES: [(LandmarkId, LandmarkId, LandmarkId); 6] = [
    (LandmarkId::LeftShoulder, LandmarkId::LeftHip, LandmarkId::LeftKnee),
    (LandmarkId::RightShoulder, LandmarkId::RightHip, LandmarkId::RightKnee),
    (LandmarkId::LeftHip, LandmarkId::LeftKnee, LandmarkId::LeftAnkle),
    (LandmarkId::RightHip, LandmarkId::RightKnee, LandmarkId::RightAnkle),
    (LandmarkId::LeftShoulder, LandmarkId::LeftElbow, LandmarkId::LeftWrist),
    (LandmarkId::RightShoulder, LandmarkId::RightElbow, LandmarkId::RightWrist),
];

/// A measurement and its normalised score
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SubScore {
    pub measured: f64,
    pub score: f64,
}

impl SubScore {
    pub fn new(measured: f64, threshold: f64) -> Self {
        Self {
            measured,
            score: unit_score(measured, threshold),
        }
    }
}

/// Per-landmark stability (position and speed combined)
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LandmarkScore {
    pub landmark: LandmarkId,
    pub score: f64,
}

/// 1.0 at zero, 0.0 at or beyond the threshold
pub fn unit_score(measured: f64, threshold: f64) -> f64 {
    1.0 - (measured / threshold).clamp(0.0, 1.0)
}

// ============================================================================
// POSITION
// ============================================================================

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Per-landmark, per-axis temporal median of the window
pub fn median_reference(positions: &VecDeque<MotionField>) -> MotionField {
    let width = positions.iter().map(Vec::len).max().unwrap_or(0);
    let mut axis = Vec::with_capacity(positions.len());

    (0..width)
        .map(|i| {
            let mut reference = Vector3::zeros();
            for k in 0..3 {
                axis.clear();
                axis.extend(positions.iter().filter_map(|field| {
                    field.get(i).copied().flatten().map(|p| p[k])
                }));
                reference[k] = median(&mut axis)?;
            }
            Some(reference)
        })
        .collect()
}

fn deviation(point: &Option<Vector3<f64>>, reference: &MotionField, index: usize) -> Option<f64> {
    match (point, reference.get(index).copied().flatten()) {
        (Some(p), Some(r)) => Some((p - r).norm()),
        _ => None,
    }
}

/// Mean weighted distance of each frame from the temporal median frame.
/// Needs at least two frames.
pub fn position_deviation(
    positions: &VecDeque<MotionField>,
    weights: &LandmarkWeights,
) -> Option<f64> {
    if positions.len() < 2 {
        return None;
    }
    let reference = median_reference(positions);

    let per_frame: Vec<f64> = positions
        .iter()
        .filter_map(|field| {
            weighted_mean(weights.weighted().filter_map(|(id, w)| {
                field
                    .get(id.index())
                    .and_then(|p| deviation(p, &reference, id.index()))
                    .map(|d| (w, d))
            }))
        })
        .collect();

    mean(&per_frame)
}

// ============================================================================
// VELOCITY / ACCELERATION
// ============================================================================

/// Mean over the window of each field's weighted magnitude
pub fn mean_motion(fields: &VecDeque<MotionField>, weights: &LandmarkWeights) -> Option<f64> {
    let per_frame: Vec<f64> = fields
        .iter()
        .filter_map(|field| weighted_magnitude(field, weights))
        .collect();
    mean(&per_frame)
}

// ============================================================================
// ANGULAR
// ============================================================================

fn joint_angle(field: &MotionField, joint: (LandmarkId, LandmarkId, LandmarkId)) -> Option<f64> {
    let point = |id: LandmarkId| field.get(id.index()).copied().flatten().map(|p| p.xy());
    let angle = angle_deg(&point(joint.0)?, &point(joint.1)?, &point(joint.2)?);
    angle.is_finite().then_some(angle)
}

fn variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Mean variance (deg²) of the tracked joint angles across the window.
///
/// Joints with fewer than two defined angles are skipped; degenerate
/// angles (coincident points) are NaN and never counted.
pub fn angle_variance(positions: &VecDeque<MotionField>) -> Option<f64> {
    let per_joint: Vec<f64> = JOINT_ANGLES
        .iter()
        .filter_map(|joint| {
            let angles: Vec<f64> = positions
                .iter()
                .filter_map(|field| joint_angle(field, *joint))
                .collect();
            if angles.len() < 2 {
                None
            } else {
                variance(&angles)
            }
        })
        .collect();
    mean(&per_joint)
}

// ============================================================================
// PER-LANDMARK
// ============================================================================

/// Score each weighted landmark on its own deviation and speed
pub fn landmark_scores(
    history: &StabilityHistory,
    weights: &LandmarkWeights,
    position_threshold: f64,
    velocity_threshold: f64,
) -> Vec<LandmarkScore> {
    let positions = history.positions();
    let reference = median_reference(positions);

    weights
        .weighted()
        .filter_map(|(id, _)| {
            let i = id.index();
            let deviations: Vec<f64> = positions
                .iter()
                .filter_map(|field| field.get(i).and_then(|p| deviation(p, &reference, i)))
                .collect();
            let speeds: Vec<f64> = history
                .velocities()
                .iter()
                .filter_map(|field| field.get(i).copied().flatten().map(|v| v.norm()))
                .collect();

            let parts: Vec<f64> = [
                mean(&deviations).map(|d| unit_score(d, position_threshold)),
                mean(&speeds).map(|s| unit_score(s, velocity_threshold)),
            ]
            .into_iter()
            .flatten()
            .collect();

            mean(&parts).map(|score| LandmarkScore { landmark: id, score })
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
