//! One timestamped snapshot of a subject's landmarks

use serde::{Deserialize, Serialize};

use super::landmark::{Landmark, LandmarkId, LANDMARK_COUNT};

/// Landmarks for one detector inference.
///
/// `landmarks[i]` is always `LandmarkId::from_index(i)`. Detectors may
/// deliver fewer than 33 points; missing indices are simply absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseFrame {
    pub landmarks: Vec<Landmark>,
    /// Monotonic capture time (ms)
    pub timestamp_ms: f64,
    /// Detector inference time (ms), diagnostic only
    pub inference_time_ms: f64,
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>, timestamp_ms: f64) -> Self {
        Self {
            landmarks,
            timestamp_ms,
            inference_time_ms: 0.0,
        }
    }

    pub fn with_inference_time(mut self, inference_time_ms: f64) -> Self {
        self.inference_time_ms = inference_time_ms;
        self
    }

    pub fn landmark(&self, id: LandmarkId) -> Option<&Landmark> {
        self.landmarks.get(id.index())
    }

    /// Landmark only if its coordinates are finite
    pub fn finite_landmark(&self, id: LandmarkId) -> Option<&Landmark> {
        self.landmark(id).filter(|lm| lm.is_finite())
    }

    /// Iterate `(id, landmark)` over the indices this frame carries.
    /// Points beyond the canonical layout are ignored.
    pub fn iter(&self) -> impl Iterator<Item = (LandmarkId, &Landmark)> {
        LandmarkId::ALL.iter().copied().zip(self.landmarks.iter())
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Carries exactly the canonical 33 points
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() == LANDMARK_COUNT
    }

    pub fn timestamp_sec(&self) -> f64 {
        self.timestamp_ms / 1000.0
    }
}
