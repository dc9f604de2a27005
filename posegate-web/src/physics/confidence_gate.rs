//! Confidence Gate - first layer of the stability stack
//!
//! Scores how trustworthy a whole frame is. When the weighted
//! visibility/presence falls below the floor, nothing downstream should
//! compute metrics on it.

use crate::pose::{LandmarkWeights, PoseFrame};

/// Weighted confidence of one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameConfidence {
    /// Weighted mean of `min(visibility, presence)` over usable landmarks
    pub score: f64,
    /// Weighted landmarks present with finite coordinates
    pub usable_landmarks: usize,
}

/// Frame-level confidence gate
#[derive(Clone, Debug)]
pub struct ConfidenceGate {
    /// Minimum weighted confidence to accept a frame
    threshold: f64,
}

impl ConfidenceGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Assess a frame.
    ///
    /// Landmarks missing from a short frame, or with NaN/infinite
    /// coordinates, don't take part. A frame with no usable weighted
    /// landmark scores zero.
    pub fn assess(&self, frame: &PoseFrame, weights: &LandmarkWeights) -> FrameConfidence {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        let mut usable_landmarks = 0;

        for (id, w) in weights.weighted() {
            if let Some(lm) = frame.finite_landmark(id) {
                weighted += w * lm.confidence();
                total_weight += w;
                usable_landmarks += 1;
            }
        }

        let score = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        };

        FrameConfidence {
            score,
            usable_landmarks,
        }
    }

    /// Frame passes if its weighted confidence reaches the threshold
    pub fn passes(&self, confidence: &FrameConfidence) -> bool {
        confidence.usable_landmarks > 0 && confidence.score >= self.threshold
    }
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(0.5)
    }
}
