//! Landmark transfer between JS and the pipeline
//!
//! Frames arrive as a flat Float32Array, 5 values per landmark:
//! x, y, z, visibility, presence. Smoothed landmarks go back out in the
//! same layout.

use log::warn;
use wasm_bindgen::prelude::*;

use super::session::SESSION;
use crate::pose::{Landmark, PoseFrame, TORSO_SKELETON};

/// Floats per landmark on the wire
pub const LANDMARK_STRIDE: usize = 5;

/// Decode a flat buffer into a frame. `None` if the length is not a
/// multiple of the stride.
pub fn decode_frame(data: &[f32], timestamp_ms: f64, inference_time_ms: f64) -> Option<PoseFrame> {
    if data.len() % LANDMARK_STRIDE != 0 {
        return None;
    }
    let landmarks = data
        .chunks_exact(LANDMARK_STRIDE)
        .map(|c| {
            Landmark::new(c[0] as f64, c[1] as f64, c[2] as f64)
                .with_confidence(c[3] as f64, c[4] as f64)
        })
        .collect();
    Some(PoseFrame::new(landmarks, timestamp_ms).with_inference_time(inference_time_ms))
}

/// Inverse of `decode_frame` (timestamps travel separately)
pub fn encode_landmarks(landmarks: &[Landmark]) -> Vec<f32> {
    landmarks
        .iter()
        .flat_map(|lm| {
            [
                lm.x as f32,
                lm.y as f32,
                lm.z as f32,
                lm.visibility as f32,
                lm.presence as f32,
            ]
        })
        .collect()
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Called from JavaScript once per detector result.
/// Returns true when a new, non-duplicate stable pose is waiting in
/// `takeStablePoseEvent()`.
#[wasm_bindgen(js_name = updateLandmarks)]
pub fn update_landmarks(data: &[f32], timestamp_ms: f64, inference_time_ms: f64) -> bool {
    let Some(frame) = decode_frame(data, timestamp_ms, inference_time_ms) else {
        warn!(
            "Invalid landmark data length: {} (expected a multiple of {})",
            data.len(),
            LANDMARK_STRIDE
        );
        return false;
    };

    SESSION.with(|cell| cell.borrow_mut().process(&frame))
}

/// Smoothed landmarks of the latest frame, empty before the first one
#[wasm_bindgen(js_name = getSmoothedLandmarks)]
pub fn get_smoothed_landmarks() -> Vec<f32> {
    SESSION.with(|cell| {
        cell.borrow()
            .pipeline
            .latest_overlay()
            .map(|overlay| encode_landmarks(&overlay.landmarks))
            .unwrap_or_default()
    })
}

/// Skeleton connections as flat index pairs for overlay drawing
#[wasm_bindgen(js_name = getSkeletonConnections)]
pub fn get_skeleton_connections() -> Vec<u8> {
    TORSO_SKELETON
        .iter()
        .flat_map(|(a, b)| [*a as u8, *b as u8])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::LandmarkId;

    #[test]
    fn test_decode_five_floats_per_landmark() {
        let data = [0.1, 0.2, 0.3, 0.9, 0.8, 0.4, 0.5, 0.6, 1.0, 1.0];
        let frame = decode_frame(&data, 100.0, 7.0).unwrap();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.timestamp_ms, 100.0);
        assert_eq!(frame.inference_time_ms, 7.0);
        let nose = frame.landmark(LandmarkId::Nose).unwrap();
        assert!((nose.visibility - 0.9).abs() < 1e-6);
        assert!((nose.presence - 0.8).abs() < 1e-6);
        assert!((frame.landmarks[1].x - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_decode_rejects_ragged_buffer() {
        assert!(decode_frame(&[0.0; 7], 0.0, 0.0).is_none());
        assert_eq!(decode_frame(&[], 0.0, 0.0).map(|f| f.len()), Some(0));
    }

    #[test]
    fn test_encode_matches_decode_layout() {
        let data = [0.25, 0.5, -0.125, 1.0, 0.5];
        let frame = decode_frame(&data, 0.0, 0.0).unwrap();
        assert_eq!(encode_landmarks(&frame.landmarks), data.to_vec());
    }

    #[test]
    fn test_skeleton_pairs() {
        let pairs = get_skeleton_connections();
        assert_eq!(pairs.len(), TORSO_SKELETON.len() * 2);
        assert_eq!(&pairs[..2], &[11, 12]);
    }
}
