//! Landmark identity and per-point data
//!
//! Indices follow the MediaPipe Pose layout (33 points). `LandmarkId` is a
//! closed enum so lookups into fixed-size tables never go out of bounds.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Number of points in the canonical skeleton
pub const LANDMARK_COUNT: usize = 33;

// ============================================================================
// LANDMARK IDENTITY
// ============================================================================

/// Anatomical landmark, discriminant equals the MediaPipe index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum LandmarkId {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkId {
    /// Every landmark in index order
    pub const ALL: [LandmarkId; LANDMARK_COUNT] = [
        LandmarkId::Nose,
        LandmarkId::LeftEyeInner,
        LandmarkId::LeftEye,
        LandmarkId::LeftEyeOuter,
        LandmarkId::RightEyeInner,
        LandmarkId::RightEye,
        LandmarkId::RightEyeOuter,
        LandmarkId::LeftEar,
        LandmarkId::RightEar,
        LandmarkId::MouthLeft,
        LandmarkId::MouthRight,
        LandmarkId::LeftShoulder,
        LandmarkId::RightShoulder,
        LandmarkId::LeftElbow,
        LandmarkId::RightElbow,
        LandmarkId::LeftWrist,
        LandmarkId::RightWrist,
        LandmarkId::LeftPinky,
        LandmarkId::RightPinky,
        LandmarkId::LeftIndex,
        LandmarkId::RightIndex,
        LandmarkId::LeftThumb,
        LandmarkId::RightThumb,
        LandmarkId::LeftHip,
        LandmarkId::RightHip,
        LandmarkId::LeftKnee,
        LandmarkId::RightKnee,
        LandmarkId::LeftAnkle,
        LandmarkId::RightAnkle,
        LandmarkId::LeftHeel,
        LandmarkId::RightHeel,
        LandmarkId::LeftFootIndex,
        LandmarkId::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            LandmarkId::Nose => "nose",
            LandmarkId::LeftEyeInner => "left_eye_inner",
            LandmarkId::LeftEye => "left_eye",
            LandmarkId::LeftEyeOuter => "left_eye_outer",
            LandmarkId::RightEyeInner => "right_eye_inner",
            LandmarkId::RightEye => "right_eye",
            LandmarkId::RightEyeOuter => "right_eye_outer",
            LandmarkId::LeftEar => "left_ear",
            LandmarkId::RightEar => "right_ear",
            LandmarkId::MouthLeft => "mouth_left",
            LandmarkId::MouthRight => "mouth_right",
            LandmarkId::LeftShoulder => "left_shoulder",
            LandmarkId::RightShoulder => "right_shoulder",
            LandmarkId::LeftElbow => "left_elbow",
            LandmarkId::RightElbow => "right_elbow",
            LandmarkId::LeftWrist => "left_wrist",
            LandmarkId::RightWrist => "right_wrist",
            LandmarkId::LeftPinky => "left_pinky",
            LandmarkId::RightPinky => "right_pinky",
            LandmarkId::LeftIndex => "left_index",
            LandmarkId::RightIndex => "right_index",
            LandmarkId::LeftThumb => "left_thumb",
            LandmarkId::RightThumb => "right_thumb",
            LandmarkId::LeftHip => "left_hip",
            LandmarkId::RightHip => "right_hip",
            LandmarkId::LeftKnee => "left_knee",
            LandmarkId::RightKnee => "right_knee",
            LandmarkId::LeftAnkle => "left_ankle",
            LandmarkId::RightAnkle => "right_ankle",
            LandmarkId::LeftHeel => "left_heel",
            LandmarkId::RightHeel => "right_heel",
            LandmarkId::LeftFootIndex => "left_foot_index",
            LandmarkId::RightFootIndex => "right_foot_index",
        }
    }
}

/// Torso and leg connections used for overlay rendering
pub const TORSO_SKELETON: [(LandmarkId, LandmarkId); 8] = [
    (LandmarkId::LeftShoulder, LandmarkId::RightShoulder),
    (LandmarkId::LeftShoulder, LandmarkId::LeftHip),
    (LandmarkId::RightShoulder, LandmarkId::RightHip),
    (LandmarkId::LeftHip, LandmarkId::RightHip),
    (LandmarkId::LeftHip, LandmarkId::LeftKnee),
    (LandmarkId::RightHip, LandmarkId::RightKnee),
    (LandmarkId::LeftKnee, LandmarkId::LeftAnkle),
    (LandmarkId::RightKnee, LandmarkId::RightAnkle),
];

// ============================================================================
// LANDMARK DATA STRUCTURE
// ============================================================================

/// A single 3D landmark point as produced by the detector
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64, // 0-1 normalized
    pub y: f64, // 0-1 normalized
    pub z: f64, // Relative depth
    /// Probability the point is inside the frame
    pub visibility: f64,
    /// Probability the point exists at all (not occluded)
    pub presence: f64,
}

impl Default for Landmark {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            visibility: 0.0,
            presence: 0.0,
        }
    }
}

impl Landmark {
    /// Fully confident landmark at the given position
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility: 1.0,
            presence: 1.0,
        }
    }

    pub fn with_confidence(mut self, visibility: f64, presence: f64) -> Self {
        self.visibility = visibility;
        self.presence = presence;
        self
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// All coordinates finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Joint confidence: the weaker of visibility and presence.
    /// Non-finite confidence values count as zero.
    pub fn confidence(&self) -> f64 {
        if !self.visibility.is_finite() || !self.presence.is_finite() {
            return 0.0;
        }
        self.visibility.min(self.presence).clamp(0.0, 1.0)
    }
}
