//! Pose data model - landmarks, frames and per-landmark weights
//!
//! Re-exports only. All logic in submodules.

mod frame;
mod landmark;
mod weights;

pub use frame::PoseFrame;
pub use landmark::{Landmark, LandmarkId, LANDMARK_COUNT, TORSO_SKELETON};
pub use weights::LandmarkWeights;
