//! Physics module - signal filtering, geometry and motion derivatives
//!
//! Re-exports only. All logic in submodules.

mod confidence_gate;
mod geometry;
mod one_euro;
mod smoother;
mod velocity;

pub use confidence_gate::{ConfidenceGate, FrameConfidence};
pub use geometry::{
    angle_between, angle_deg, distance, dot, magnitude, magnitude_squared, normalize,
    DEGENERATE_EPSILON,
};
pub use one_euro::{OneEuroConfig, OneEuroFilter, MIN_DT_SEC};
pub use smoother::{LandmarkSmoother, SmootherConfig};
pub use velocity::{finite_difference, positions, weighted_magnitude, weighted_mean, MotionField};
