//! Stability module - rolling history, sub-metrics and the hold classifier
//!
//! Re-exports only. All logic in submodules.

mod classifier;
mod config;
mod history;
mod metrics;

pub use classifier::{StabilityClassifier, StabilityMetrics, StabilityPhase, StabilityResult};
pub use config::{MetricBlend, StabilityConfig, ADVANCED_BLEND, MIN_HISTORY_FRAMES, SIMPLE_BLEND};
pub use history::StabilityHistory;
pub use metrics::{
    angle_variance, landmark_scores, mean_motion, median_reference, position_deviation,
    unit_score, LandmarkScore, SubScore, JOINT_ANGLES,
};
