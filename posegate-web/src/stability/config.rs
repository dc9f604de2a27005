//! Stability classifier configuration
//!
//! Immutable once handed to a classifier. `validate()` runs at
//! construction so bad thresholds never reach the frame stream.

use serde::{Deserialize, Serialize};

use crate::error::{below_minimum, ensure_positive, ensure_unit, ConfigError};
use crate::pose::LandmarkWeights;

/// Frames needed before acceleration (a second difference) exists
pub const MIN_HISTORY_FRAMES: usize = 3;

/// Blend weights when all four metrics are enabled
pub const ADVANCED_BLEND: MetricBlend = MetricBlend {
    position: 0.3,
    velocity: 0.3,
    acceleration: 0.2,
    angular: 0.2,
};

/// Blend weights for the position/velocity-only preset
pub const SIMPLE_BLEND: MetricBlend = MetricBlend {
    position: 0.6,
    velocity: 0.4,
    acceleration: 0.0,
    angular: 0.0,
};

/// Relative contribution of each sub-score to the overall score
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricBlend {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub angular: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StabilityConfig {
    /// Continuous stable time required before triggering (s)
    pub window_sec: f64,
    /// Mean deviation from the temporal median (normalized units)
    pub position_threshold: f64,
    /// Mean landmark speed (units/s)
    pub velocity_threshold: f64,
    /// Mean landmark acceleration (units/s²)
    pub acceleration_threshold: f64,
    /// Joint-angle variance (deg²)
    pub angle_threshold: f64,
    pub key_point_weights: LandmarkWeights,
    /// Frames in history before a score is produced
    pub min_history: usize,
    /// Ring buffer length (frames)
    pub history_capacity: usize,
    /// Overall score needed to count as stable
    pub stability_score_threshold: f64,
    /// Acceleration and angular metrics on (0.3/0.3/0.2/0.2) or off (0.6/0.4)
    pub advanced_metrics: bool,
    /// Weighted visibility/presence floor for a frame to be scored
    pub min_confidence: f64,
    /// Frames closer together than this are ignored (s)
    pub min_frame_interval_sec: f64,
    /// Larger gaps start a new session (s)
    pub max_gap_sec: f64,
    /// Minimum time between two triggers (s)
    pub trigger_cooldown_sec: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window_sec: 1.0,
            position_threshold: 0.03,
            velocity_threshold: 0.25,
            acceleration_threshold: 8.0,
            angle_threshold: 25.0,
            key_point_weights: LandmarkWeights::default(),
            min_history: 5,
            history_capacity: 30,
            stability_score_threshold: 0.75,
            advanced_metrics: true,
            min_confidence: 0.5,
            min_frame_interval_sec: 0.001,
            max_gap_sec: 1.0,
            trigger_cooldown_sec: 1.0,
        }
    }
}

impl StabilityConfig {
    /// All four metrics (same as `default()`)
    pub fn advanced() -> Self {
        Self::default()
    }

    /// Position and velocity only, blended 0.6/0.4
    pub fn simple() -> Self {
        Self {
            advanced_metrics: false,
            ..Self::default()
        }
    }

    pub fn blend(&self) -> MetricBlend {
        if self.advanced_metrics {
            ADVANCED_BLEND
        } else {
            SIMPLE_BLEND
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("window_sec", self.window_sec)?;
        ensure_positive("position_threshold", self.position_threshold)?;
        ensure_positive("velocity_threshold", self.velocity_threshold)?;
        ensure_positive("acceleration_threshold", self.acceleration_threshold)?;
        ensure_positive("angle_threshold", self.angle_threshold)?;
        ensure_unit("stability_score_threshold", self.stability_score_threshold)?;
        ensure_unit("min_confidence", self.min_confidence)?;
        ensure_positive("min_frame_interval_sec", self.min_frame_interval_sec)?;
        ensure_positive("max_gap_sec", self.max_gap_sec)?;

        if self.max_gap_sec <= self.min_frame_interval_sec {
            return Err(below_minimum(
                "max_gap_sec",
                self.max_gap_sec,
                "min_frame_interval_sec",
                self.min_frame_interval_sec,
            ));
        }
        if !self.trigger_cooldown_sec.is_finite() || self.trigger_cooldown_sec < 0.0 {
            return Err(below_minimum(
                "trigger_cooldown_sec",
                self.trigger_cooldown_sec,
                "zero",
                0.0,
            ));
        }

        let required = self.min_history.max(MIN_HISTORY_FRAMES);
        if self.min_history < MIN_HISTORY_FRAMES || self.history_capacity < required {
            return Err(ConfigError::HistoryTooSmall {
                capacity: self.history_capacity,
                min_history: self.min_history,
                required,
            });
        }

        self.key_point_weights.validate()
    }
}
