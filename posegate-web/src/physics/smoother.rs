//! Landmark smoother - One Euro filter set for a whole skeleton
//!
//! Three filters (x, y, z) per landmark. When a landmark drops below the
//! visibility floor or carries non-finite coordinates its filters are
//! reset and the raw point passes through untouched.

use serde::{Deserialize, Serialize};

use super::one_euro::{OneEuroConfig, OneEuroFilter};
use crate::error::{ensure_unit, ConfigError};
use crate::pose::{Landmark, LandmarkId, PoseFrame, LANDMARK_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SmootherConfig {
    pub filter: OneEuroConfig,
    /// Minimum confidence to keep filtering a landmark
    pub min_visibility: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            filter: OneEuroConfig::default(),
            min_visibility: 0.5,
        }
    }
}

impl SmootherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter.validate()?;
        ensure_unit("min_visibility", self.min_visibility)
    }
}

/// Filters for one landmark's three axes
#[derive(Clone, Debug)]
struct AxisFilters {
    x: OneEuroFilter,
    y: OneEuroFilter,
    z: OneEuroFilter,
}

impl AxisFilters {
    fn new(config: OneEuroConfig) -> Self {
        Self {
            x: OneEuroFilter::with_valid_config(config),
            y: OneEuroFilter::with_valid_config(config),
            z: OneEuroFilter::with_valid_config(config),
        }
    }

    fn filter(&mut self, t: f64, lm: &Landmark) -> Landmark {
        Landmark {
            x: self.x.filter(lm.x, t),
            y: self.y.filter(lm.y, t),
            z: self.z.filter(lm.z, t),
            ..*lm
        }
    }

    fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }

    fn is_initialized(&self) -> bool {
        self.x.is_initialized()
    }
}

/// Per-landmark jitter reduction for one tracked subject
#[derive(Clone, Debug)]
pub struct LandmarkSmoother {
    config: SmootherConfig,
    filters: [AxisFilters; LANDMARK_COUNT],
}

impl LandmarkSmoother {
    pub fn new(config: SmootherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            filters: std::array::from_fn(|_| AxisFilters::new(config.filter)),
        })
    }

    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    /// Smooth every landmark of `frame`, returning a frame of the same length
    pub fn smooth(&mut self, frame: &PoseFrame) -> PoseFrame {
        let t = frame.timestamp_sec();
        let mut landmarks = frame.landmarks.clone();

        for (id, filters) in LandmarkId::ALL.iter().zip(self.filters.iter_mut()) {
            match landmarks.get_mut(id.index()) {
                Some(lm) if lm.is_finite() && lm.confidence() >= self.config.min_visibility => {
                    *lm = filters.filter(t, lm);
                }
                // Lost, occluded or absent: tracking restarts on reappearance
                _ => filters.reset(),
            }
        }

        PoseFrame {
            landmarks,
            timestamp_ms: frame.timestamp_ms,
            inference_time_ms: frame.inference_time_ms,
        }
    }

    /// Whether the landmark currently has filter state
    pub fn is_tracking(&self, id: LandmarkId) -> bool {
        self.filters[id.index()].is_initialized()
    }

    pub fn reset(&mut self) {
        for filters in self.filters.iter_mut() {
            filters.reset();
        }
    }
}

impl Default for LandmarkSmoother {
    fn default() -> Self {
        let config = SmootherConfig::default();
        Self {
            config,
            filters: std::array::from_fn(|_| AxisFilters::new(config.filter)),
        }
    }
}
