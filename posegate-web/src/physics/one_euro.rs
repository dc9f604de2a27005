//! One Euro Filter - adaptive low-pass filter for jitter reduction
//!
//! Smooth when slow (reduces jitter), responsive when fast (tracks real
//! motion). One instance per tracked scalar: each landmark axis gets its own.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{below_minimum, ensure_positive, ConfigError};

/// Smallest time step used between samples (s). Repeated or backward
/// timestamps are clamped up to this.
pub const MIN_DT_SEC: f64 = 1e-6;

/// Filter parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct OneEuroConfig {
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    pub min_cutoff: f64,
    /// Speed coefficient - higher = less lag during fast motion
    pub beta: f64,
    /// Derivative cutoff frequency (Hz)
    pub d_cutoff: f64,
    /// Upper bound on the adaptive cutoff (Hz)
    pub max_cutoff: f64,
}

impl Default for OneEuroConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.5,
            d_cutoff: 1.0,
            max_cutoff: 30.0,
        }
    }
}

impl OneEuroConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("min_cutoff", self.min_cutoff)?;
        ensure_positive("d_cutoff", self.d_cutoff)?;
        ensure_positive("max_cutoff", self.max_cutoff)?;
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(below_minimum("beta", self.beta, "zero", 0.0));
        }
        if self.max_cutoff < self.min_cutoff {
            return Err(below_minimum(
                "max_cutoff",
                self.max_cutoff,
                "min_cutoff",
                self.min_cutoff,
            ));
        }
        Ok(())
    }
}

/// Adaptive low-pass filter: smooth at rest, responsive during motion
#[derive(Clone, Debug)]
pub struct OneEuroFilter {
    config: OneEuroConfig,

    // State
    x_prev: Option<f64>,
    dx_prev: f64,
    t_prev: Option<f64>,
}

impl OneEuroFilter {
    pub fn new(config: OneEuroConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    /// Caller guarantees `config` already passed `validate()`
    pub(crate) fn with_valid_config(config: OneEuroConfig) -> Self {
        Self {
            config,
            x_prev: None,
            dx_prev: 0.0,
            t_prev: None,
        }
    }

    pub fn config(&self) -> &OneEuroConfig {
        &self.config
    }

    /// Calculate smoothing factor alpha
    fn smoothing_factor(t_e: f64, cutoff: f64) -> f64 {
        let r = 2.0 * PI * cutoff * t_e;
        r / (r + 1.0)
    }

    /// Filter a single value
    ///
    /// - `x`: raw input value
    /// - `t`: timestamp in seconds
    ///
    /// Returns the filtered value. The first sample passes through.
    pub fn filter(&mut self, x: f64, t: f64) -> f64 {
        let (x_prev, t_prev) = match (self.x_prev, self.t_prev) {
            (Some(x_prev), Some(t_prev)) => (x_prev, t_prev),
            _ => {
                self.x_prev = Some(x);
                self.t_prev = Some(t);
                self.dx_prev = 0.0;
                return x;
            }
        };

        let t_e = {
            let dt = t - t_prev;
            if dt.is_finite() {
                dt.max(MIN_DT_SEC)
            } else {
                MIN_DT_SEC
            }
        };

        // 1. Estimate derivative (velocity)
        let a_d = Self::smoothing_factor(t_e, self.config.d_cutoff);
        let dx = (x - x_prev) / t_e;
        let dx_hat = a_d * dx + (1.0 - a_d) * self.dx_prev;

        // 2. Adaptive cutoff: more smoothing when slow, less when fast
        let cutoff = (self.config.min_cutoff + self.config.beta * dx_hat.abs())
            .min(self.config.max_cutoff);
        let a = Self::smoothing_factor(t_e, cutoff);

        // 3. Apply filter
        let x_hat = a * x + (1.0 - a) * x_prev;

        self.x_prev = Some(x_hat);
        self.dx_prev = dx_hat;
        self.t_prev = Some(t.max(t_prev));

        x_hat
    }

    /// Smoothed rate of change from the last call (units/s)
    pub fn derivative(&self) -> f64 {
        self.dx_prev
    }

    /// Last filtered value
    pub fn value(&self) -> Option<f64> {
        self.x_prev
    }

    pub fn is_initialized(&self) -> bool {
        self.x_prev.is_some()
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.x_prev = None;
        self.dx_prev = 0.0;
        self.t_prev = None;
    }
}

impl Default for OneEuroFilter {
    fn default() -> Self {
        Self::with_valid_config(OneEuroConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FPS: f64 = 30.0;

    fn jitter(i: usize, amplitude: f64) -> f64 {
        // Deterministic zero-mean noise
        let phase = i as f64;
        amplitude * (0.6 * (phase * 2.39).sin() + 0.4 * (phase * 5.17).cos())
    }

    fn variance(values: &[f64]) -> f64 {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
    }

    #[test]
    fn test_first_sample_passes_through() {
        let mut filter = OneEuroFilter::default();
        assert!(!filter.is_initialized());
        assert_eq!(filter.filter(0.42, 10.0), 0.42);
        assert!(filter.is_initialized());
    }

    #[test]
    fn test_reduces_jitter_variance() {
        let mut filter = OneEuroFilter::default();
        let mut raw = Vec::new();
        let mut filtered = Vec::new();
        for i in 0..300 {
            let x = 0.5 + jitter(i, 0.01);
            let y = filter.filter(x, i as f64 / FPS);
            // Skip the settling period
            if i >= 30 {
                raw.push(x);
                filtered.push(y);
            }
        }
        assert!(variance(&filtered) < 0.5 * variance(&raw));
    }

    #[test]
    fn test_step_reaches_90_percent_within_one_second() {
        let mut filter = OneEuroFilter::default();
        let (a, b) = (0.2, 0.8);
        for i in 0..30 {
            filter.filter(a, i as f64 / FPS);
        }
        let mut out = a;
        for i in 30..60 {
            out = filter.filter(b, i as f64 / FPS);
        }
        assert!((out - a) / (b - a) >= 0.9, "only reached {}", out);
    }

    #[test]
    fn test_repeated_and_backward_timestamps_stay_finite() {
        let mut filter = OneEuroFilter::default();
        filter.filter(0.5, 1.0);
        let same = filter.filter(0.6, 1.0);
        let back = filter.filter(0.4, 0.5);
        let big = filter.filter(1e6, 0.5);
        for v in [same, back, big] {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_never_produces_nan_for_finite_input() {
        let mut filter = OneEuroFilter::new(OneEuroConfig {
            beta: 50.0,
            ..OneEuroConfig::default()
        })
        .unwrap();
        let mut t = 0.0;
        for i in 0..1000 {
            // Irregular spacing including zero steps
            t += [0.0, 0.001, 0.033, 0.2][i % 4];
            let x = if i % 7 == 0 { -1e3 } else { 1e3 } * jitter(i, 1.0);
            assert!(filter.filter(x, t).is_finite());
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = OneEuroFilter::default();
        filter.filter(0.1, 0.0);
        filter.filter(0.2, 0.1);
        filter.reset();
        assert!(!filter.is_initialized());
        assert_eq!(filter.derivative(), 0.0);
        assert_eq!(filter.filter(0.9, 0.2), 0.9);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let bad = OneEuroConfig {
            min_cutoff: 0.0,
            ..OneEuroConfig::default()
        };
        assert!(OneEuroFilter::new(bad).is_err());

        let bad = OneEuroConfig {
            beta: -1.0,
            ..OneEuroConfig::default()
        };
        assert!(OneEuroFilter::new(bad).is_err());

        let bad = OneEuroConfig {
            max_cutoff: 0.5,
            ..OneEuroConfig::default()
        };
        assert!(OneEuroFilter::new(bad).is_err());
    }
}
