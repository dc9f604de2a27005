//! Stability classifier - decides when a held pose is worth acting on
//!
//! Phases: `Cold` (no history) → `Warming` (history accumulating) →
//! `Unstable` ⇄ `Stable`. `just_triggered` fires once per stable episode,
//! on the frame where accumulated stable time first reaches the window
//! and the trigger cooldown allows it. Returning to `Unstable` re-arms.

use log::{debug, info, warn};
use serde::Serialize;

use super::config::StabilityConfig;
use super::history::StabilityHistory;
use super::metrics::{
    angle_variance, landmark_scores, mean_motion, position_deviation, LandmarkScore, SubScore,
};
use crate::error::ConfigError;
use crate::physics::{ConfidenceGate, FrameConfidence};
use crate::pose::{PoseFrame, LANDMARK_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StabilityPhase {
    /// No usable frame yet
    Cold,
    /// Fewer than `min_history` frames
    Warming,
    /// Scored below threshold
    Unstable,
    /// Scored at or above threshold
    Stable,
}

/// Breakdown behind a stability score
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityMetrics {
    pub position: Option<SubScore>,
    pub velocity: Option<SubScore>,
    pub acceleration: Option<SubScore>,
    pub angular: Option<SubScore>,
    pub landmark_scores: Vec<LandmarkScore>,
    /// Continuous stable time in the current episode (s)
    pub stable_time_sec: f64,
    /// Weighted visibility/presence of the frame
    pub confidence: f64,
    pub history_len: usize,
}

/// Outcome of one `update()` call
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityResult {
    pub is_stable: bool,
    /// True on exactly one frame per stable episode
    pub just_triggered: bool,
    /// Overall score in [0, 1]
    pub stability_score: f64,
    pub phase: StabilityPhase,
    pub metrics: StabilityMetrics,
}

/// Stateful classifier for one tracked subject
#[derive(Clone, Debug)]
pub struct StabilityClassifier {
    config: StabilityConfig,
    gate: ConfidenceGate,
    history: StabilityHistory,
    phase: StabilityPhase,
    last_timestamp_ms: Option<f64>,
    stable_time_sec: f64,
    /// Trigger already fired in the current episode
    episode_triggered: bool,
    last_trigger_ms: Option<f64>,
    last_landmark_count: usize,
}

impl StabilityClassifier {
    pub fn new(config: StabilityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            gate: ConfidenceGate::new(config.min_confidence),
            history: StabilityHistory::new(config.history_capacity),
            phase: StabilityPhase::Cold,
            last_timestamp_ms: None,
            stable_time_sec: 0.0,
            episode_triggered: false,
            last_trigger_ms: None,
            last_landmark_count: LANDMARK_COUNT,
            config,
        })
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    pub fn phase(&self) -> StabilityPhase {
        self.phase
    }

    pub fn stable_time_sec(&self) -> f64 {
        self.stable_time_sec
    }

    pub fn history(&self) -> &StabilityHistory {
        &self.history
    }

    /// Forget everything, including the trigger cooldown
    pub fn reset(&mut self) {
        self.history.clear();
        self.phase = StabilityPhase::Cold;
        self.last_timestamp_ms = None;
        self.last_trigger_ms = None;
        self.end_episode();
    }

    /// Process one frame
    pub fn update(&mut self, frame: &PoseFrame) -> StabilityResult {
        self.check_layout(frame);
        let confidence = self.gate.assess(frame, &self.config.key_point_weights);

        let Some(last_ms) = self.last_timestamp_ms else {
            return self.start_session(frame, confidence);
        };

        let dt = (frame.timestamp_ms - last_ms) / 1000.0;
        if !dt.is_finite() || dt < 0.0 || dt > self.config.max_gap_sec {
            debug!(
                "Stability: {:.0} ms between frames, starting a new session",
                dt * 1000.0
            );
            self.reset();
            return self.start_session(frame, confidence);
        }

        if dt < self.config.min_frame_interval_sec {
            debug!("Stability: frame repeated after {:.3} ms, ignored", dt * 1000.0);
            self.end_episode();
            return self.unscored(confidence);
        }

        if !self.gate.passes(&confidence) {
            debug!(
                "Stability: frame confidence {:.2} below {:.2}",
                confidence.score,
                self.gate.threshold()
            );
            self.end_episode();
            return self.unscored(confidence);
        }

        self.history.push(frame.clone(), dt);
        self.last_timestamp_ms = Some(frame.timestamp_ms);

        let metrics = self.measure(confidence);

        if self.history.len() < self.config.min_history {
            self.phase = StabilityPhase::Warming;
            return self.result(0.0, false, metrics);
        }

        let Some(score) = self.blend(&metrics) else {
            // Nothing measurable on the weighted landmarks
            self.phase = StabilityPhase::Unstable;
            self.end_episode();
            return self.result(0.0, false, metrics);
        };

        let stable = score >= self.config.stability_score_threshold;
        if stable {
            self.stable_time_sec += dt;
            self.phase = StabilityPhase::Stable;
        } else {
            self.end_episode();
            self.phase = StabilityPhase::Unstable;
        }

        let just_triggered = stable
            && !self.episode_triggered
            && self.stable_time_sec >= self.config.window_sec
            && self.cooldown_elapsed(frame.timestamp_ms);

        if just_triggered {
            self.episode_triggered = true;
            self.last_trigger_ms = Some(frame.timestamp_ms);
            info!(
                "Stability: pose held {:.2}s (score {:.2}), triggering",
                self.stable_time_sec, score
            );
        }

        self.result(score, just_triggered, metrics)
    }

    fn start_session(&mut self, frame: &PoseFrame, confidence: FrameConfidence) -> StabilityResult {
        self.end_episode();
        if self.gate.passes(&confidence) {
            self.history.push(frame.clone(), 0.0);
            self.last_timestamp_ms = Some(frame.timestamp_ms);
            self.phase = StabilityPhase::Warming;
        } else {
            self.phase = StabilityPhase::Cold;
        }
        self.unscored(confidence)
    }

    /// Conservative result for a frame that was not scored
    fn unscored(&mut self, confidence: FrameConfidence) -> StabilityResult {
        if self.history.len() >= self.config.min_history {
            self.phase = StabilityPhase::Unstable;
        }
        let metrics = StabilityMetrics {
            confidence: confidence.score,
            history_len: self.history.len(),
            ..StabilityMetrics::default()
        };
        self.result(0.0, false, metrics)
    }

    fn result(&self, score: f64, just_triggered: bool, mut metrics: StabilityMetrics) -> StabilityResult {
        metrics.stable_time_sec = self.stable_time_sec;
        StabilityResult {
            is_stable: self.phase == StabilityPhase::Stable,
            just_triggered,
            stability_score: score,
            phase: self.phase,
            metrics,
        }
    }

    fn end_episode(&mut self) {
        self.stable_time_sec = 0.0;
        self.episode_triggered = false;
    }

    fn cooldown_elapsed(&self, now_ms: f64) -> bool {
        match self.last_trigger_ms {
            Some(last) => (now_ms - last) / 1000.0 >= self.config.trigger_cooldown_sec,
            None => true,
        }
    }

    fn check_layout(&mut self, frame: &PoseFrame) {
        let count = frame.len();
        if count != self.last_landmark_count {
            if count != LANDMARK_COUNT {
                warn!(
                    "Stability: frame carries {} landmarks (expected {}), scoring common indices only",
                    count, LANDMARK_COUNT
                );
            }
            self.last_landmark_count = count;
        }
    }

    fn measure(&self, confidence: FrameConfidence) -> StabilityMetrics {
        let config = &self.config;
        let weights = &config.key_point_weights;

        let position = position_deviation(self.history.positions(), weights)
            .map(|d| SubScore::new(d, config.position_threshold));
        let velocity = mean_motion(self.history.velocities(), weights)
            .map(|v| SubScore::new(v, config.velocity_threshold));

        let (acceleration, angular) = if config.advanced_metrics {
            (
                mean_motion(self.history.accelerations(), weights)
                    .map(|a| SubScore::new(a, config.acceleration_threshold)),
                angle_variance(self.history.positions())
                    .map(|v| SubScore::new(v, config.angle_threshold)),
            )
        } else {
            (None, None)
        };

        StabilityMetrics {
            position,
            velocity,
            acceleration,
            angular,
            landmark_scores: landmark_scores(
                &self.history,
                weights,
                config.position_threshold,
                config.velocity_threshold,
            ),
            stable_time_sec: self.stable_time_sec,
            confidence: confidence.score,
            history_len: self.history.len(),
        }
    }

    /// Weighted blend of the available sub-scores.
    ///
    /// Metrics that are undefined (e.g. knees never visible, so no joint
    /// angle) drop out and the remaining weights are renormalised.
    fn blend(&self, metrics: &StabilityMetrics) -> Option<f64> {
        let blend = self.config.blend();
        let parts = [
            (metrics.position, blend.position),
            (metrics.velocity, blend.velocity),
            (metrics.acceleration, blend.acceleration),
            (metrics.angular, blend.angular),
        ];

        let mut sum = 0.0;
        let mut total = 0.0;
        for (sub, weight) in parts {
            if let Some(sub) = sub {
                if weight > 0.0 {
                    sum += weight * sub.score;
                    total += weight;
                }
            }
        }
        (total > 0.0).then(|| (sum / total).clamp(0.0, 1.0))
    }
}

impl Default for StabilityClassifier {
    fn default() -> Self {
        let config = StabilityConfig::default();
        Self {
            gate: ConfidenceGate::new(config.min_confidence),
            history: StabilityHistory::new(config.history_capacity),
            phase: StabilityPhase::Cold,
            last_timestamp_ms: None,
            stable_time_sec: 0.0,
            episode_triggered: false,
            last_trigger_ms: None,
            last_landmark_count: LANDMARK_COUNT,
            config,
        }
    }
}
