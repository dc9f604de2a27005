//! Per-subject processing pipeline
//!
//! raw frame → `LandmarkSmoother` → `StabilityClassifier` →
//! `DuplicatePoseSuppressor` → `StablePoseEvent`.
//!
//! One `PosePipeline` per tracked subject. Components never touch each
//! other's state; the pipeline only forwards values between them.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::dedup::{DedupConfig, DuplicatePoseSuppressor, PoseFingerprint};
use crate::error::ConfigError;
use crate::physics::{LandmarkSmoother, SmootherConfig};
use crate::pose::{Landmark, PoseFrame};
use crate::stability::{StabilityClassifier, StabilityConfig, StabilityPhase, StabilityResult};

/// Whole configuration surface for one subject.
///
/// Nested by stage, camelCase, every field optional:
/// `{ smoother: { filter: { minCutoff, beta, dCutoff, maxCutoff }, minVisibility },
///    stability: { windowSec, positionThreshold, ..., keyPointWeights },
///    dedup: { cooldownMs | dedupCooldownMs, quantizationStep, landmarks },
///    smoothingEnabled }`.
/// Unknown keys, including stage options given at the top level, are
/// rejected rather than dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub smoother: SmootherConfig,
    pub stability: StabilityConfig,
    pub dedup: DedupConfig,
    /// Feed smoothed landmarks to the classifier (raw otherwise).
    /// The default stability thresholds are tuned for smoothed input; raw
    /// detector jitter usually keeps the velocity and acceleration scores
    /// too low to trigger unless the thresholds are raised as well.
    pub smoothing_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            smoother: SmootherConfig::default(),
            stability: StabilityConfig::default(),
            dedup: DedupConfig::default(),
            smoothing_enabled: true,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.smoother.validate()?;
        self.stability.validate()?;
        self.dedup.validate()
    }
}

/// Emitted once per stability trigger
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StablePoseEvent {
    /// The frame that completed the hold (smoothed if smoothing is on)
    pub frame: PoseFrame,
    pub stability: StabilityResult,
    pub fingerprint: PoseFingerprint,
    /// False when the pose repeats a recent trigger
    pub allowed: bool,
}

/// Latest values for a skeleton overlay / status indicator
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySnapshot {
    pub landmarks: Vec<Landmark>,
    pub timestamp_ms: f64,
    pub stability_score: f64,
    pub is_stable: bool,
    pub phase: StabilityPhase,
}

#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub smoothed: PoseFrame,
    pub stability: StabilityResult,
    pub event: Option<StablePoseEvent>,
}

pub struct PosePipeline {
    config: PipelineConfig,
    smoother: LandmarkSmoother,
    classifier: StabilityClassifier,
    dedup: DuplicatePoseSuppressor,
    last_timestamp_ms: Option<f64>,
    overlay: Option<OverlaySnapshot>,
}

impl PosePipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            smoother: LandmarkSmoother::new(config.smoother)?,
            classifier: StabilityClassifier::new(config.stability.clone())?,
            dedup: DuplicatePoseSuppressor::new(config.dedup.clone())?,
            last_timestamp_ms: None,
            overlay: None,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &StabilityClassifier {
        &self.classifier
    }

    pub fn dedup(&self) -> &DuplicatePoseSuppressor {
        &self.dedup
    }

    /// Run one frame through every stage
    pub fn update(&mut self, frame: &PoseFrame) -> PipelineOutput {
        self.guard_time(frame.timestamp_ms);

        let smoothed = if self.config.smoothing_enabled {
            self.smoother.smooth(frame)
        } else {
            frame.clone()
        };

        let stability = self.classifier.update(&smoothed);

        let event = stability.just_triggered.then(|| {
            let decision = self.dedup.check(&smoothed);
            if decision.allowed {
                info!(
                    "Pipeline: stable pose {} at {:.0} ms",
                    decision.fingerprint, smoothed.timestamp_ms
                );
            }
            StablePoseEvent {
                frame: smoothed.clone(),
                stability: stability.clone(),
                fingerprint: decision.fingerprint,
                allowed: decision.allowed,
            }
        });

        self.overlay = Some(OverlaySnapshot {
            landmarks: smoothed.landmarks.clone(),
            timestamp_ms: smoothed.timestamp_ms,
            stability_score: stability.stability_score,
            is_stable: stability.is_stable,
            phase: stability.phase,
        });

        PipelineOutput {
            smoothed,
            stability,
            event,
        }
    }

    /// Most recent overlay values, `None` before the first frame
    pub fn latest_overlay(&self) -> Option<&OverlaySnapshot> {
        self.overlay.as_ref()
    }

    pub fn reset(&mut self) {
        self.smoother.reset();
        self.classifier.reset();
        self.dedup.reset();
        self.last_timestamp_ms = None;
        self.overlay = None;
    }

    /// Restart filter state on the same conditions that restart a
    /// stability session
    fn guard_time(&mut self, timestamp_ms: f64) {
        if let Some(last) = self.last_timestamp_ms {
            let dt = (timestamp_ms - last) / 1000.0;
            if !dt.is_finite() || dt < 0.0 || dt > self.config.stability.max_gap_sec {
                debug!("Pipeline: timestamp discontinuity, smoother reset");
                self.smoother.reset();
            }
        }
        if timestamp_ms.is_finite() {
            self.last_timestamp_ms = Some(timestamp_ms);
        }
    }
}

impl Default for PosePipeline {
    fn default() -> Self {
        let config = PipelineConfig::default();
        Self {
            smoother: LandmarkSmoother::default(),
            classifier: StabilityClassifier::default(),
            dedup: DuplicatePoseSuppressor::default(),
            last_timestamp_ms: None,
            overlay: None,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::LANDMARK_COUNT;

    fn frame(x: f64, t_ms: f64) -> PoseFrame {
        let landmarks = (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(x + i as f64 * 0.01, 0.2 + i as f64 * 0.02, 0.0))
            .collect();
        PoseFrame::new(landmarks, t_ms)
    }

    #[test]
    fn test_overlay_empty_before_first_frame() {
        let pipeline = PosePipeline::default();
        assert!(pipeline.latest_overlay().is_none());
    }

    #[test]
    fn test_held_pose_emits_one_allowed_event() {
        let mut pipeline = PosePipeline::default();
        let events: Vec<StablePoseEvent> = (0..80)
            .filter_map(|i| pipeline.update(&frame(0.3, i as f64 * 33.0)).event)
            .collect();

        assert_eq!(events.len(), 1);
        assert!(events[0].allowed);
        assert!(events[0].stability.just_triggered);
        assert!(pipeline.dedup().last_record().is_some());

        let overlay = pipeline.latest_overlay().unwrap();
        assert!(overlay.is_stable);
        assert_eq!(overlay.landmarks.len(), LANDMARK_COUNT);
    }

    #[test]
    fn test_repeat_hold_within_cooldown_suppressed() {
        let config = PipelineConfig {
            smoothing_enabled: false,
            ..PipelineConfig::default()
        };
        let mut pipeline = PosePipeline::new(config).unwrap();
        let mut events = Vec::new();
        let mut t = 0.0;

        for _ in 0..50 {
            events.extend(pipeline.update(&frame(0.3, t)).event);
            t += 33.0;
        }
        // Subject steps away for 2 s then returns to the same pose
        t += 2000.0;
        for _ in 0..50 {
            events.extend(pipeline.update(&frame(0.3, t)).event);
            t += 33.0;
        }

        assert_eq!(events.len(), 2);
        assert!(events[0].allowed);
        assert!(!events[1].allowed);
        assert_eq!(events[0].fingerprint, events[1].fingerprint);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut pipeline = PosePipeline::default();
        for i in 0..60 {
            pipeline.update(&frame(0.3, i as f64 * 33.0));
        }
        pipeline.reset();
        assert!(pipeline.latest_overlay().is_none());
        assert!(pipeline.dedup().last_record().is_none());
        assert_eq!(pipeline.classifier().phase(), StabilityPhase::Cold);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.stability.window_sec = 0.0;
        assert!(PosePipeline::new(config).is_err());
    }

    #[test]
    fn test_nested_config_from_json() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"stability":{"windowSec":3.0,"stabilityScoreThreshold":0.95},
                "dedup":{"dedupCooldownMs":10000},
                "smoothingEnabled":false}"#,
        )
        .unwrap();
        assert_eq!(config.stability.window_sec, 3.0);
        assert_eq!(config.stability.stability_score_threshold, 0.95);
        assert_eq!(config.dedup.cooldown_ms, 10_000);
        assert!(!config.smoothing_enabled);
        assert_eq!(config.smoother, SmootherConfig::default());
        assert!(PosePipeline::new(config).is_ok());
    }

    #[test]
    fn test_unknown_config_keys_rejected() {
        // Stage options at the top level
        let err = serde_json::from_str::<PipelineConfig>(
            r#"{"windowSec":3.0,"dedupCooldownMs":10000}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("windowSec"));

        // Misspelled key inside a stage
        let err = serde_json::from_str::<PipelineConfig>(r#"{"stability":{"windwSec":-3.0}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("windwSec"));

        assert!(serde_json::from_str::<PipelineConfig>(
            r#"{"smoother":{"filter":{"minCutof":2.0}}}"#
        )
        .is_err());
        assert!(serde_json::from_str::<PipelineConfig>(r#"{"dedup":{"coolDown":1}}"#).is_err());
    }
}
