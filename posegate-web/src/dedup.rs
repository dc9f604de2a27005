//! Duplicate-pose suppression
//!
//! A triggered pose is reduced to a coarse fingerprint (quantized x/y of a
//! few body landmarks). The same fingerprint seen again inside the cooldown
//! is suppressed; anything else passes and becomes the new record.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{below_minimum, ensure_positive, ConfigError};
use crate::pose::{LandmarkId, PoseFrame};

/// Quantized value for a landmark that is missing or non-finite
const MISSING_CELL: i64 = i64::MIN;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct DedupConfig {
    /// Minimum time between two triggers of the same pose
    #[serde(alias = "dedupCooldownMs")]
    pub cooldown_ms: i64,
    /// Grid size in normalized image units
    pub quantization_step: f64,
    /// Landmarks that make up the fingerprint
    pub landmarks: Vec<LandmarkId>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        use LandmarkId::*;
        Self {
            cooldown_ms: 5000,
            quantization_step: 0.05,
            landmarks: vec![
                LeftShoulder,
                RightShoulder,
                LeftElbow,
                RightElbow,
                LeftWrist,
                RightWrist,
                LeftHip,
                RightHip,
                LeftKnee,
                RightKnee,
                LeftAnkle,
                RightAnkle,
            ],
        }
    }
}

impl DedupConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cooldown_ms < 0 {
            return Err(below_minimum(
                "cooldown_ms",
                self.cooldown_ms as f64,
                "zero",
                0.0,
            ));
        }
        ensure_positive("quantization_step", self.quantization_step)?;
        if self.landmarks.is_empty() {
            return Err(ConfigError::EmptyFingerprint);
        }
        Ok(())
    }
}

// ============================================================================
// FINGERPRINT
// ============================================================================

/// Coarse content hash of a pose
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PoseFingerprint(pub u64);

impl PoseFingerprint {
    pub fn of(frame: &PoseFrame, config: &DedupConfig) -> Self {
        let mut hasher = DefaultHasher::new();
        for &id in &config.landmarks {
            let cell = frame
                .finite_landmark(id)
                .map(|lm| {
                    (
                        quantize(lm.x, config.quantization_step),
                        quantize(lm.y, config.quantization_step),
                    )
                })
                .unwrap_or((MISSING_CELL, MISSING_CELL));
            (id, cell).hash(&mut hasher);
        }
        Self(hasher.finish())
    }
}

impl fmt::Display for PoseFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

fn quantize(value: f64, step: f64) -> i64 {
    (value / step).round() as i64
}

// ============================================================================
// SUPPRESSOR
// ============================================================================

/// The last pose that was let through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupRecord {
    pub fingerprint: PoseFingerprint,
    pub last_seen_timestamp_ms: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupDecision {
    pub allowed: bool,
    pub fingerprint: PoseFingerprint,
    /// Time since the previous record, if there was one
    pub since_last_ms: Option<i64>,
}

/// Gate between the stability trigger and the expensive downstream action
#[derive(Clone, Debug)]
pub struct DuplicatePoseSuppressor {
    config: DedupConfig,
    last: Option<DedupRecord>,
}

impl DuplicatePoseSuppressor {
    pub fn new(config: DedupConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, last: None })
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Decide whether a triggered pose may be emitted.
    ///
    /// Suppressed poses leave the record untouched, so a pose held through
    /// repeated triggers passes again once the cooldown has run out.
    pub fn check(&mut self, frame: &PoseFrame) -> DedupDecision {
        let fingerprint = PoseFingerprint::of(frame, &self.config);
        let now_ms = frame.timestamp_ms.round() as i64;

        let since_last_ms = self.last.map(|r| now_ms - r.last_seen_timestamp_ms);

        let duplicate = match (self.last, since_last_ms) {
            // Clock went backwards: new session
            (Some(_), Some(elapsed)) if elapsed < 0 => false,
            (Some(record), Some(elapsed)) => {
                record.fingerprint == fingerprint && elapsed < self.config.cooldown_ms
            }
            _ => false,
        };

        if duplicate {
            info!(
                "Dedup: pose {} repeated after {} ms, suppressed",
                fingerprint,
                since_last_ms.unwrap_or_default()
            );
        } else {
            self.last = Some(DedupRecord {
                fingerprint,
                last_seen_timestamp_ms: now_ms,
            });
        }

        DedupDecision {
            allowed: !duplicate,
            fingerprint,
            since_last_ms,
        }
    }

    pub fn last_record(&self) -> Option<DedupRecord> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for DuplicatePoseSuppressor {
    fn default() -> Self {
        Self {
            config: DedupConfig::default(),
            last: None,
        }
    }
}
