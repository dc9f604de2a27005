//! Per-landmark importance table
//!
//! Fixed-size, indexed by `LandmarkId`, so there is no way to address a
//! landmark that doesn't exist. Serialises as a plain 33-element array.

use serde::{Deserialize, Serialize};

use super::landmark::{LandmarkId, LANDMARK_COUNT};
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct LandmarkWeights([f64; LANDMARK_COUNT]);

impl LandmarkWeights {
    pub fn uniform(weight: f64) -> Self {
        Self([weight; LANDMARK_COUNT])
    }

    pub fn get(&self, id: LandmarkId) -> f64 {
        self.0[id.index()]
    }

    pub fn set(&mut self, id: LandmarkId, weight: f64) {
        self.0[id.index()] = weight;
    }

    pub fn with(mut self, id: LandmarkId, weight: f64) -> Self {
        self.set(id, weight);
        self
    }

    /// `(landmark, weight)` for every landmark with a non-zero weight
    pub fn weighted(&self) -> impl Iterator<Item = (LandmarkId, f64)> + '_ {
        LandmarkId::ALL
            .iter()
            .copied()
            .zip(self.0.iter().copied())
            .filter(|(_, w)| *w > 0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (id, value) in LandmarkId::ALL.iter().zip(self.0.iter()) {
            if !value.is_finite() || *value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    landmark: *id,
                    value: *value,
                });
            }
        }
        if self.0.iter().all(|w| *w == 0.0) {
            return Err(ConfigError::NoWeightedLandmarks);
        }
        Ok(())
    }
}

impl Default for LandmarkWeights {
    /// Torso, hips and knees dominate; hands, feet and face barely count
    fn default() -> Self {
        use LandmarkId::*;

        let mut weights = Self::uniform(0.1);
        for (id, w) in [
            (LeftShoulder, 1.0),
            (RightShoulder, 1.0),
            (LeftHip, 1.0),
            (RightHip, 1.0),
            (LeftKnee, 0.8),
            (RightKnee, 0.8),
            (LeftElbow, 0.6),
            (RightElbow, 0.6),
            (LeftAnkle, 0.6),
            (RightAnkle, 0.6),
            (LeftWrist, 0.4),
            (RightWrist, 0.4),
            (LeftPinky, 0.2),
            (RightPinky, 0.2),
            (LeftIndex, 0.2),
            (RightIndex, 0.2),
            (LeftThumb, 0.2),
            (RightThumb, 0.2),
            (LeftHeel, 0.3),
            (RightHeel, 0.3),
            (LeftFootIndex, 0.3),
            (RightFootIndex, 0.3),
        ] {
            weights.set(id, w);
        }
        weights
    }
}

impl TryFrom<Vec<f64>> for LandmarkWeights {
    type Error = ConfigError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let actual = values.len();
        let table: [f64; LANDMARK_COUNT] =
            values.try_into().map_err(|_| ConfigError::WeightCount {
                expected: LANDMARK_COUNT,
                actual,
            })?;
        Ok(Self(table))
    }
}

impl From<LandmarkWeights> for Vec<f64> {
    fn from(weights: LandmarkWeights) -> Self {
        weights.0.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_favours_torso() {
        let w = LandmarkWeights::default();
        assert!(w.get(LandmarkId::LeftHip) > w.get(LandmarkId::LeftWrist));
        assert!(w.get(LandmarkId::RightKnee) > w.get(LandmarkId::Nose));
        assert!(w.get(LandmarkId::LeftShoulder) > w.get(LandmarkId::LeftFootIndex));
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_weighted_skips_zero() {
        let w = LandmarkWeights::uniform(0.0).with(LandmarkId::LeftHip, 2.0);
        let entries: Vec<_> = w.weighted().collect();
        assert_eq!(entries, vec![(LandmarkId::LeftHip, 2.0)]);
    }

    #[test]
    fn test_validation() {
        let w = LandmarkWeights::default().with(LandmarkId::LeftKnee, -0.5);
        assert_eq!(
            w.validate(),
            Err(ConfigError::InvalidWeight {
                landmark: LandmarkId::LeftKnee,
                value: -0.5
            })
        );
        assert_eq!(
            LandmarkWeights::uniform(0.0).validate(),
            Err(ConfigError::NoWeightedLandmarks)
        );
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(LandmarkWeights::try_from(vec![1.0; LANDMARK_COUNT]).is_ok());
        assert_eq!(
            LandmarkWeights::try_from(vec![1.0; 10]),
            Err(ConfigError::WeightCount {
                expected: LANDMARK_COUNT,
                actual: 10
            })
        );
    }
}
