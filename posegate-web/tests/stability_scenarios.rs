//! End-to-end scenarios for the smoothing → stability → dedup chain

use posegate_web::dedup::DuplicatePoseSuppressor;
use posegate_web::physics::{angle_deg, OneEuroConfig, OneEuroFilter};
use posegate_web::pipeline::{PipelineConfig, PosePipeline, StablePoseEvent};
use posegate_web::pose::{Landmark, LandmarkId, PoseFrame, LANDMARK_COUNT};
use posegate_web::stability::{StabilityClassifier, StabilityConfig, StabilityPhase};
use nalgebra::Vector2;

const FRAME_MS: f64 = 33.0;

/// Documented test coordinates: upright subject, arms slightly out
fn standing_pose() -> Vec<Landmark> {
    use LandmarkId::*;
    let mut landmarks = vec![Landmark::new(0.5, 0.18, 0.0); LANDMARK_COUNT];
    for (id, x, y) in [
        (LeftShoulder, 0.42, 0.30),
        (RightShoulder, 0.58, 0.30),
        (LeftElbow, 0.38, 0.45),
        (RightElbow, 0.62, 0.45),
        (LeftWrist, 0.36, 0.58),
        (RightWrist, 0.64, 0.58),
        (LeftHip, 0.45, 0.58),
        (RightHip, 0.55, 0.58),
        (LeftKnee, 0.44, 0.75),
        (RightKnee, 0.56, 0.75),
        (LeftAnkle, 0.44, 0.92),
        (RightAnkle, 0.56, 0.92),
    ] {
        landmarks[id.index()] = Landmark::new(x, y, 0.0);
    }
    landmarks
}

fn shifted(dx: f64, timestamp_ms: f64) -> PoseFrame {
    let landmarks = standing_pose()
        .into_iter()
        .map(|lm| Landmark { x: lm.x + dx, ..lm })
        .collect();
    PoseFrame::new(landmarks, timestamp_ms)
}

/// Zero-mean deterministic jitter: -a, 0, +a, -a, ...
fn jitter(i: usize, amplitude: f64) -> f64 {
    (i % 3) as f64 * amplitude - amplitude
}

#[test]
fn identical_frames_become_stable_by_frame_45() {
    let mut classifier = StabilityClassifier::default();
    let results: Vec<_> = (0..50)
        .map(|i| classifier.update(&shifted(0.0, i as f64 * FRAME_MS)))
        .collect();

    let at_45 = &results[45];
    assert!(at_45.stability_score > 0.8);
    assert!(at_45.is_stable);
    assert_eq!(at_45.phase, StabilityPhase::Stable);
    assert_eq!(results.iter().filter(|r| r.just_triggered).count(), 1);
}

#[test]
fn jittered_hold_triggers_exactly_once() {
    let mut classifier = StabilityClassifier::default();
    let triggers = (0..150)
        .filter(|&i| {
            classifier
                .update(&shifted(jitter(i, 0.001), i as f64 * FRAME_MS))
                .just_triggered
        })
        .count();
    assert_eq!(triggers, 1);
}

#[test]
fn displacement_after_stability_restarts_accumulation() {
    let mut classifier = StabilityClassifier::default();
    for i in 0..45 {
        classifier.update(&shifted(0.0, i as f64 * FRAME_MS));
    }
    assert!(classifier.stable_time_sec() > 0.0);

    let result = classifier.update(&shifted(0.3, 45.0 * FRAME_MS));
    assert!(result.stability_score < classifier.config().stability_score_threshold);
    assert!(!result.is_stable);
    assert!(!result.just_triggered);
    assert_eq!(result.metrics.stable_time_sec, 0.0);
}

#[test]
fn partial_frame_still_yields_result() {
    let mut classifier = StabilityClassifier::default();
    for i in 0..10 {
        classifier.update(&shifted(0.0, i as f64 * FRAME_MS));
    }

    let mut partial = shifted(0.0, 10.0 * FRAME_MS);
    partial.landmarks.truncate(20);
    let result = classifier.update(&partial);

    assert!(result.stability_score.is_finite());
    assert!((0.0..=1.0).contains(&result.stability_score));
    assert_eq!(result.metrics.history_len, 11);
}

#[test]
fn ten_second_gap_resets_stable_time() {
    let mut classifier = StabilityClassifier::default();
    for i in 0..20 {
        classifier.update(&shifted(0.0, i as f64 * FRAME_MS));
    }
    assert!(classifier.stable_time_sec() > 0.0);

    let last_ms = 19.0 * FRAME_MS;
    let result = classifier.update(&shifted(0.0, last_ms + 10_000.0));
    assert_eq!(result.metrics.stable_time_sec, 0.0);
    assert!(!result.is_stable);
}

#[test]
fn repeated_pose_suppressed_until_cooldown_elapses() {
    let config = PipelineConfig {
        smoothing_enabled: false,
        ..PipelineConfig::default()
    };
    let mut pipeline = PosePipeline::new(config).unwrap();
    let mut events: Vec<StablePoseEvent> = Vec::new();
    let mut t = 0.0;

    // Three holds of the same pose separated by 2 s away from the camera
    for _ in 0..3 {
        for _ in 0..50 {
            events.extend(pipeline.update(&shifted(0.0, t)).event);
            t += FRAME_MS;
        }
        t += 2000.0;
    }

    let allowed: Vec<bool> = events.iter().map(|e| e.allowed).collect();
    assert_eq!(allowed, vec![true, false, true]);
    assert!(events.windows(2).all(|w| w[0].fingerprint == w[1].fingerprint));
}

#[test]
fn dedup_first_call_always_passes() {
    let mut dedup = DuplicatePoseSuppressor::default();
    assert!(dedup.check(&shifted(0.0, 0.0)).allowed);
}

#[test]
fn smoothing_pipeline_reaches_stability_under_jitter() {
    let mut pipeline = PosePipeline::default();
    let mut events = 0;
    for i in 0..120 {
        let out = pipeline.update(&shifted(jitter(i, 0.002), i as f64 * FRAME_MS));
        events += out.event.is_some() as usize;
    }
    assert_eq!(events, 1);
    let overlay = pipeline.latest_overlay().unwrap();
    assert!(overlay.is_stable);
}

#[test]
fn default_thresholds_expect_smoothed_input() {
    let run = |smoothing_enabled: bool| {
        let config = PipelineConfig {
            smoothing_enabled,
            ..PipelineConfig::default()
        };
        let mut pipeline = PosePipeline::new(config).unwrap();
        (0..150)
            .filter_map(|i| {
                pipeline
                    .update(&shifted(jitter(i, 0.004), i as f64 * FRAME_MS))
                    .event
            })
            .count()
    };
    assert_eq!(run(true), 1);
    assert_eq!(run(false), 0);
}

#[test]
fn filter_stays_finite_on_well_formed_input() {
    let mut filter = OneEuroFilter::new(OneEuroConfig::default()).unwrap();
    for i in 0..300 {
        let x = (i as f64 * 0.37).sin() * 100.0;
        let out = filter.filter(x, i as f64 * 0.033);
        assert!(out.is_finite());
    }
}

#[test]
fn exact_angle_branches() {
    let origin = Vector2::new(0.0, 0.0);
    let right = Vector2::new(1.0, 0.0);
    assert_eq!(angle_deg(&right, &origin, &Vector2::new(0.0, 3.0)), 90.0);
    assert_eq!(angle_deg(&right, &origin, &Vector2::new(5.0, 0.0)), 0.0);
    assert_eq!(angle_deg(&right, &origin, &Vector2::new(-2.0, 0.0)), 180.0);
    assert!(angle_deg(&origin, &origin, &right).is_nan());
}
