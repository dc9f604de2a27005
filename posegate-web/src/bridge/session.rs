//! Pipeline session - the one tracked subject JS talks to
//!
//! Holds the `PosePipeline`, the latest stability result and the pending
//! stable-pose event. JS polls; nothing here calls back into JS.

use std::cell::RefCell;

use log::info;
use wasm_bindgen::prelude::*;

use crate::pipeline::{PipelineConfig, PipelineOutput, PosePipeline, StablePoseEvent};
use crate::pose::PoseFrame;
use crate::stability::StabilityResult;

#[derive(Default)]
pub(crate) struct SessionState {
    pub pipeline: PosePipeline,
    pub last_result: Option<StabilityResult>,
    /// Newest unread event; an unread older one is replaced
    pub pending_event: Option<StablePoseEvent>,
}

impl SessionState {
    /// Run a frame and keep what JS may ask for later
    pub fn process(&mut self, frame: &PoseFrame) -> bool {
        let PipelineOutput {
            stability, event, ..
        } = self.pipeline.update(frame);

        let allowed = event.as_ref().is_some_and(|e| e.allowed);
        if let Some(event) = event {
            self.pending_event = Some(event);
        }
        self.last_result = Some(stability);
        allowed
    }

    pub fn replace_pipeline(&mut self, pipeline: PosePipeline) {
        self.pipeline = pipeline;
        self.last_result = None;
        self.pending_event = None;
    }

    pub fn reset(&mut self) {
        self.pipeline.reset();
        self.last_result = None;
        self.pending_event = None;
    }
}

// Thread-local storage (WASM is single-threaded)
thread_local! {
    pub(crate) static SESSION: RefCell<SessionState> = RefCell::new(SessionState::default());
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Replace the pipeline with one built from `config` (camelCase object,
/// missing fields take defaults). Rejected configs leave the current
/// pipeline untouched.
#[wasm_bindgen(js_name = configurePipeline)]
pub fn configure_pipeline(config: JsValue) -> Result<(), JsValue> {
    let config: PipelineConfig = serde_wasm_bindgen::from_value(config)?;
    let pipeline = PosePipeline::new(config)?;
    SESSION.with(|cell| cell.borrow_mut().replace_pipeline(pipeline));
    info!("Pipeline reconfigured");
    Ok(())
}

#[wasm_bindgen(js_name = resetPipeline)]
pub fn reset_pipeline() {
    SESSION.with(|cell| cell.borrow_mut().reset());
}

/// Latest `StabilityResult`, or `null` before the first frame
#[wasm_bindgen(js_name = getStability)]
pub fn get_stability() -> JsValue {
    SESSION.with(|cell| {
        cell.borrow()
            .last_result
            .as_ref()
            .and_then(|r| serde_wasm_bindgen::to_value(r).ok())
            .unwrap_or(JsValue::NULL)
    })
}

/// Pop the pending `StablePoseEvent`, or `null` if none
#[wasm_bindgen(js_name = takeStablePoseEvent)]
pub fn take_stable_pose_event() -> JsValue {
    SESSION.with(|cell| {
        cell.borrow_mut()
            .pending_event
            .take()
            .and_then(|e| serde_wasm_bindgen::to_value(&e).ok())
            .unwrap_or(JsValue::NULL)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, LANDMARK_COUNT};

    fn frame(t_ms: f64) -> PoseFrame {
        let landmarks = (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(0.3 + i as f64 * 0.01, 0.2 + i as f64 * 0.02, 0.0))
            .collect();
        PoseFrame::new(landmarks, t_ms)
    }

    #[test]
    fn test_event_kept_until_taken() {
        let mut session = SessionState::default();
        let allowed: Vec<bool> = (0..80).map(|i| session.process(&frame(i as f64 * 33.0))).collect();

        assert_eq!(allowed.iter().filter(|a| **a).count(), 1);
        assert!(session.last_result.is_some());
        assert!(session.pending_event.take().is_some());
        assert!(session.pending_event.is_none());
    }

    #[test]
    fn test_reset_drops_pending_state() {
        let mut session = SessionState::default();
        for i in 0..80 {
            session.process(&frame(i as f64 * 33.0));
        }
        session.reset();
        assert!(session.last_result.is_none());
        assert!(session.pending_event.is_none());
        assert!(session.pipeline.latest_overlay().is_none());
    }
}
