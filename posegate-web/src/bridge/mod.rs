//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod landmarks;
mod session;

pub use landmarks::{
    // WASM entry points
    update_landmarks,
    get_smoothed_landmarks,
    get_skeleton_connections,
    // Wire format
    decode_frame,
    encode_landmarks,
    LANDMARK_STRIDE,
};

pub use session::{
    configure_pipeline,
    reset_pipeline,
    get_stability,
    take_stable_pose_event,
};
