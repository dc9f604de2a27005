//! PoseGate Web - landmark smoothing and stable-pose detection
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen entry points that delegate to submodules
//!
//! The core (`pose`, `physics`, `stability`, `dedup`, `pipeline`) has no
//! browser dependency and runs natively as well.

pub mod bridge;
pub mod dedup;
pub mod error;
pub mod physics;
pub mod pipeline;
pub mod pose;
pub mod stability;

use wasm_bindgen::prelude::*;

pub use error::ConfigError;
pub use pipeline::{PipelineConfig, PipelineOutput, PosePipeline, StablePoseEvent};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Route `log` output to the browser console.
/// Level: "trace", "debug", "info", "warn" or "error" (default "info").
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "info" => log::Level::Info,
        "warn" => log::Level::Warn,
        "error" => log::Level::Error,
        _ => log::Level::Info,
    };

    wasm_logger::init(wasm_logger::Config::new(log_level));
    log::info!("PoseGate initialized with log level: {}", level);
}

#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
