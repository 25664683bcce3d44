//! WASM exports for the beam subsystem.
//!
//! The JavaScript host calls `beams_init` once, brackets each battle scene
//! with `beams_enter_scene` / `beams_exit_scene`, and calls `beams_tick`
//! once per frame. After a tick the packed segments are read either straight
//! from linear memory (`beams_instances_ptr` + `beams_instance_count`,
//! 8 floats per segment) or as a copied `Float32Array`.

use std::cell::RefCell;

use beamfx::{BeamConfig, BeamId, CrackleParams};
use glam::Vec2;
use wasm_bindgen::prelude::*;

pub mod runner;

pub use runner::BeamRunner;

thread_local! {
    static RUNNER: RefCell<Option<BeamRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the runner. Before `beams_init` this is a logged no-op.
fn with_runner<R>(f: impl FnOnce(&mut BeamRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("beams: not initialized, call beams_init() first");
                None
            }
        }
    })
}

/// Widen a beam id for JavaScript without wrapping into the failure value.
fn created_id(id: BeamId) -> i64 {
    i64::from(id.0)
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub fn beams_init(config_json: &str, definitions_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = if config_json.trim().is_empty() {
        BeamConfig::default()
    } else {
        BeamConfig::from_json(config_json).map_err(to_js)?
    };
    let runner = BeamRunner::new(config, definitions_json).map_err(to_js)?;
    RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
    log::info!("beams: initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn beams_enter_scene() {
    with_runner(|r| r.enter_scene());
}

#[wasm_bindgen]
pub fn beams_exit_scene() {
    with_runner(|r| r.exit_scene());
}

#[wasm_bindgen]
pub fn beams_set_atlas_size(filename: &str, width: u32, height: u32) {
    with_runner(|r| r.set_atlas_size(filename, width, height));
}

/// Create a beam and return its id, or -1 if nothing was created.
/// Returned as `i64` (a JS `BigInt`) so every `u32` id stays non-negative.
#[wasm_bindgen]
pub fn beams_create(
    key: Option<String>,
    beam_type: u32,
    origin_x: f32,
    origin_y: f32,
    target_x: f32,
    target_y: f32,
) -> i64 {
    with_runner(|r| {
        let origin = Vec2::new(origin_x, origin_y);
        let target = Vec2::new(target_x, target_y);
        match r.create(key.as_deref(), beam_type as usize, origin, target) {
            Ok(id) => created_id(id),
            Err(err) => {
                log::warn!("beams: {err}");
                -1
            }
        }
    })
    .unwrap_or(-1)
}

#[wasm_bindgen]
pub fn beams_exists(key: &str) -> bool {
    with_runner(|r| r.exists(key)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn beams_crackle(key: &str, segment_count: u32, min_angle: f32, max_angle: f32, overlap: f32) -> bool {
    let params = CrackleParams::new(segment_count as usize, min_angle, max_angle).with_overlap(overlap);
    with_runner(|r| match r.crackle(key, &params) {
        Ok(found) => found,
        Err(err) => {
            log::warn!("beams: {err}");
            false
        }
    })
    .unwrap_or(false)
}

#[wasm_bindgen]
pub fn beams_remove(key: &str) -> bool {
    with_runner(|r| r.remove_key(key)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn beams_remove_id(id: u32) -> bool {
    with_runner(|r| r.remove(BeamId(id))).unwrap_or(false)
}

#[wasm_bindgen]
pub fn beams_tick() {
    with_runner(|r| r.tick());
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn beams_instances_ptr() -> *const f32 {
    with_runner(|r| r.instances_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn beams_instance_count() -> u32 {
    with_runner(|r| r.instance_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn beams_count() -> u32 {
    with_runner(|r| r.beam_count()).unwrap_or(0)
}

/// Copy of the packed segment buffer.
#[wasm_bindgen]
pub fn beams_instances() -> js_sys::Float32Array {
    with_runner(|r| js_sys::Float32Array::from(r.instance_floats()))
        .unwrap_or_else(|| js_sys::Float32Array::new_with_length(0))
}
