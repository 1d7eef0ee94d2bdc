#![cfg(target_arch = "wasm32")]
//! WASM binding driven by a JavaScript host.
//!
//! The host owns the camera, the hand-pose detector and the WebGL scene
//! graph. Each animation frame it:
//! - pushes the detector result (`push_hand` / `no_hand`)
//! - calls `frame()`
//! - reads the instance buffers back and uploads them

mod host;
mod photo;
mod setup;

use host::{parse_hands, HostDetector};
use photo::WebTexture;
use tree_core::gesture::{GestureTracker, Hands, TrackerStatus};
use tree_core::photos::PhotoId;
use tree_core::signal::{self, SignalReader};
use tree_core::{FrameClock, Scene, SceneInstances, TreeConfig};
use wasm_bindgen::prelude::*;
use web_sys as web;

pub use photo::PhotoHandle;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("tree-web starting");
    Ok(())
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct TreeApp {
    scene: Scene<WebTexture>,
    tracker: GestureTracker<HostDetector>,
    signal: SignalReader,
    clock: FrameClock,
    instances: SceneInstances,
}

#[wasm_bindgen]
impl TreeApp {
    /// `open_threshold` and `window` override the gesture calibration;
    /// pass `undefined` to keep the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        seed: u32,
        open_threshold: Option<f32>,
        window: Option<u32>,
    ) -> Result<TreeApp, JsValue> {
        let mut config = TreeConfig {
            seed: seed as u64,
            ..TreeConfig::default()
        };
        if let Some(threshold) = open_threshold {
            config.gesture.open_threshold = threshold;
        }
        if let Some(window) = window {
            config.gesture.window = window as usize;
        }
        config.validate().map_err(js_err)?;

        let (writer, reader) = signal::channel();
        let tracker = GestureTracker::start(|| Ok(HostDetector), writer, config.gesture.clone());
        Ok(TreeApp {
            scene: Scene::from_config(&config),
            tracker,
            signal: reader,
            clock: FrameClock::new(),
            instances: SceneInstances::default(),
        })
    }

    /// Camera, orbit limits, lights and post-processing for the host's
    /// render surface. Read once after construction.
    pub fn setup(&self) -> Result<js_sys::Object, JsValue> {
        setup::to_js(&self.scene.setup)
    }

    /// Feed one detector result: a flat array of 63 floats per hand.
    /// Returns the new state name when the tree flips.
    pub fn push_hand(
        &mut self,
        landmarks: js_sys::Float32Array,
        timestamp_ms: f64,
    ) -> Result<Option<String>, JsValue> {
        let hands = parse_hands(&landmarks.to_vec()).map_err(js_err)?;
        Ok(self
            .tracker
            .step(&hands, timestamp_ms)
            .map(|s| s.to_string()))
    }

    /// The detector ran but saw no hand. The state is held.
    pub fn no_hand(&mut self) {
        self.tracker.step(&Hands::new(), 0.0);
    }

    /// Camera permission denied or the model failed to load. Gesture
    /// control stays off and the tree stays formed.
    pub fn detector_failed(&mut self, message: String) {
        self.tracker.disable(message);
    }

    #[wasm_bindgen(getter)]
    pub fn gestures_active(&self) -> bool {
        *self.tracker.status() == TrackerStatus::Active
    }

    /// Advance every animator from the wall clock and refill the buffers.
    pub fn frame(&mut self) {
        let state = self.signal.snapshot();
        self.clock.tick();
        self.scene.update(&self.clock.frame(state));
        self.scene.write_instances(&mut self.instances);
    }

    pub fn state(&self) -> String {
        self.signal.snapshot().to_string()
    }

    /// `[x, y, z, size, r, g, b, a]` per particle.
    pub fn particle_buffer(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(bytemuck::cast_slice::<_, f32>(&self.instances.particles))
    }

    /// Background stars, same layout as `particle_buffer`. World space:
    /// the root matrix does not apply.
    pub fn backdrop_buffer(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(bytemuck::cast_slice::<_, f32>(&self.instances.backdrop))
    }

    /// Column-major 4x4 model matrix then RGBA, per ornament.
    pub fn ornament_buffer(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(bytemuck::cast_slice::<_, f32>(&self.instances.ornaments))
    }

    /// Column-major 4x4 model matrix of the star.
    pub fn star_matrix(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.instances.star.matrix().to_cols_array()[..])
    }

    /// Scene root transform (offset and hover).
    pub fn root_matrix(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(bytemuck::cast_slice::<_, f32>(&self.instances.root[..]))
    }

    /// `[slot, model (16 floats)]` per live photo, in slot order.
    pub fn photo_buffer(&self) -> js_sys::Float32Array {
        let mut out = Vec::with_capacity(self.instances.photos.len() * 17);
        for p in &self.instances.photos {
            out.push(p.slot as f32);
            out.extend_from_slice(&p.instance.matrix().to_cols_array());
        }
        js_sys::Float32Array::from(&out[..])
    }

    /// Hang an uploaded image on the tree. The returned handle carries the
    /// object URL for the host's texture loader.
    pub fn add_photo(&mut self, file: web::File) -> Result<PhotoHandle, JsValue> {
        let texture = WebTexture::from_file(&file)?;
        let url = texture.url().to_owned();
        let id = self.scene.add_photo(file.name(), texture);
        let slot = self.scene.photos().slot_of(id).unwrap_or_default();
        Ok(PhotoHandle::new(id.0 as f64, slot as u32, url))
    }

    /// Remove a photo and revoke its URL. `false` if the id is unknown.
    pub fn remove_photo(&mut self, id: f64) -> bool {
        match self.scene.remove_photo(PhotoId(id as u64)) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("[photos] {e}");
                false
            }
        }
    }

    /// Stop gesture tracking and release every photo.
    pub fn dispose(&mut self) {
        self.tracker.shutdown();
        self.scene.teardown();
    }
}
