//! Plain JS object view of [`SceneSetup`] for the host's render surface.

use js_sys::{Array, Object, Reflect};
use tree_core::{Light, SceneSetup};
use wasm_bindgen::JsValue;

fn set(obj: &Object, key: &str, value: impl Into<JsValue>) -> Result<(), JsValue> {
    Reflect::set(obj, &JsValue::from_str(key), &value.into())?;
    Ok(())
}

fn floats(values: &[f32]) -> Array {
    values.iter().map(|&v| JsValue::from_f64(v as f64)).collect()
}

fn light(light: &Light) -> Result<Object, JsValue> {
    let obj = Object::new();
    match light {
        Light::Ambient { intensity } => {
            set(&obj, "kind", "ambient")?;
            set(&obj, "intensity", *intensity)?;
        }
        Light::Spot {
            position,
            angle,
            penumbra,
            intensity,
            color,
        } => {
            set(&obj, "kind", "spot")?;
            set(&obj, "position", floats(&position.to_array()))?;
            set(&obj, "angle", *angle)?;
            set(&obj, "penumbra", *penumbra)?;
            set(&obj, "intensity", *intensity)?;
            set(&obj, "color", floats(color))?;
        }
        Light::Point {
            position,
            intensity,
            color,
            distance,
        } => {
            set(&obj, "kind", "point")?;
            set(&obj, "position", floats(&position.to_array()))?;
            set(&obj, "intensity", *intensity)?;
            set(&obj, "color", floats(color))?;
            set(&obj, "distance", *distance)?;
        }
    }
    Ok(obj)
}

pub fn to_js(setup: &SceneSetup) -> Result<Object, JsValue> {
    let camera = Object::new();
    set(&camera, "eye", floats(&setup.camera.eye.to_array()))?;
    set(&camera, "target", floats(&setup.camera.target.to_array()))?;
    set(&camera, "fov_degrees", setup.camera.fovy_radians.to_degrees())?;
    set(&camera, "near", setup.camera.znear)?;
    set(&camera, "far", setup.camera.zfar)?;

    let orbit = Object::new();
    set(&orbit, "min_polar", setup.orbit.min_polar)?;
    set(&orbit, "max_polar", setup.orbit.max_polar)?;
    set(&orbit, "min_distance", setup.orbit.min_distance)?;
    set(&orbit, "max_distance", setup.orbit.max_distance)?;

    let lights = Array::new();
    for l in &setup.lights {
        lights.push(&light(l)?);
    }

    let bloom = Object::new();
    set(&bloom, "luminance_threshold", setup.bloom.luminance_threshold)?;
    set(&bloom, "intensity", setup.bloom.intensity)?;
    set(&bloom, "radius", setup.bloom.radius)?;

    let vignette = Object::new();
    set(&vignette, "offset", setup.vignette.offset)?;
    set(&vignette, "darkness", setup.vignette.darkness)?;

    let out = Object::new();
    set(&out, "camera", camera)?;
    set(&out, "orbit", orbit)?;
    set(&out, "lights", lights)?;
    set(&out, "bloom", bloom)?;
    set(&out, "vignette", vignette)?;
    set(&out, "background", floats(&setup.background))?;
    Ok(out)
}
