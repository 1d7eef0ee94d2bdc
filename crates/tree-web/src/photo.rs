use wasm_bindgen::prelude::*;
use web_sys as web;

/// Object URL for an uploaded image. The host loads it as a texture;
/// dropping this revokes it.
#[derive(Debug)]
pub struct WebTexture {
    url: String,
}

impl WebTexture {
    pub fn from_file(file: &web::File) -> Result<Self, JsValue> {
        let url = web::Url::create_object_url_with_blob(file)?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for WebTexture {
    fn drop(&mut self) {
        if let Err(e) = web::Url::revoke_object_url(&self.url) {
            log::warn!("[photos] failed to revoke {}: {:?}", self.url, e);
        }
    }
}

/// Returned to the host after `add_photo`.
#[wasm_bindgen]
pub struct PhotoHandle {
    id: f64,
    slot: u32,
    url: String,
}

impl PhotoHandle {
    pub(crate) fn new(id: f64, slot: u32, url: String) -> Self {
        Self { id, slot, url }
    }
}

#[wasm_bindgen]
impl PhotoHandle {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> f64 {
        self.id
    }

    /// Render index; stable until the photo is removed.
    #[wasm_bindgen(getter)]
    pub fn slot(&self) -> u32 {
        self.slot
    }

    #[wasm_bindgen(getter)]
    pub fn url(&self) -> String {
        self.url.clone()
    }
}
