//! Filter pipeline WASM bindings.
//!
//! This module exposes the brightness, contrast and luminance-to-alpha
//! filters, plus a settings object for the combined pipeline.

use crate::types::{js_error, JsPixelBuffer};
use layerkit_core::adjustments;
use layerkit_core::luminance;
use wasm_bindgen::prelude::*;

/// Filter settings wrapper for JavaScript
#[wasm_bindgen]
pub struct FilterSettings {
    inner: layerkit_core::FilterSettings,
}

#[wasm_bindgen]
impl FilterSettings {
    /// Create settings with the default values (+50 brightness, +100 contrast,
    /// transparency on)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: layerkit_core::FilterSettings::new(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> i32 {
        self.inner.brightness
    }

    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: i32) {
        self.inner.brightness = value;
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f64 {
        self.inner.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f64) {
        self.inner.contrast = value;
    }

    /// Whether brighter pixels become more transparent
    #[wasm_bindgen(getter)]
    pub fn transparency(&self) -> bool {
        self.inner.transparency
    }

    #[wasm_bindgen(setter)]
    pub fn set_transparency(&mut self, value: bool) {
        self.inner.transparency = value;
    }

    /// Check if all settings are at their default values
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    /// Serialize to JSON for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(js_error)
    }

    /// Deserialize from JSON. Missing fields take their defaults.
    pub fn from_json(value: JsValue) -> Result<FilterSettings, JsValue> {
        let inner: layerkit_core::FilterSettings =
            serde_wasm_bindgen::from_value(value).map_err(js_error)?;
        Ok(Self { inner })
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterSettings {
    pub(crate) fn inner(&self) -> &layerkit_core::FilterSettings {
        &self.inner
    }
}

/// Run the full pipeline: brightness, contrast, then luminance-to-alpha when
/// `settings.transparency` is set.
///
/// # Example (TypeScript)
/// ```typescript
/// const data = ctx.getImageData(0, 0, w, h);
/// const src = new JsPixelBuffer(w, h, new Uint8Array(data.data.buffer));
/// const out = process_image(src, new FilterSettings());
/// ctx.putImageData(new ImageData(out.pixels_clamped(), w, h), 0, 0);
/// ```
#[wasm_bindgen]
pub fn process_image(
    image: &JsPixelBuffer,
    settings: &FilterSettings,
) -> Result<JsPixelBuffer, JsValue> {
    let src = image.to_core().map_err(js_error)?;
    let out = adjustments::process(&src, settings.inner()).map_err(js_error)?;
    Ok(JsPixelBuffer::from_core(out))
}

/// Shift red, green and blue by `delta`, clamped to 0..=255.
#[wasm_bindgen]
pub fn brightness(image: &JsPixelBuffer, delta: i32) -> Result<JsPixelBuffer, JsValue> {
    let src = image.to_core().map_err(js_error)?;
    let out = adjustments::brightness(&src, delta).map_err(js_error)?;
    Ok(JsPixelBuffer::from_core(out))
}

/// Apply the contrast curve. 0 leaves the image unchanged, -100 flattens it
/// to mid-gray.
#[wasm_bindgen]
pub fn contrast(image: &JsPixelBuffer, amount_percent: f64) -> Result<JsPixelBuffer, JsValue> {
    let src = image.to_core().map_err(js_error)?;
    let out = adjustments::contrast(&src, amount_percent).map_err(js_error)?;
    Ok(JsPixelBuffer::from_core(out))
}

/// Replace alpha with inverted luminance so white becomes fully transparent.
#[wasm_bindgen]
pub fn to_luminance_alpha(image: &JsPixelBuffer) -> Result<JsPixelBuffer, JsValue> {
    let src = image.to_core().map_err(js_error)?;
    let out = luminance::to_luminance_alpha(&src).map_err(js_error)?;
    Ok(JsPixelBuffer::from_core(out))
}
