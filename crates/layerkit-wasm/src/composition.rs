//! WASM bindings for the layer stack and touch routing.
//!
//! The host forwards every pointer event with the full list of fingers that
//! are down, then redraws when `take_repaint()` says so, drawing each layer
//! with `ctx.setTransform(...layer_matrix(id))`.

use crate::types::{js_error, JsPixelBuffer};
use layerkit_core::gesture::{Pointer, TouchAction, TouchEvent};
use layerkit_core::{Composition, GestureConfig, Layer, LayerConfig, LayerId};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Axis-aligned box handed to JavaScript as `{ x, y, width, height }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct JsRegion {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl From<kurbo::Rect> for JsRegion {
    fn from(rect: kurbo::Rect) -> Self {
        Self {
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
        }
    }
}

/// A stack of touch-transformable layers on one display.
#[wasm_bindgen]
pub struct JsComposition {
    inner: Composition,
    display: (u32, u32),
    layer_config: LayerConfig,
    gestures: GestureConfig,
}

#[wasm_bindgen]
impl JsComposition {
    /// Create an empty composition for a display of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(display_width: u32, display_height: u32) -> JsComposition {
        JsComposition {
            inner: Composition::new(),
            display: (display_width, display_height),
            layer_config: LayerConfig::default(),
            gestures: GestureConfig::default(),
        }
    }

    /// Share of the display a new layer's dominant side covers (default 0.8).
    #[wasm_bindgen(getter)]
    pub fn fill(&self) -> f64 {
        self.layer_config.fill
    }

    #[wasm_bindgen(setter)]
    pub fn set_fill(&mut self, value: f64) {
        self.layer_config.fill = value;
    }

    /// Pinch-zoom limits for layers added from now on.
    ///
    /// Throws unless both limits are finite and `0 < min_scale <= max_scale`.
    pub fn set_scale_limits(&mut self, min_scale: f64, max_scale: f64) -> Result<(), JsValue> {
        let gestures = GestureConfig {
            min_scale,
            max_scale,
        };
        gestures.validate().map_err(js_error)?;
        self.gestures = gestures;
        Ok(())
    }

    /// Place a processed image on top of the stack, centered and fitted to
    /// the display. Returns the new layer's id.
    pub fn add_layer(&mut self, image: &JsPixelBuffer) -> Result<u32, JsValue> {
        let id = self.push(image).map_err(js_error)?;
        Ok(id.0)
    }

    /// Remove a layer. Returns `false` if no such layer exists.
    pub fn remove_layer(&mut self, id: u32) -> bool {
        self.inner.remove(LayerId(id)).is_some()
    }

    /// Forward one touch event.
    ///
    /// # Arguments
    /// * `action` - 0 = down, 1 = up, 2 = move, 3 = cancel,
    ///   5 = secondary down, 6 = secondary up
    /// * `pointer` - Id of the finger the action is about
    /// * `ids`, `xs`, `ys` - Every finger currently down, including the one
    ///   that triggered the action
    ///
    /// # Returns
    /// The id of the layer that took the event, or `undefined`.
    pub fn touch(
        &mut self,
        action: u8,
        pointer: i32,
        ids: Vec<i32>,
        xs: Vec<f64>,
        ys: Vec<f64>,
    ) -> Result<Option<u32>, JsValue> {
        let event = build_event(action, pointer, &ids, &xs, &ys).map_err(js_error)?;
        let Some((id, effects)) = self.inner.dispatch_with_effects(&event) else {
            return Ok(None);
        };
        if let Some(err) = effects.recovered {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "layer {}: {}, gesture reset",
                id.0, err
            )));
        }
        Ok(Some(id.0))
    }

    #[wasm_bindgen(getter)]
    pub fn layer_count(&self) -> usize {
        self.inner.len()
    }

    /// Layer ids in drawing order, bottom first.
    pub fn layer_ids(&self) -> Vec<u32> {
        self.inner.layers().map(|(id, _)| id.0).collect()
    }

    /// Current `{ translate_x, translate_y, scale, rotation }` of a layer.
    pub fn layer_transform(&self, id: u32) -> Result<JsValue, JsValue> {
        let layer = self.layer(id)?;
        serde_wasm_bindgen::to_value(&layer.transform()).map_err(js_error)
    }

    /// Canvas matrix `[a, b, c, d, e, f]` for `ctx.setTransform`.
    pub fn layer_matrix(&self, id: u32) -> Option<Vec<f64>> {
        self.inner
            .get(LayerId(id))
            .map(|layer| layer.affine().as_coeffs().to_vec())
    }

    /// The box a new touch must land in to grab the layer.
    pub fn layer_hit_region(&self, id: u32) -> Result<JsValue, JsValue> {
        let layer = self.layer(id)?;
        serde_wasm_bindgen::to_value(&JsRegion::from(layer.hit_region())).map_err(js_error)
    }

    /// The layer's display pixels.
    pub fn layer_image(&self, id: u32) -> Option<JsPixelBuffer> {
        self.inner
            .get(LayerId(id))
            .map(|layer| JsPixelBuffer::from_core(layer.buffer().clone()))
    }

    /// Whether anything moved since the last call.
    pub fn take_repaint(&mut self) -> bool {
        self.inner.take_repaint()
    }
}

impl JsComposition {
    fn push(&mut self, image: &JsPixelBuffer) -> Result<LayerId, layerkit_core::LayerError> {
        let buffer = image.to_core()?;
        let layer = Layer::new(&buffer, self.display, &self.layer_config, self.gestures)?;
        Ok(self.inner.push(layer))
    }

    fn layer(&self, id: u32) -> Result<&Layer, JsValue> {
        self.inner
            .get(LayerId(id))
            .ok_or_else(|| js_error(format!("Unknown layer: {}", id)))
    }
}

/// Assemble a core event from the flat arrays JavaScript sends.
pub(crate) fn build_event(
    action: u8,
    pointer: i32,
    ids: &[i32],
    xs: &[f64],
    ys: &[f64],
) -> Result<TouchEvent, String> {
    let action =
        TouchAction::from_code(action).ok_or_else(|| format!("Unknown touch action: {}", action))?;
    if ids.len() != xs.len() || ids.len() != ys.len() {
        return Err(format!(
            "Pointer arrays differ in length: {} ids, {} xs, {} ys",
            ids.len(),
            xs.len(),
            ys.len()
        ));
    }
    let pointers = ids
        .iter()
        .zip(xs)
        .zip(ys)
        .map(|((&id, &x), &y)| Pointer::new(id, x, y))
        .collect();
    Ok(TouchEvent::new(action, pointer, pointers))
}
