//! Layerkit WASM - WebAssembly bindings for Layerkit
//!
//! This crate provides WASM bindings to expose the layerkit-core filters and
//! touch layers to a browser or webview host.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper for RGBA pixel data
//! - `filters` - Brightness, contrast and luminance-to-alpha bindings
//! - `composition` - Layer stack with touch event routing
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsPixelBuffer, JsComposition, FilterSettings, process_image } from '@layerkit/wasm';
//!
//! await init();
//!
//! const data = ctx.getImageData(0, 0, w, h);
//! const processed = process_image(new JsPixelBuffer(w, h, data.data), new FilterSettings());
//!
//! const composition = new JsComposition(canvas.width, canvas.height);
//! const id = composition.add_layer(processed);
//! ```

use wasm_bindgen::prelude::*;

mod composition;
mod filters;
mod types;

// Re-export public types
pub use composition::JsComposition;
pub use filters::{brightness, contrast, process_image, to_luminance_alpha, FilterSettings};
pub use types::JsPixelBuffer;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}
