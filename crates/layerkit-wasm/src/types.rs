//! WASM-compatible wrapper types for pixel data.
//!
//! Canvas `ImageData` is RGBA with 4 bytes per pixel, which is exactly the
//! layout of the core `PixelBuffer`, so the conversion is a move of the
//! byte vector.

use layerkit_core::{BufferError, PixelBuffer};
use wasm_bindgen::prelude::*;

/// An RGBA pixel buffer for JavaScript.
///
/// # Memory Management
///
/// The pixel data lives in WASM memory. `pixels()` and `pixels_clamped()`
/// copy it into JavaScript memory.
#[wasm_bindgen]
pub struct JsPixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsPixelBuffer {
    /// Create a buffer from dimensions and RGBA data.
    ///
    /// # Arguments
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `pixels` - RGBA data (4 bytes per pixel, row-major order), e.g.
    ///   `imageData.data`
    ///
    /// The length is checked when the buffer is first used.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsPixelBuffer {
        JsPixelBuffer {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Returns RGBA pixel data ready for `new ImageData(data, width, height)`.
    pub fn pixels_clamped(&self) -> js_sys::Uint8ClampedArray {
        js_sys::Uint8ClampedArray::from(self.pixels.as_slice())
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsPixelBuffer {
    pub(crate) fn from_core(buffer: PixelBuffer) -> Self {
        Self {
            width: buffer.width,
            height: buffer.height,
            pixels: buffer.pixels,
        }
    }

    /// Validated copy as a core buffer.
    pub(crate) fn to_core(&self) -> Result<PixelBuffer, BufferError> {
        PixelBuffer::new(self.width, self.height, self.pixels.clone())
    }
}

/// Map any displayable error into a JavaScript exception value.
pub(crate) fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_pixel_buffer_creation() {
        let img = JsPixelBuffer::new(100, 50, vec![0u8; 100 * 50 * 4]);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 20000);
    }

    #[test]
    fn test_round_trip_through_core() {
        let pixels = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let img = JsPixelBuffer::new(2, 1, pixels.clone());
        let core = img.to_core().unwrap();
        assert_eq!(core.pixels, pixels);

        let back = JsPixelBuffer::from_core(core);
        assert_eq!(back.width(), 2);
        assert_eq!(back.pixels(), pixels);
    }

    #[test]
    fn test_to_core_rejects_wrong_length() {
        let img = JsPixelBuffer::new(2, 2, vec![0u8; 15]);
        assert!(matches!(
            img.to_core(),
            Err(BufferError::InvalidBuffer {
                expected: 16,
                actual: 15,
                ..
            })
        ));
    }
}
