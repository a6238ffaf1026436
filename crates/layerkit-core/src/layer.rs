//! A processed image placed on the display.
//!
//! A layer is built from a filtered buffer and a display size. The buffer is
//! resized so its larger side (relative to the display) fills a fixed share
//! of the display, and the layer starts out centered.

use image::imageops::{self, FilterType};
use kurbo::{Affine, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::{self, BufferError, PixelBuffer};
use crate::gesture::{Effects, LayerTransform, TouchEvent, TouchTransformEngine};
use crate::{ConfigError, GestureConfig};

/// Largest display buffer a layer may be resized to, in pixels.
pub const MAX_LAYER_PIXELS: u64 = 1 << 26;

/// Error type for layer construction.
#[derive(Debug, Error)]
pub enum LayerError {
    /// The source buffer is malformed.
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// The source buffer has no pixels.
    #[error("Cannot place an empty {width}x{height} buffer")]
    EmptyBuffer { width: u32, height: u32 },

    /// The display has a zero dimension.
    #[error("Invalid display size: {width}x{height}")]
    InvalidDisplay { width: u32, height: u32 },

    /// The fill share is not a positive finite number.
    #[error("Invalid fill factor: {0}")]
    InvalidFill(f64),

    /// The fitted size is more than a display buffer may hold.
    #[error("Layer too large: {width}x{height}")]
    TooLarge { width: u32, height: u32 },

    /// The gesture limits are unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The buffer could not be converted for resizing.
    #[error("Resize failed: {0}")]
    ResizeFailed(String),
}

/// How a new layer is sized on the display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Share of the display the layer's dominant side covers (0.8 = 80%).
    pub fill: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self { fill: 0.8 }
    }
}

/// Dimensions of a `width x height` image scaled into a `display` envelope.
///
/// The dimension that is larger relative to the display ends up at `fill`
/// times the matching display dimension. Sides are truncated and kept at
/// least one pixel.
pub fn fit_dimensions(width: u32, height: u32, display: (u32, u32), fill: f64) -> (u32, u32) {
    let ratio_w = width as f64 / display.0 as f64;
    let ratio_h = height as f64 / display.1 as f64;
    let scale = fill / ratio_w.max(ratio_h);

    let w = (width as f64 * scale) as u32;
    let h = (height as f64 * scale) as u32;
    (w.max(1), h.max(1))
}

/// Translation that centers a `size` layer on a `display`.
///
/// Halves are taken with integer division on both sides.
pub fn centered_at(size: (u32, u32), display: (u32, u32)) -> LayerTransform {
    let x = (display.0 / 2) as i64 - (size.0 / 2) as i64;
    let y = (display.1 / 2) as i64 - (size.1 / 2) as i64;
    LayerTransform::at(x as f64, y as f64)
}

/// A display buffer and the touch engine that places it.
#[derive(Debug, Clone)]
pub struct Layer {
    buffer: PixelBuffer,
    engine: TouchTransformEngine,
}

impl Layer {
    /// Fit `buffer` into `display` and center it.
    pub fn new(
        buffer: &PixelBuffer,
        display: (u32, u32),
        config: &LayerConfig,
        gestures: GestureConfig,
    ) -> Result<Self, LayerError> {
        buffer.validate()?;
        if buffer.is_empty() {
            return Err(LayerError::EmptyBuffer {
                width: buffer.width,
                height: buffer.height,
            });
        }
        if display.0 == 0 || display.1 == 0 {
            return Err(LayerError::InvalidDisplay {
                width: display.0,
                height: display.1,
            });
        }
        if !config.fill.is_finite() || config.fill <= 0.0 {
            return Err(LayerError::InvalidFill(config.fill));
        }
        gestures.validate()?;

        let (width, height) = fit_dimensions(buffer.width, buffer.height, display, config.fill);
        let too_large = LayerError::TooLarge { width, height };
        if width as u64 * height as u64 > MAX_LAYER_PIXELS {
            return Err(too_large);
        }
        buffer::expected_len(width, height).map_err(|_| too_large)?;
        let display_buffer = if (width, height) == (buffer.width, buffer.height) {
            buffer.clone()
        } else {
            let rgba = buffer
                .to_rgba_image()
                .ok_or_else(|| LayerError::ResizeFailed("buffer length mismatch".into()))?;
            PixelBuffer::from(imageops::resize(&rgba, width, height, FilterType::Triangle))
        };

        let transform = centered_at((width, height), display);
        tracing::debug!(
            source_width = buffer.width,
            source_height = buffer.height,
            width,
            height,
            x = transform.translate_x,
            y = transform.translate_y,
            "placed layer"
        );

        Self::with_transform(display_buffer, transform, gestures)
    }

    /// Use `buffer` as-is at `transform`.
    pub fn with_transform(
        buffer: PixelBuffer,
        transform: LayerTransform,
        gestures: GestureConfig,
    ) -> Result<Self, LayerError> {
        let engine = TouchTransformEngine::new(
            buffer.width as f64,
            buffer.height as f64,
            transform,
            gestures,
        )?;
        Ok(Self { buffer, engine })
    }

    /// Pixels to draw, already sized for the display.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn engine(&self) -> &TouchTransformEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TouchTransformEngine {
        &mut self.engine
    }

    pub fn handle(&mut self, event: &TouchEvent) -> Effects {
        self.engine.handle(event)
    }

    pub fn transform(&self) -> LayerTransform {
        self.engine.transform()
    }

    pub fn affine(&self) -> Affine {
        self.engine.affine()
    }

    pub fn hit_region(&self) -> Rect {
        self.engine.hit_region()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Argb;

    fn solid(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::filled(width, height, Argb::new(255, 10, 20, 30)).unwrap()
    }

    #[test]
    fn test_fit_dimensions_landscape() {
        // 2000x1000 on 1000x1000: width dominates, 800 wide
        assert_eq!(fit_dimensions(2000, 1000, (1000, 1000), 0.8), (800, 400));
    }

    #[test]
    fn test_fit_dimensions_portrait_upscales() {
        // 100x200 on 1000x500: height dominates, 400 high
        assert_eq!(fit_dimensions(100, 200, (1000, 500), 0.8), (200, 400));
    }

    #[test]
    fn test_fit_dimensions_never_zero() {
        assert_eq!(fit_dimensions(10000, 1, (100, 100), 0.8), (80, 1));
    }

    #[test]
    fn test_centered_at() {
        let t = centered_at((80, 41), (100, 100));
        assert_eq!(t.translate_x, 10.0);
        assert_eq!(t.translate_y, 30.0);
        assert_eq!(t.scale, 1.0);
    }

    #[test]
    fn test_centered_at_oversized_layer() {
        let t = centered_at((300, 100), (100, 100));
        assert_eq!(t.translate_x, -100.0);
    }

    #[test]
    fn test_new_resizes_and_centers() {
        let layer = Layer::new(
            &solid(200, 100),
            (100, 100),
            &LayerConfig::default(),
            GestureConfig::default(),
        )
        .unwrap();
        assert_eq!(layer.buffer().width, 80);
        assert_eq!(layer.buffer().height, 40);
        assert_eq!(layer.transform(), LayerTransform::at(10.0, 30.0));
        assert_eq!(layer.hit_region(), Rect::new(10.0, 30.0, 90.0, 70.0));
        // A uniform source stays uniform after filtering
        assert_eq!(layer.buffer().pixel(0, 0), Some(Argb::new(255, 10, 20, 30)));
    }

    #[test]
    fn test_new_keeps_exact_fit() {
        let layer = Layer::new(
            &solid(80, 40),
            (100, 100),
            &LayerConfig::default(),
            GestureConfig::default(),
        )
        .unwrap();
        assert_eq!(layer.buffer(), &solid(80, 40));
    }

    #[test]
    fn test_new_rejects_bad_input() {
        let config = LayerConfig::default();
        let gestures = GestureConfig::default();

        let malformed = PixelBuffer {
            width: 2,
            height: 2,
            pixels: vec![0; 3],
        };
        assert!(matches!(
            Layer::new(&malformed, (100, 100), &config, gestures),
            Err(LayerError::Buffer(BufferError::InvalidBuffer { .. }))
        ));

        let empty = PixelBuffer::new(0, 10, vec![]).unwrap();
        assert!(matches!(
            Layer::new(&empty, (100, 100), &config, gestures),
            Err(LayerError::EmptyBuffer { .. })
        ));

        assert!(matches!(
            Layer::new(&solid(4, 4), (0, 100), &config, gestures),
            Err(LayerError::InvalidDisplay { .. })
        ));

        let bad_fill = LayerConfig { fill: f64::NAN };
        assert!(matches!(
            Layer::new(&solid(4, 4), (100, 100), &bad_fill, gestures),
            Err(LayerError::InvalidFill(_))
        ));
    }

    #[test]
    fn test_new_rejects_oversized_fit() {
        // 10x10 stretched by a huge fill would need terabytes
        let huge = LayerConfig { fill: 1e9 };
        let result = Layer::new(&solid(10, 10), (100, 100), &huge, GestureConfig::default());
        assert!(matches!(result, Err(LayerError::TooLarge { .. })));

        // Just over the pixel cap, still fine for the address space
        let over = LayerConfig { fill: 1.0 };
        let result = Layer::new(&solid(1, 1), (8193, 8193), &over, GestureConfig::default());
        assert!(matches!(
            result,
            Err(LayerError::TooLarge {
                width: 8193,
                height: 8193
            })
        ));
    }

    #[test]
    fn test_new_rejects_bad_scale_limits() {
        let inverted = GestureConfig {
            min_scale: 5.0,
            max_scale: 0.1,
        };
        assert!(matches!(
            Layer::new(&solid(4, 4), (100, 100), &LayerConfig::default(), inverted),
            Err(LayerError::Config(ConfigError::InvalidScaleLimits { .. }))
        ));

        let nan = GestureConfig {
            min_scale: f64::NAN,
            max_scale: 5.0,
        };
        assert!(matches!(
            Layer::with_transform(solid(4, 4), LayerTransform::default(), nan),
            Err(LayerError::Config(_))
        ));
    }

    #[test]
    fn test_layer_drag() {
        let mut layer = Layer::new(
            &solid(200, 100),
            (100, 100),
            &LayerConfig::default(),
            GestureConfig::default(),
        )
        .unwrap();
        assert!(layer.handle(&TouchEvent::down(0, 50.0, 50.0)).consumed);
        layer.handle(&TouchEvent::moved(vec![crate::gesture::Pointer::new(
            0, 60.0, 45.0,
        )]));
        assert_eq!(layer.transform(), LayerTransform::at(20.0, 25.0));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
