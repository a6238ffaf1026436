//! Layerkit Core - photo compositing library
//!
//! This crate provides the per-pixel filters that turn a cropped photo into a
//! semi-transparent layer, and the touch engine that lets a user drag, pinch
//! and rotate layers on top of each other.
//!
//! # Module Structure
//!
//! - `buffer` - RGBA pixel buffers and the `Argb` pixel value
//! - `adjustments` - Brightness, contrast and the full filter pipeline
//! - `luminance` - Luminance-to-alpha conversion
//! - `gesture` - Touch events, gesture state machine and layer transforms
//! - `layer` - A processed buffer placed on the display
//! - `composition` - A stack of layers with touch routing

pub mod adjustments;
pub mod buffer;
pub mod composition;
pub mod gesture;
pub mod layer;
pub mod luminance;

pub use adjustments::{brightness, compose, contrast, process};
pub use buffer::{Argb, BufferError, PixelBuffer};
pub use composition::{Composition, LayerId};
pub use gesture::{
    Effects, GestureInputError, GestureState, LayerTransform, Pointer, PointerId, TouchAction,
    TouchEvent, TouchTransformEngine,
};
pub use layer::{Layer, LayerConfig, LayerError};
pub use luminance::to_luminance_alpha;

/// Filter settings applied to a cropped photo before it becomes a layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Added to each color channel (-255 to 255)
    pub brightness: i32,
    /// Contrast amount in percent (-100 = flat gray, 0 = unchanged)
    pub contrast: f64,
    /// Turn brightness into transparency as the last step
    pub transparency: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            brightness: 50,
            contrast: 100.0,
            transparency: true,
        }
    }
}

impl FilterSettings {
    /// Create settings with the default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings that leave the image untouched
    pub fn identity() -> Self {
        Self {
            brightness: 0,
            contrast: 0.0,
            transparency: false,
        }
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Limits for pinch-zoom.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Smallest allowed layer scale
    pub min_scale: f64,
    /// Largest allowed layer scale
    pub max_scale: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 5.0,
        }
    }
}

impl GestureConfig {
    /// Check that the limits are finite and `0 < min_scale <= max_scale`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_scale, self.max_scale);
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(ConfigError::InvalidScaleLimits {
                min_scale: min,
                max_scale: max,
            });
        }
        Ok(())
    }

    /// Bring `scale` within the limits. NaN maps to `min_scale`.
    #[inline]
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.max(self.min_scale).min(self.max_scale)
    }
}

/// Error type for rejected configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid scale limits: min {min_scale}, max {max_scale}")]
    InvalidScaleLimits { min_scale: f64, max_scale: f64 },
}
