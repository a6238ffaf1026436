//! Perceptual luminance and the luminance-to-alpha conversion.
//!
//! Uses the ITU-R BT.601 weights (0.299, 0.587, 0.114). Photographed layers
//! are converted so bright areas turn transparent and dark strokes stay
//! opaque, letting stacked layers show through one another.

use crate::adjustments::map_pixels;
use crate::buffer::{Argb, BufferError, PixelBuffer};

/// BT.601 weight for the red channel, in thousandths.
pub const LUMA_R: u32 = 299;

/// BT.601 weight for the green channel, in thousandths.
pub const LUMA_G: u32 = 587;

/// BT.601 weight for the blue channel, in thousandths.
pub const LUMA_B: u32 = 114;

/// Integer part of `0.299 R + 0.587 G + 0.114 B`.
///
/// Computed in fixed point so that pure white lands on exactly 255.
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let sum = LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32;
    // Weights sum to 1000, so the quotient is at most 255.
    (sum / 1000) as u8
}

/// Alpha for one pixel: `255 - luma`, color channels untouched.
#[inline]
pub fn luminance_alpha(px: Argb) -> Argb {
    Argb {
        a: 255 - luma_u8(px.r, px.g, px.b),
        ..px
    }
}

/// Convert a buffer into a translucency mask.
///
/// Every pixel's alpha becomes `255 - L` where `L` is its luminance; the
/// source alpha is discarded. R/G/B pass through unchanged, so applying the
/// conversion twice gives the same result as applying it once.
pub fn to_luminance_alpha(buffer: &PixelBuffer) -> Result<PixelBuffer, BufferError> {
    let _span =
        tracing::debug_span!("to_luminance_alpha", width = buffer.width, height = buffer.height)
            .entered();
    map_pixels(buffer, luminance_alpha)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
