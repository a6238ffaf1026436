//! Brightness and contrast filters.
//!
//! ## Pipeline Order
//! 1. Brightness
//! 2. Contrast
//! 3. Luminance-to-alpha (optional, see [`crate::luminance`])
//!
//! Every filter reads one buffer and allocates a fresh output. A pixel's
//! result depends only on that pixel, which is what lets the `parallel`
//! feature split the work by rows.

use crate::buffer::{Argb, BufferError, PixelBuffer, CHANNELS};
use crate::luminance::to_luminance_alpha;
use crate::FilterSettings;

/// Shift R/G/B by `delta`, clamping each channel to 0..=255.
///
/// Alpha is left untouched.
pub fn brightness(buffer: &PixelBuffer, delta: i32) -> Result<PixelBuffer, BufferError> {
    let _span = tracing::debug_span!("brightness", delta).entered();
    map_pixels(buffer, |px| brightness_pixel(px, delta))
}

/// Apply the contrast curve.
///
/// `amount_percent` is added to 100 and squared into a factor:
/// `factor = ((100 + amount) / 100)^2`, so 0 is the identity and +100 gives
/// a factor of 4. Each channel is mapped through
/// `round(((c / 255 - 0.5) * factor + 0.5) * 255)` and clamped.
pub fn contrast(buffer: &PixelBuffer, amount_percent: f64) -> Result<PixelBuffer, BufferError> {
    let _span = tracing::debug_span!("contrast", amount_percent).entered();
    let lut = contrast_lut(contrast_factor(amount_percent));
    map_pixels(buffer, |px| Argb {
        a: px.a,
        r: lut[px.r as usize],
        g: lut[px.g as usize],
        b: lut[px.b as usize],
    })
}

/// Brightness followed by contrast.
pub fn compose(
    buffer: &PixelBuffer,
    brightness_delta: i32,
    contrast_percent: f64,
) -> Result<PixelBuffer, BufferError> {
    let brightened = brightness(buffer, brightness_delta)?;
    contrast(&brightened, contrast_percent)
}

/// Run the full layer pipeline described by `settings`.
///
/// # Example
/// ```ignore
/// let display = process(&cropped, &FilterSettings::default())?;
/// ```
pub fn process(
    buffer: &PixelBuffer,
    settings: &FilterSettings,
) -> Result<PixelBuffer, BufferError> {
    let composed = compose(buffer, settings.brightness, settings.contrast)?;
    if settings.transparency {
        to_luminance_alpha(&composed)
    } else {
        Ok(composed)
    }
}

#[inline]
fn brightness_pixel(px: Argb, delta: i32) -> Argb {
    let shift = |c: u8| (c as i32).saturating_add(delta).clamp(0, 255) as u8;
    Argb {
        a: px.a,
        r: shift(px.r),
        g: shift(px.g),
        b: shift(px.b),
    }
}

/// `((100 + amount) / 100)^2`
#[inline]
pub fn contrast_factor(amount_percent: f64) -> f64 {
    ((100.0 + amount_percent) / 100.0).powi(2)
}

/// Contrast curve for a single channel value.
///
/// `(c - 127.5) * factor + 127.5` is the same curve as
/// `((c / 255 - 0.5) * factor + 0.5) * 255` without the divide, so the
/// identity factor reproduces every input exactly.
#[inline]
pub fn contrast_channel(c: u8, factor: f64) -> u8 {
    let v = (c as f64 - 127.5) * factor + 127.5;
    if v.is_nan() {
        return c;
    }
    v.round().clamp(0.0, 255.0) as u8
}

fn contrast_lut(factor: f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, out) in lut.iter_mut().enumerate() {
        *out = contrast_channel(i as u8, factor);
    }
    lut
}

/// Validate `buffer` and build a new one by mapping every pixel.
pub(crate) fn map_pixels<F>(buffer: &PixelBuffer, f: F) -> Result<PixelBuffer, BufferError>
where
    F: Fn(Argb) -> Argb + Sync,
{
    buffer.validate()?;
    let mut output = vec![0u8; buffer.pixels.len()];
    map_rows(&buffer.pixels, &mut output, buffer.width as usize * CHANNELS, &f);
    Ok(PixelBuffer {
        width: buffer.width,
        height: buffer.height,
        pixels: output,
    })
}

#[cfg(not(feature = "parallel"))]
fn map_rows<F>(src: &[u8], dst: &mut [u8], _row_len: usize, f: &F)
where
    F: Fn(Argb) -> Argb + Sync,
{
    map_chunk(src, dst, f);
}

#[cfg(feature = "parallel")]
fn map_rows<F>(src: &[u8], dst: &mut [u8], row_len: usize, f: &F)
where
    F: Fn(Argb) -> Argb + Sync,
{
    use rayon::prelude::*;

    if row_len == 0 {
        return;
    }
    dst.par_chunks_mut(row_len)
        .zip(src.par_chunks(row_len))
        .for_each(|(out_row, in_row)| map_chunk(in_row, out_row, f));
}

#[inline]
fn map_chunk<F>(src: &[u8], dst: &mut [u8], f: &F)
where
    F: Fn(Argb) -> Argb,
{
    for (out, px) in dst
        .chunks_exact_mut(CHANNELS)
        .zip(src.chunks_exact(CHANNELS))
    {
        f(Argb::from_rgba(px)).write_rgba(out);
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
