//! Owned pixel buffer shared by every stage of the pipeline.
//!
//! Pixels are stored as interleaved `R, G, B, A` bytes in row-major order,
//! the layout used by `image::RgbaImage` and by canvas `ImageData`. Single
//! pixels are exchanged as [`Argb`] values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of bytes per pixel in a [`PixelBuffer`].
pub const CHANNELS: usize = 4;

/// Error returned when a pixel buffer's dimensions and data disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The pixel data length doesn't match `width * height * 4`.
    #[error("Invalid pixel buffer: {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// `width * height * 4` doesn't fit in memory addressing.
    #[error("Invalid pixel buffer: {width}x{height} is too large")]
    TooLarge { width: u32, height: u32 },
}

/// A single 8-bit pixel with alpha, red, green and blue channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Unpack a `0xAARRGGBB` color.
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            a: (packed >> 24) as u8,
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    /// Pack into `0xAARRGGBB`.
    pub const fn to_u32(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    #[inline]
    pub(crate) fn from_rgba(chunk: &[u8]) -> Self {
        Self::new(chunk[3], chunk[0], chunk[1], chunk[2])
    }

    #[inline]
    pub(crate) fn write_rgba(self, chunk: &mut [u8]) {
        chunk[0] = self.r;
        chunk[1] = self.g;
        chunk[2] = self.b;
        chunk[3] = self.a;
    }
}

/// Expected byte length for a `width x height` buffer.
pub fn expected_len(width: u32, height: u32) -> Result<usize, BufferError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(BufferError::TooLarge { width, height })
}

/// A dense RGBA pixel buffer.
///
/// The fields are public so hosts can hand over data without copying;
/// every filter re-checks the length with [`PixelBuffer::validate`] before
/// reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA data in row-major order (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap existing RGBA data, rejecting a length mismatch.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BufferError> {
        let buffer = Self {
            width,
            height,
            pixels,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// A buffer where every pixel has the same color.
    pub fn filled(width: u32, height: u32, color: Argb) -> Result<Self, BufferError> {
        let len = expected_len(width, height)?;
        let mut pixels = vec![0u8; len];
        for chunk in pixels.chunks_exact_mut(CHANNELS) {
            color.write_rgba(chunk);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a buffer from packed `0xAARRGGBB` values, one per pixel.
    pub fn from_argb_u32(width: u32, height: u32, colors: &[u32]) -> Result<Self, BufferError> {
        let expected = expected_len(width, height)?;
        if colors.len() * CHANNELS != expected {
            return Err(BufferError::InvalidBuffer {
                width,
                height,
                expected,
                actual: colors.len() * CHANNELS,
            });
        }
        let mut pixels = vec![0u8; expected];
        for (chunk, &packed) in pixels.chunks_exact_mut(CHANNELS).zip(colors) {
            Argb::from_u32(packed).write_rgba(chunk);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Check that the data length matches the dimensions.
    pub fn validate(&self) -> Result<(), BufferError> {
        let expected = expected_len(self.width, self.height)?;
        if self.pixels.len() != expected {
            return Err(BufferError::InvalidBuffer {
                width: self.width,
                height: self.height,
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check if this buffer has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Read the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Argb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        self.pixels.get(idx..idx + CHANNELS).map(Argb::from_rgba)
    }

    /// Overwrite the pixel at `(x, y)`. Returns `false` when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Argb) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        match self.pixels.get_mut(idx..idx + CHANNELS) {
            Some(chunk) => {
                color.write_rgba(chunk);
                true
            }
            None => false,
        }
    }

    /// Iterate over all pixels in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Argb> + '_ {
        self.pixels.chunks_exact(CHANNELS).map(Argb::from_rgba)
    }

    /// Pack every pixel into `0xAARRGGBB`.
    pub fn to_argb_u32(&self) -> Vec<u32> {
        self.iter().map(Argb::to_u32).collect()
    }

    /// Convert to an `image::RgbaImage`, or `None` if the buffer is malformed.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }
}

impl From<image::RgbaImage> for PixelBuffer {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}
