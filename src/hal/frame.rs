//! Preview frame snapshot used for light-intensity diagnostics.

use crate::geometry::Size;
use std::time::Instant;

/// Bytes per pixel for packed RGB frames.
pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// A single RGB frame sampled from the live preview stream.
#[derive(Clone)]
pub struct Frame {
    /// Packed RGB pixel data, 3 bytes per pixel.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Sample timestamp.
    timestamp: Instant,
}

impl Frame {
    /// A frame over raw RGB pixel data.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Returns a reference to the packed RGB data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    /// Frame dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    /// When the frame was produced.
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Validates that the buffer length matches the dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == (self.width as usize) * (self.height as usize) * RGB_BYTES_PER_PIXEL
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}
