//! Pixel formats and CPU-side images
//!
//! An [`Image`] is the caller-owned destination of a frame copy: the camera
//! renders into its target, then `copy()` extracts the pixels into an Image.
//! Allocation and extraction are separate steps: `Image::new` allocates a
//! zeroed buffer and never touches the target.

use crate::error::{Error, Result};

/// Pixel format of a render target or image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    /// 8-bit luminance
    L8,
    /// 16-bit luminance
    L16,
    /// 24-bit RGB
    R8G8B8,
    /// 24-bit BGR
    B8G8R8,
    /// 32-bit RGBA
    R8G8B8A8,
    /// 32-bit BGRA
    B8G8R8A8,
    /// Single 32-bit float channel (depth-style data)
    R32_SFLOAT,
    /// Three 32-bit float channels (ray sensor frames)
    R32G32B32_SFLOAT,
}

impl PixelFormat {
    /// Number of channels per pixel
    pub fn channel_count(self) -> u32 {
        match self {
            PixelFormat::L8 | PixelFormat::L16 | PixelFormat::R32_SFLOAT => 1,
            PixelFormat::R8G8B8 | PixelFormat::B8G8R8 | PixelFormat::R32G32B32_SFLOAT => 3,
            PixelFormat::R8G8B8A8 | PixelFormat::B8G8R8A8 => 4,
        }
    }

    /// Size of one channel in bytes
    pub fn bytes_per_channel(self) -> u32 {
        match self {
            PixelFormat::L8
            | PixelFormat::R8G8B8
            | PixelFormat::B8G8R8
            | PixelFormat::R8G8B8A8
            | PixelFormat::B8G8R8A8 => 1,
            PixelFormat::L16 => 2,
            PixelFormat::R32_SFLOAT | PixelFormat::R32G32B32_SFLOAT => 4,
        }
    }

    /// Size of one pixel in bytes
    pub fn bytes_per_pixel(self) -> u32 {
        self.channel_count() * self.bytes_per_channel()
    }

    /// True for float-channel formats
    pub fn is_float(self) -> bool {
        matches!(self, PixelFormat::R32_SFLOAT | PixelFormat::R32G32B32_SFLOAT)
    }

    /// Stable string name of the format
    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::L8 => "L8",
            PixelFormat::L16 => "L16",
            PixelFormat::R8G8B8 => "R8G8B8",
            PixelFormat::B8G8R8 => "B8G8R8",
            PixelFormat::R8G8B8A8 => "R8G8B8A8",
            PixelFormat::B8G8R8A8 => "B8G8R8A8",
            PixelFormat::R32_SFLOAT => "R32_SFLOAT",
            PixelFormat::R32G32B32_SFLOAT => "R32G32B32_SFLOAT",
        }
    }
}

/// CPU-side image: dimensions, format, and an owned byte buffer.
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Image {
    /// Allocate a zeroed image of the given dimensions and format.
    ///
    /// No pixel data is copied; this is pure allocation.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let size = width as usize * height as usize * format.bytes_per_pixel() as usize;
        Self {
            width,
            height,
            format,
            data: vec![0; size],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel format
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Total buffer size in bytes
    pub fn memory_size(&self) -> usize {
        self.data.len()
    }

    /// Raw pixel bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw pixel bytes
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Replace the pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not match `width * height *
    /// bytes_per_pixel`.
    pub fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
        let expected =
            self.width as usize * self.height as usize * self.format.bytes_per_pixel() as usize;
        if data.len() != expected {
            return Err(Error::InvalidResource(format!(
                "image data size {} does not match expected {} ({}x{} {})",
                data.len(),
                expected,
                self.width,
                self.height,
                self.format.name()
            )));
        }
        self.data = data;
        Ok(())
    }

    /// Reinterpret the buffer as f32 samples (float formats only).
    ///
    /// Returns None for byte formats or if the buffer happens to be
    /// misaligned for f32 access.
    pub fn float_data(&self) -> Option<&[f32]> {
        if !self.format.is_float() {
            return None;
        }
        bytemuck::try_cast_slice(&self.data).ok()
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
