//! CPU render target: a plain byte buffer with deferred resize.
//!
//! Size and format changes are recorded immediately but the buffer is only
//! reallocated at `pre_render()`, matching the contract that configuration
//! takes effect at the next frame.

use std::any::Any;
use std::sync::Arc;
use spectra_render_engine::spectra::{Error, Result};
use spectra_render_engine::image::{Image, PixelFormat};
use spectra_render_engine::target::{PassList, RenderPass, RenderTarget};

/// Render target backed by a heap byte buffer.
pub struct HeadlessRenderTarget {
    width: u32,
    height: u32,
    format: PixelFormat,
    buffer: Vec<u8>,
    rendered: bool,
    passes: PassList,
}

impl HeadlessRenderTarget {
    /// Create a target; the buffer is allocated at the first `pre_render()`.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            buffer: Vec::new(),
            rendered: false,
            passes: PassList::new(),
        }
    }

    fn buffer_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel() as usize
    }

    /// Direct access to the pixel buffer for the rendering camera.
    ///
    /// Allocates on demand so a camera may render without an explicit
    /// `pre_render()` first.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        let size = self.buffer_size();
        if self.buffer.len() != size {
            self.buffer = vec![0; size];
        }
        self.rendered = true;
        &mut self.buffer
    }

    /// Fill every pixel with a solid RGB color, honoring the channel order
    /// of the current format. Float and luminance formats store the
    /// luma-weighted grey value.
    pub fn fill_solid(&mut self, color: [u8; 3]) {
        let [r, g, b] = color;
        let format = self.format;
        let buffer = self.buffer_mut();
        match format {
            PixelFormat::R8G8B8 => {
                for pixel in buffer.chunks_exact_mut(3) {
                    pixel.copy_from_slice(&[r, g, b]);
                }
            }
            PixelFormat::B8G8R8 => {
                for pixel in buffer.chunks_exact_mut(3) {
                    pixel.copy_from_slice(&[b, g, r]);
                }
            }
            PixelFormat::R8G8B8A8 => {
                for pixel in buffer.chunks_exact_mut(4) {
                    pixel.copy_from_slice(&[r, g, b, 255]);
                }
            }
            PixelFormat::B8G8R8A8 => {
                for pixel in buffer.chunks_exact_mut(4) {
                    pixel.copy_from_slice(&[b, g, r, 255]);
                }
            }
            PixelFormat::L8 => {
                let grey = luminance(r, g, b);
                buffer.fill(grey);
            }
            PixelFormat::L16 => {
                let grey = u16::from(luminance(r, g, b)) * 257;
                for pixel in buffer.chunks_exact_mut(2) {
                    pixel.copy_from_slice(&grey.to_ne_bytes());
                }
            }
            PixelFormat::R32_SFLOAT => {
                let grey = f32::from(luminance(r, g, b)) / 255.0;
                for pixel in buffer.chunks_exact_mut(4) {
                    pixel.copy_from_slice(&grey.to_ne_bytes());
                }
            }
            PixelFormat::R32G32B32_SFLOAT => {
                let channels = [
                    f32::from(r) / 255.0,
                    f32::from(g) / 255.0,
                    f32::from(b) / 255.0,
                ];
                for pixel in buffer.chunks_exact_mut(12) {
                    for (chunk, channel) in pixel.chunks_exact_mut(4).zip(channels) {
                        chunk.copy_from_slice(&channel.to_ne_bytes());
                    }
                }
            }
        }
    }
}

/// Integer BT.601 luma approximation
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000) as u8
}

impl RenderTarget for HeadlessRenderTarget {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    fn set_format(&mut self, format: PixelFormat) {
        self.format = format;
    }

    fn pre_render(&mut self) {
        let size = self.buffer_size();
        if self.buffer.len() != size {
            self.buffer = vec![0; size];
            self.rendered = false;
        }
    }

    fn post_render(&mut self) {
        // CPU buffer: nothing to flush
    }

    fn copy(&self, image: &mut Image) -> Result<()> {
        if !self.rendered || self.buffer.len() != self.buffer_size() {
            return Err(Error::InvalidResource(
                "no rendered frame to copy".to_string(),
            ));
        }
        if image.width() != self.width
            || image.height() != self.height
            || image.format() != self.format
        {
            *image = Image::new(self.width, self.height, self.format);
        }
        image.data_mut().copy_from_slice(&self.buffer);
        Ok(())
    }

    fn add_render_pass(&mut self, pass: Arc<dyn RenderPass>) {
        self.passes.add(pass);
    }

    fn remove_render_pass(&mut self, pass: &Arc<dyn RenderPass>) {
        self.passes.remove(pass);
    }

    fn render_pass_count(&self) -> usize {
        self.passes.count()
    }

    fn render_pass_by_index(&self, index: usize) -> Option<Arc<dyn RenderPass>> {
        self.passes.by_index(index)
    }
}
