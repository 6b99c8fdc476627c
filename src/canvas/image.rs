use std::path::Path;
use std::sync::Arc;

use super::Color;

/// Decoded RGBA8 image. Cloning shares the pixel buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    rgba: Arc<Vec<u8>>,
}

impl Image {
    /// Wrap raw RGBA8 pixels. Returns `None` if the buffer length does not
    /// match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self { width, height, rgba: Arc::new(rgba) })
    }

    /// Caller guarantees `rgba.len() == width * height * 4`.
    pub(crate) fn from_parts(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width as usize) * (height as usize) * 4);
        Self { width, height, rgba: Arc::new(rgba) }
    }

    /// Single-color image, handy for placeholders and tests.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let rgba = color.0.repeat((width * height) as usize);
        Self { width, height, rgba: Arc::new(rgba) }
    }

    /// Decode an encoded image (PNG) from memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self { width, height, rgba: Arc::new(img.into_raw()) })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self { width, height, rgba: Arc::new(img.into_raw()) })
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn rgba(&self) -> &[u8] { &self.rgba }

    /// Pixel at `(x, y)`; transparent outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Color([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }
}
