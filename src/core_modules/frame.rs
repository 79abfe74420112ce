// THEORY:
// A `Frame` is one captured image, owned by the pipeline for exactly one cycle.
// It is an immutable, interleaved byte buffer plus the geometry and channel
// layout needed to read pixels back out of it. The only way to build one is
// through a constructor that checks the buffer length against the geometry, so
// every later stage can index without bounds surprises.

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::DriveError;
use image::{DynamicImage, RgbImage};

/// Byte layout of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// RGB 8-bit per channel.
    #[default]
    Rgb8,
    /// BGR 8-bit per channel, the usual camera-driver order.
    Bgr8,
    /// RGBA 8-bit per channel; alpha is ignored.
    Rgba8,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// An immutable 2D grid of pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps a raw buffer, rejecting it if its length does not match `width * height`.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self, DriveError> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(DriveError::FrameBufferMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// A frame filled with a single RGB color. Handy for synthetic sources.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let data = rgb.iter().copied().cycle().take(pixels * 3).collect();
        Self {
            width,
            height,
            format: PixelFormat::Rgb8,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Reads the pixel at `(x, y)`, normalizing channel order to RGB.
    ///
    /// Returns `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let start = (y as usize * self.width as usize + x as usize) * bpp;
        let bytes = &self.data[start..start + bpp];
        Some(match self.format {
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => Pixel::new(bytes[0], bytes[1], bytes[2]),
            PixelFormat::Bgr8 => Pixel::new(bytes[2], bytes[1], bytes[0]),
        })
    }

    /// Iterates over all pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        let bpp = self.format.bytes_per_pixel();
        let format = self.format;
        self.data.chunks_exact(bpp).map(move |bytes| match format {
            PixelFormat::Bgr8 => Pixel::new(bytes[2], bytes[1], bytes[0]),
            _ => Pixel::from(bytes),
        })
    }

    /// Overwrites an axis-aligned rectangle with one RGB color, clipped to the frame.
    #[cfg(test)]
    pub(crate) fn paint_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, rgb: [u8; 3]) {
        let bpp = self.format.bytes_per_pixel();
        let channels = match self.format {
            PixelFormat::Bgr8 => [rgb[2], rgb[1], rgb[0]],
            _ => rgb,
        };
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                let start = (y as usize * self.width as usize + x as usize) * bpp;
                self.data[start..start + 3].copy_from_slice(&channels);
            }
        }
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            format: PixelFormat::Rgb8,
            data: image.into_raw(),
        }
    }
}

impl From<DynamicImage> for Frame {
    fn from(image: DynamicImage) -> Self {
        Frame::from(image.to_rgb8())
    }
}
