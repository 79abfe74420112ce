// THEORY:
// The `color_mask` module is the first stage of the perception layer. It turns a
// full-color frame into a binary `Mask` in which a set bit means "this pixel has
// the target color".
//
// Key architectural principles:
// 1.  **Explicit Target**: The color being tracked is a `ColorRange` value handed
//     in by the caller. There is no module-level "selected color".
// 2.  **Per-Pixel Decision**: `extract` looks at each pixel in isolation, converts
//     it into the range's color space when needed, and checks every channel
//     against inclusive bounds. It is a pure function of its inputs.
// 3.  **Optional Cleanup**: `denoise` is a morphological opening (erode, then
//     dilate) that removes speckle smaller than the structuring element while
//     leaving larger regions roughly their original size. It is a separate step so
//     `extract` stays a plain threshold.

use crate::core_modules::frame::Frame;
use crate::core_modules::pixel::pixel::{HUE8_MAX, Pixel};
use serde::{Deserialize, Serialize};

/// The color space a `ColorRange` is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// Raw `[r, g, b]` channels.
    Rgb,
    /// 8-bit `[h, s, v]`, h in 0..=179.
    #[default]
    Hsv,
}

/// Inclusive per-channel bounds selecting the target color.
///
/// In HSV space a `lower` hue greater than the `upper` hue describes an
/// interval that wraps through 0 (reds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRange {
    pub space: ColorSpace,
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorRange {
    pub const fn new(space: ColorSpace, lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { space, lower, upper }
    }

    /// Yellow toy lemon under indoor lighting.
    pub const fn lemon() -> Self {
        Self::new(ColorSpace::Hsv, [20, 100, 100], [30, 255, 255])
    }

    /// Green toy lettuce.
    pub const fn lettuce() -> Self {
        Self::new(ColorSpace::Hsv, [40, 40, 6], [70, 255, 255])
    }

    /// Whether the hue interval wraps through 0.
    pub fn hue_wraps(&self) -> bool {
        self.space == ColorSpace::Hsv && self.lower[0] > self.upper[0]
    }

    /// Checks the bounds themselves, independent of any frame.
    pub fn validate(&self) -> Result<(), String> {
        if self.space == ColorSpace::Hsv && (self.lower[0] > HUE8_MAX || self.upper[0] > HUE8_MAX) {
            return Err(format!("hue bounds must be within 0..={}", HUE8_MAX));
        }
        let first_plain_channel = if self.space == ColorSpace::Hsv { 1 } else { 0 };
        for channel in first_plain_channel..3 {
            if self.lower[channel] > self.upper[channel] {
                return Err(format!(
                    "lower bound {} exceeds upper bound {} on channel {}",
                    self.lower[channel], self.upper[channel], channel
                ));
            }
        }
        Ok(())
    }

    /// Whether a single pixel falls inside this range.
    pub fn contains(&self, pixel: &Pixel) -> bool {
        match self.space {
            ColorSpace::Rgb => self.within_plain(pixel.to_rgb8(), 0),
            ColorSpace::Hsv => {
                let hsv = pixel.to_hsv8();
                let hue = hsv[0];
                let hue_ok = if self.hue_wraps() {
                    hue >= self.lower[0] || hue <= self.upper[0]
                } else {
                    hue >= self.lower[0] && hue <= self.upper[0]
                };
                hue_ok && self.within_plain(hsv, 1)
            }
        }
    }

    fn within_plain(&self, channels: [u8; 3], from: usize) -> bool {
        (from..3).all(|c| channels[c] >= self.lower[c] && channels[c] <= self.upper[c])
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        Self::lemon()
    }
}

/// A binary grid with the same dimensions as the frame it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// An all-unset mask.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Builds a mask from row-major bits. Returns `None` on a length mismatch.
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Option<Self> {
        if bits.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, bits })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reads a bit; anything outside the grid reads as unset.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            self.bits[y as usize * self.width as usize + x as usize] = value;
        }
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }
}

/// Marks every pixel of `frame` whose color lies within `range`.
pub fn extract(frame: &Frame, range: &ColorRange) -> Mask {
    if frame.is_empty() {
        return Mask::empty(frame.width(), frame.height());
    }
    let bits = frame.pixels().map(|pixel| range.contains(&pixel)).collect();
    Mask {
        width: frame.width(),
        height: frame.height(),
        bits,
    }
}

/// Morphological opening with a 3x3 square: `iterations` erosions, then as many dilations.
pub fn denoise(mask: &Mask, iterations: u32) -> Mask {
    let mut current = mask.clone();
    for _ in 0..iterations {
        current = morph(&current, true);
    }
    for _ in 0..iterations {
        current = morph(&current, false);
    }
    current
}

/// One 3x3 pass. Erosion keeps a bit only if its whole neighbourhood is set;
/// dilation sets a bit if any neighbour is set.
fn morph(mask: &Mask, erode: bool) -> Mask {
    let mut out = Mask::empty(mask.width, mask.height);
    for y in 0..mask.height as i64 {
        for x in 0..mask.width as i64 {
            let mut neighbourhood = (-1..=1).flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)));
            let value = if erode {
                neighbourhood.all(|(dx, dy)| mask.get(x + dx, y + dy))
            } else {
                neighbourhood.any(|(dx, dy)| mask.get(x + dx, y + dy))
            };
            out.bits[y as usize * mask.width as usize + x as usize] = value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::PixelFormat;

    const YELLOW: [u8; 3] = [255, 230, 0];
    const BLUE: [u8; 3] = [0, 0, 200];

    #[test]
    fn test_extract_marks_target_pixels() {
        let mut frame = Frame::filled(6, 4, BLUE);
        frame.paint_rect(1, 1, 3, 3, YELLOW);
        let mask = extract(&frame, &ColorRange::lemon());
        assert_eq!(mask.count(), 4);
        assert!(mask.get(1, 1));
        assert!(mask.get(2, 2));
        assert!(!mask.get(0, 0));
        assert!(!mask.get(3, 3));
    }

    #[test]
    fn test_extract_empty_frame() {
        let frame = Frame::new(0, 0, PixelFormat::Rgb8, Vec::new()).unwrap();
        let mask = extract(&frame, &ColorRange::lemon());
        assert_eq!(mask.count(), 0);
        assert!(mask.bits().is_empty());
    }

    #[test]
    fn test_rgb_space_bounds_are_inclusive() {
        let range = ColorRange::new(ColorSpace::Rgb, [10, 10, 10], [20, 20, 20]);
        assert!(range.contains(&Pixel::new(10, 20, 15)));
        assert!(!range.contains(&Pixel::new(9, 20, 15)));
        assert!(!range.contains(&Pixel::new(10, 21, 15)));
    }

    #[test]
    fn test_bgr_frame_matches_same_color() {
        let frame = Frame::new(1, 1, PixelFormat::Bgr8, vec![YELLOW[2], YELLOW[1], YELLOW[0]]).unwrap();
        assert_eq!(extract(&frame, &ColorRange::lemon()).count(), 1);
    }

    #[test]
    fn test_wrapping_hue_range_selects_reds() {
        let red = ColorRange::new(ColorSpace::Hsv, [170, 100, 100], [10, 255, 255]);
        assert!(red.hue_wraps());
        assert!(red.contains(&Pixel::new(255, 0, 0)));
        assert!(red.contains(&Pixel::new(255, 0, 40)));
        assert!(!red.contains(&Pixel::new(0, 255, 0)));
    }

    #[test]
    fn test_validate_rejects_inverted_value_bounds() {
        let range = ColorRange::new(ColorSpace::Hsv, [20, 200, 100], [30, 100, 255]);
        assert!(range.validate().is_err());
        assert!(ColorRange::lemon().validate().is_ok());
        assert!(ColorRange::lettuce().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_hue() {
        let range = ColorRange::new(ColorSpace::Hsv, [20, 0, 0], [200, 255, 255]);
        assert!(range.validate().is_err());
    }

    #[test]
    fn test_denoise_removes_speckle_keeps_block() {
        let mut mask = Mask::empty(12, 12);
        mask.set(0, 11, true);
        for y in 2..9 {
            for x in 2..9 {
                mask.set(x, y, true);
            }
        }
        let cleaned = denoise(&mask, 1);
        assert!(!cleaned.get(0, 11));
        assert_eq!(cleaned.count(), 49);
    }

    #[test]
    fn test_denoise_zero_iterations_is_identity() {
        let mut mask = Mask::empty(3, 3);
        mask.set(1, 1, true);
        assert_eq!(denoise(&mask, 0), mask);
    }
}
