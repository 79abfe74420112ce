//! Synthetic frames shared by the integration tests.

#![allow(dead_code)]

use beacon_drive::Frame;
use image::{Rgb, RgbImage};

pub const BACKGROUND: [u8; 3] = [30, 40, 90];
pub const LEMON: [u8; 3] = [250, 220, 20];

/// A frame of `BACKGROUND` with each `(x0, y0, x1, y1)` rectangle (end-exclusive)
/// filled with `LEMON`.
pub fn frame_with_rects(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> Frame {
    let image = RgbImage::from_fn(width, height, |x, y| {
        let inside = rects
            .iter()
            .any(|&(x0, y0, x1, y1)| x >= x0 && x < x1 && y >= y0 && y < y1);
        Rgb(if inside { LEMON } else { BACKGROUND })
    });
    Frame::from(image)
}

/// A 640x480 frame with a lemon square of side `2 * half` centered on `(cx, cy)`.
pub fn frame_with_square(cx: u32, cy: u32, half: u32) -> Frame {
    frame_with_rects(
        640,
        480,
        &[(cx.saturating_sub(half), cy.saturating_sub(half), cx + half, cy + half)],
    )
}
