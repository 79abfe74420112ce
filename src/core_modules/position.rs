// THEORY:
// The `position` module moves a blob from pixel space into a frame-independent
// control space. The frame center is (0, 0), the left and top edges are -1, the
// right and bottom edges are +1. Everything downstream works in this space, so it
// does not care what resolution the camera runs at.

use crate::core_modules::blob::Blob;
use crate::error::DriveError;

/// Offset of the tracked object from frame center, each axis in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPosition {
    /// Negative is left of center, positive is right.
    pub horizontal: f64,
    /// Negative is above center, positive is below (image rows grow downward).
    pub vertical: f64,
}

impl NormalizedPosition {
    pub const CENTER: Self = Self {
        horizontal: 0.0,
        vertical: 0.0,
    };

    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self { horizontal, vertical }
    }
}

/// Maps a blob centroid to normalized axes.
///
/// Centroids that land outside the frame are clamped to the edge. A frame with
/// zero width or height has no center and is rejected.
pub fn normalize(blob: &Blob, frame_width: u32, frame_height: u32) -> Result<NormalizedPosition, DriveError> {
    if frame_width == 0 || frame_height == 0 {
        return Err(DriveError::InvalidFrameGeometry {
            width: frame_width,
            height: frame_height,
        });
    }

    let half_width = frame_width as f64 / 2.0;
    let half_height = frame_height as f64 / 2.0;

    Ok(NormalizedPosition {
        horizontal: ((blob.centroid.x - half_width) / half_width).clamp(-1.0, 1.0),
        vertical: ((blob.centroid.y - half_height) / half_height).clamp(-1.0, 1.0),
    })
}
