//! Error types for beacon_drive.

use thiserror::Error;

/// Everything that can go wrong between acquiring a frame and sending a command.
///
/// Losing sight of the target is not in here: that is a normal tracking state
/// and always resolves to a stop command.
#[derive(Error, Debug)]
pub enum DriveError {
    /// Frame dimensions that cannot be normalized against (zero width or height).
    #[error("invalid frame geometry: {width}x{height}")]
    InvalidFrameGeometry { width: u32, height: u32 },

    /// Pixel buffer length does not match the declared frame size.
    #[error("frame buffer size mismatch: expected {expected} bytes, got {actual}")]
    FrameBufferMismatch { expected: usize, actual: usize },

    /// The frame source could not deliver a frame.
    #[error("frame source unavailable: {0}")]
    DeviceUnavailable(String),

    /// The vehicle link rejected or could not carry a command.
    #[error("vehicle link unavailable: {0}")]
    LinkUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl DriveError {
    /// Errors that end only the current cycle; the host loop keeps running.
    pub fn is_cycle_local(&self) -> bool {
        matches!(
            self,
            DriveError::InvalidFrameGeometry { .. } | DriveError::FrameBufferMismatch { .. }
        )
    }
}
