//! Frame acquisition boundary.
//!
//! Camera drivers live outside this crate. Anything that can hand over a
//! [`Frame`] on request implements [`FrameSource`]; the host loop does the rest.

use crate::core_modules::frame::Frame;
use crate::error::DriveError;
use std::path::{Path, PathBuf};
use tracing::debug;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "webp", "tiff"];

/// Supplies one frame per call. May block on device I/O.
pub trait FrameSource {
    /// Returns the next frame, or `DriveError::DeviceUnavailable` if none can be had.
    fn acquire(&mut self) -> Result<Frame, DriveError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn acquire(&mut self) -> Result<Frame, DriveError> {
        (**self).acquire()
    }
}

/// Plays back still images from disk, in order, as if they came from a camera.
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    looping: bool,
}

impl ImageSequenceSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            next: 0,
            looping: false,
        }
    }

    /// Collects every image file directly inside `dir`, sorted by file name.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, DriveError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(DriveError::DeviceUnavailable(format!(
                "no images found in {}",
                dir.as_ref().display()
            )));
        }
        Ok(Self::new(paths))
    }

    /// Restart from the first image instead of running dry.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.paths.len().saturating_sub(self.next)
    }
}

impl FrameSource for ImageSequenceSource {
    fn acquire(&mut self) -> Result<Frame, DriveError> {
        if self.next >= self.paths.len() {
            if self.looping && !self.paths.is_empty() {
                self.next = 0;
            } else {
                return Err(DriveError::DeviceUnavailable("image sequence exhausted".to_string()));
            }
        }

        let path = &self.paths[self.next];
        self.next += 1;
        debug!(path = %path.display(), "loading frame");

        let image = image::open(path)
            .map_err(|e| DriveError::DeviceUnavailable(format!("failed to read {}: {}", path.display(), e)))?;
        Ok(Frame::from(image))
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, rgb: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(4, 3, Rgb(rgb)).save(&path).unwrap();
        path
    }

    #[test]
    fn test_reads_images_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png", [0, 255, 0]);
        write_png(dir.path(), "a.png", [255, 0, 0]);
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let mut source = ImageSequenceSource::from_dir(dir.path()).unwrap();
        assert_eq!(source.len(), 2);

        let first = source.acquire().unwrap();
        assert_eq!((first.width(), first.height()), (4, 3));
        assert_eq!(first.pixel(0, 0).unwrap().to_rgb8(), [255, 0, 0]);
        let second = source.acquire().unwrap();
        assert_eq!(second.pixel(0, 0).unwrap().to_rgb8(), [0, 255, 0]);

        assert!(matches!(source.acquire(), Err(DriveError::DeviceUnavailable(_))));
    }

    #[test]
    fn test_looping_restarts() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "only.png", [1, 2, 3]);
        let mut source = ImageSequenceSource::from_dir(dir.path()).unwrap().looping(true);
        for _ in 0..3 {
            assert!(source.acquire().is_ok());
        }
    }

    #[test]
    fn test_empty_dir_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequenceSource::from_dir(dir.path()),
            Err(DriveError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn test_unreadable_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let mut source = ImageSequenceSource::new(vec![path]);
        assert!(matches!(source.acquire(), Err(DriveError::DeviceUnavailable(_))));
        assert_eq!(source.remaining(), 0);
    }
}
