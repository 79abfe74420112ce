// THEORY:
// A `Blob` is the summary of one contiguous region of target-colored pixels in a
// single frame. Like `Pixel` and `Frame`, it is a "dumb" data container: it has
// no memory of earlier frames and no idea whether it is the object being tracked.
// The locator guarantees `area >= min_area` for any blob it hands out.

/// A pixel coordinate on the mask grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// Sub-pixel location of a blob's center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

/// A single, spatially coherent region of target color detected in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    /// Mean position of every pixel in the region.
    pub centroid: Centroid,
    /// Pixel count.
    pub area: usize,
    /// Top-left and bottom-right corners, both inclusive.
    pub bounding_box: (Point, Point),
}

impl Blob {
    /// A blob with only a centroid and an area, for callers that have no mask.
    pub fn at(x: f64, y: f64, area: usize) -> Self {
        let corner = Point {
            x: x.max(0.0) as u32,
            y: y.max(0.0) as u32,
        };
        Self {
            centroid: Centroid { x, y },
            area,
            bounding_box: (corner, corner),
        }
    }

    pub fn width(&self) -> u32 {
        self.bounding_box.1.x - self.bounding_box.0.x + 1
    }

    pub fn height(&self) -> u32 {
        self.bounding_box.1.y - self.bounding_box.0.y + 1
    }
}
