// THEORY:
// The `BlobLocator` is the spatial grouping stage. It takes the binary mask from
// the color stage and answers one question: where is the biggest patch of target
// color, if there is one worth trusting?
//
// Algorithm:
// 1.  **Seeding**: Scan the mask in row-major order. Every set pixel that has not
//     been visited yet starts a new region. Because of the scan order, the seed is
//     the region's top-most pixel (left-most among ties), which gives each region a
//     stable "first pixel" used for tie-breaking.
// 2.  **Region Growing**: From the seed, a depth-first flood fill collects every set
//     pixel reachable through any of the 8 neighbours. Diagonal steps are allowed so
//     that thin diagonal edges of a real object do not split it into pieces.
// 3.  **Aggregation**: While growing, the region keeps a running pixel count,
//     coordinate sums and a bounding box, so nothing but the `visited` grid and the
//     work stack scales with region size.
// 4.  **Selection**: Regions smaller than `min_area` are noise and are dropped. Of the
//     rest, the largest wins; on equal area the region whose seed came first in the
//     scan wins. The outcome does not depend on anything but the mask.
// 5.  **Stateless Utility**: No memory of previous frames. An empty mask is simply
//     "nothing found".

use crate::core_modules::blob::{Blob, Centroid, Point};
use crate::core_modules::color_mask::Mask;

pub mod blob_locator {
    use super::*;

    /// The eight neighbour offsets, diagonals included.
    const NEIGHBOURS_8: [(i64, i64); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];

    /// Running totals for a region while it is being grown.
    struct RegionStats {
        seed: Point,
        area: usize,
        sum_x: u64,
        sum_y: u64,
        min: Point,
        max: Point,
    }

    impl RegionStats {
        fn new(seed: Point) -> Self {
            Self {
                seed,
                area: 0,
                sum_x: 0,
                sum_y: 0,
                min: seed,
                max: seed,
            }
        }

        fn add(&mut self, p: Point) {
            self.area += 1;
            self.sum_x += p.x as u64;
            self.sum_y += p.y as u64;
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        }

        /// Row-major position of the seed; smaller means scanned earlier.
        fn scan_key(&self) -> (u32, u32) {
            (self.seed.y, self.seed.x)
        }

        fn into_blob(self) -> Blob {
            Blob {
                centroid: Centroid {
                    x: self.sum_x as f64 / self.area as f64,
                    y: self.sum_y as f64 / self.area as f64,
                },
                area: self.area,
                bounding_box: (self.min, self.max),
            }
        }
    }

    /// Returns the largest 8-connected region with at least `min_area` pixels.
    pub fn locate(mask: &Mask, min_area: usize) -> Option<Blob> {
        let mut best: Option<RegionStats> = None;
        for region in find_regions(mask) {
            if region.area < min_area {
                continue;
            }
            let replace = match &best {
                Some(current) => {
                    region.area > current.area
                        || (region.area == current.area && region.scan_key() < current.scan_key())
                }
                None => true,
            };
            if replace {
                best = Some(region);
            }
        }
        best.map(RegionStats::into_blob)
    }

    /// Returns every 8-connected region, in seed scan order, regardless of size.
    pub fn find_blobs(mask: &Mask) -> Vec<Blob> {
        find_regions(mask).into_iter().map(RegionStats::into_blob).collect()
    }

    fn find_regions(mask: &Mask) -> Vec<RegionStats> {
        let width = mask.width() as usize;
        let height = mask.height() as usize;
        let bits = mask.bits();
        let mut visited = vec![false; width * height];
        let mut regions = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let index = y * width + x;
                if !bits[index] || visited[index] {
                    continue;
                }
                let seed = Point {
                    x: x as u32,
                    y: y as u32,
                };
                regions.push(grow_region(seed, mask, &mut visited));
            }
        }
        regions
    }

    /// Flood-fills one region from its seed.
    fn grow_region(seed: Point, mask: &Mask, visited: &mut [bool]) -> RegionStats {
        let width = mask.width() as usize;
        let mut stats = RegionStats::new(seed);
        let mut stack: Vec<Point> = vec![seed];
        visited[seed.y as usize * width + seed.x as usize] = true;

        while let Some(current) = stack.pop() {
            stats.add(current);

            for (dx, dy) in NEIGHBOURS_8 {
                let nx = current.x as i64 + dx;
                let ny = current.y as i64 + dy;
                if !mask.get(nx, ny) {
                    continue;
                }
                let index = ny as usize * width + nx as usize;
                if !visited[index] {
                    visited[index] = true;
                    stack.push(Point {
                        x: nx as u32,
                        y: ny as u32,
                    });
                }
            }
        }

        stats
    }

}
