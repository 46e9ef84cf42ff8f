use std::collections::VecDeque;

use image::Luma;
use imageproc::definitions::Image;

use super::metric::{ColorChannels, DistanceMap, Tolerance};
use crate::{error::SegmentationError, utils::validate_non_empty_image};

/// Neighbor offsets in expansion order: left, right, up, down.
const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Visited grid owned by a single pass.
///
/// Marking happens together with worklist admission, so every coordinate
/// enters the worklist at most once and the worklist never holds more than
/// width * height entries.
#[derive(Debug)]
pub(crate) struct VisitedSet {
    data: Vec<bool>,
    width: u32,
}

impl VisitedSet {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![false; width as usize * height as usize],
            width,
        }
    }

    #[inline]
    pub(crate) fn contains(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub(crate) fn insert(&mut self, x: u32, y: u32) {
        self.data[y as usize * self.width as usize + x as usize] = true;
    }
}

/// One grown region: member coordinates in visit order plus border contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Region {
    pixels: Vec<(u32, u32)>,
    touches_border: bool,
}

impl Region {
    pub(crate) fn pixels(&self) -> &[(u32, u32)] {
        &self.pixels
    }

    pub(crate) const fn touches_border(&self) -> bool {
        self.touches_border
    }

    pub(crate) fn len(&self) -> usize {
        self.pixels.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// First admitted coordinate, the seed the region grew from.
    pub(crate) fn anchor(&self) -> Option<(u32, u32)> {
        self.pixels.first().copied()
    }

    fn admit(&mut self, x: u32, y: u32, width: u32, height: u32) {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            self.touches_border = true;
        }
        self.pixels.push((x, y));
    }
}

/// Grows one region from `seeds` by breadth-first expansion over
/// 4-connected neighbors.
///
/// Seeds are validated like any other coordinate: out-of-bounds, already
/// visited, or non-member seeds are skipped silently. A coordinate is
/// admitted exactly when it passes the membership predicate, and admission
/// marks it visited, so regions grown against a shared visited set never
/// overlap.
pub(crate) fn grow<F>(
    bounds: (u32, u32),
    seeds: impl IntoIterator<Item = (u32, u32)>,
    is_member: F,
    visited: &mut VisitedSet,
) -> Region
where
    F: Fn(u32, u32) -> bool,
{
    let (width, height) = bounds;
    let mut region = Region {
        pixels: Vec::new(),
        touches_border: false,
    };
    if width == 0 || height == 0 {
        return region;
    }

    let mut queue = VecDeque::new();
    for (x, y) in seeds {
        if x >= width || y >= height {
            continue;
        }
        if visited.contains(x, y) || !is_member(x, y) {
            continue;
        }
        visited.insert(x, y);
        region.admit(x, y, width, height);
        queue.push_back((x, y));
    }

    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let nx = i64::from(x) + dx;
            let ny = i64::from(y) + dy;
            if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            if visited.contains(nx, ny) || !is_member(nx, ny) {
                continue;
            }
            visited.insert(nx, ny);
            region.admit(nx, ny, width, height);
            queue.push_back((nx, ny));
        }
    }

    region
}

/// Trait providing wand-style region removal from caller-chosen seeds
///
/// The region connected to the seeds is carved out of an otherwise opaque
/// mask, using the color at the first usable seed as the reference.
pub trait SeededRegionMask {
    /// Grows one region from `seeds` and returns its background mask
    ///
    /// The reference color is sampled at the first in-bounds seed. The
    /// returned mask is 0 across the grown region and 255 elsewhere. Seeds
    /// outside the image are skipped; if none remain, the mask comes back
    /// fully opaque.
    ///
    /// # Arguments
    ///
    /// * `seeds` - Coordinates the region may grow from
    /// * `tolerance` - Color similarity threshold relative to the sampled
    ///   reference
    ///
    /// # Errors
    ///
    /// * `SegmentationError::EmptyImage` - When the image has no pixels
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use floodmask::{Image, SeededRegionMask, Tolerance};
    /// use image::{ImageBuffer, Rgb};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgb<u8>> = ImageBuffer::new(10, 10);
    /// let mask = image.seeded_region_mask(&[(0, 0)], Tolerance::inclusive(90))?;
    /// # Ok(())
    /// # }
    /// ```
    fn seeded_region_mask(
        &self,
        seeds: &[(u32, u32)],
        tolerance: Tolerance,
    ) -> Result<Image<Luma<u8>>, SegmentationError>;
}

impl<P> SeededRegionMask for Image<P>
where
    P: ColorChannels,
    P::Subpixel: Send + Sync,
    u32: From<P::Subpixel>,
{
    fn seeded_region_mask(
        &self,
        seeds: &[(u32, u32)],
        tolerance: Tolerance,
    ) -> Result<Image<Luma<u8>>, SegmentationError> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height, "seeded_region_mask")
            .map_err(|_| SegmentationError::EmptyImage { width, height })?;

        let mut mask = Image::from_pixel(width, height, Luma([u8::MAX]));
        let first_seed = seeds
            .iter()
            .copied()
            .find(|&(x, y)| x < width && y < height);
        let (seed_x, seed_y) = match first_seed {
            Some(seed) => seed,
            None => return Ok(mask),
        };

        let reference = self.get_pixel(seed_x, seed_y).color_channels();
        let similarity = DistanceMap::from_image(self, reference).threshold(tolerance);
        let mut visited = VisitedSet::new(width, height);
        let region = grow(
            (width, height),
            seeds.iter().copied(),
            |x, y| similarity.is_similar(x, y),
            &mut visited,
        );

        for &(x, y) in region.pixels() {
            mask.put_pixel(x, y, Luma([0]));
        }
        Ok(mask)
    }
}
