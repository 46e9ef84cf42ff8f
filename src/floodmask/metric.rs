use std::collections::BTreeMap;

use image::{Luma, Pixel, Primitive, Rgb, Rgba};
use imageproc::definitions::Image;
use itertools::Itertools;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{error::SegmentationError, utils::validate_matching_dimensions};

/// Computes the L1 distance between two colors.
///
/// The distance is the sum of absolute per-channel differences over the
/// three color channels.
#[inline]
#[must_use]
pub const fn l1_distance(a: [u32; 3], b: [u32; 3]) -> u32 {
    a[0].abs_diff(b[0]) + a[1].abs_diff(b[1]) + a[2].abs_diff(b[2])
}

/// How a distance relates to the maximum admitted distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    /// Admits distances up to and including the maximum (`<=`).
    Inclusive,
    /// Admits only distances strictly below the maximum (`<`).
    Exclusive,
}

/// A color similarity threshold.
///
/// Both comparison modes are first-class configuration: a loose
/// border-connected carve and a strict residual sweep typically run with
/// different strictness within the same masking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerance {
    /// Maximum L1 distance considered similar.
    pub max_distance: u32,
    /// Whether the maximum itself counts as similar.
    pub mode: ComparisonMode,
}

impl Tolerance {
    /// Creates a tolerance admitting distances up to and including `max_distance`.
    #[must_use]
    pub const fn inclusive(max_distance: u32) -> Self {
        Self {
            max_distance,
            mode: ComparisonMode::Inclusive,
        }
    }

    /// Creates a tolerance admitting distances strictly below `max_distance`.
    #[must_use]
    pub const fn exclusive(max_distance: u32) -> Self {
        Self {
            max_distance,
            mode: ComparisonMode::Exclusive,
        }
    }

    /// Tests whether this tolerance admits `distance`.
    #[must_use]
    pub const fn admits(self, distance: u32) -> bool {
        match self.mode {
            ComparisonMode::Inclusive => distance <= self.max_distance,
            ComparisonMode::Exclusive => distance < self.max_distance,
        }
    }
}

/// Pixel types whose color content can be compared against a reference color.
///
/// Implemented for `Rgb` and `Rgba` pixels with integer subpixels. Only the
/// first three channels participate; an alpha channel is carried through
/// untouched and never contributes to a distance.
pub trait ColorChannels: Pixel {
    /// Returns the three color channels widened to `u32`.
    fn color_channels(&self) -> [u32; 3];
}

impl<S> ColorChannels for Rgb<S>
where
    Rgb<S>: Pixel<Subpixel = S>,
    S: Primitive,
    u32: From<S>,
{
    fn color_channels(&self) -> [u32; 3] {
        let Rgb([red, green, blue]) = *self;
        [u32::from(red), u32::from(green), u32::from(blue)]
    }
}

impl<S> ColorChannels for Rgba<S>
where
    Rgba<S>: Pixel<Subpixel = S>,
    S: Primitive,
    u32: From<S>,
{
    fn color_channels(&self) -> [u32; 3] {
        let Rgba([red, green, blue, _]) = *self;
        [u32::from(red), u32::from(green), u32::from(blue)]
    }
}

/// Per-pixel L1 distances to a fixed reference color.
///
/// The map is computed once per run and thresholded per pass, so repeated
/// passes with different tolerances never touch the source image again.
#[derive(Debug, Clone)]
pub struct DistanceMap {
    data: Vec<u32>,
    width: u32,
    height: u32,
}

impl DistanceMap {
    /// Computes the distance of every pixel to `reference`.
    ///
    /// Distances are laid out row-major, matching the source buffer. With
    /// the `rayon` feature enabled the per-pixel evaluation runs in
    /// parallel; this is the only parallel stage, traversal stays
    /// sequential.
    #[must_use]
    pub fn from_image<P>(image: &Image<P>, reference: [u32; 3]) -> Self
    where
        P: ColorChannels,
        P::Subpixel: Send + Sync,
        u32: From<P::Subpixel>,
    {
        let (width, height) = image.dimensions();
        let channel_count = P::CHANNEL_COUNT as usize;
        let distance_of = |pixel: &[P::Subpixel]| {
            l1_distance(
                [
                    u32::from(pixel[0]),
                    u32::from(pixel[1]),
                    u32::from(pixel[2]),
                ],
                reference,
            )
        };

        #[cfg(feature = "rayon")]
        let data = image
            .as_raw()
            .par_chunks_exact(channel_count)
            .map(distance_of)
            .collect();

        #[cfg(not(feature = "rayon"))]
        let data = image
            .as_raw()
            .chunks_exact(channel_count)
            .map(distance_of)
            .collect();

        Self {
            data,
            width,
            height,
        }
    }

    /// Returns the distance at the given coordinate.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the map.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        assert!(
            x < self.width && y < self.height,
            "coordinate ({}, {}) outside {}x{} distance map",
            x,
            y,
            self.width,
            self.height
        );
        self.data[self.index(x, y)]
    }

    /// Map width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Map height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Counts the distances of still-opaque mask pixels that `tolerance`
    /// admits.
    ///
    /// After a masking run, the histogram shows how many near-reference
    /// pixels survived the mask at each remaining distance, which is the
    /// signal for choosing a tighter or looser threshold on the next run.
    ///
    /// # Errors
    ///
    /// * `SegmentationError::DimensionMismatch` - When the mask dimensions
    ///   don't match the map
    pub fn residual_histogram(
        &self,
        mask: &Image<Luma<u8>>,
        tolerance: Tolerance,
    ) -> Result<BTreeMap<u32, usize>, SegmentationError> {
        let (mask_width, mask_height) = mask.dimensions();
        validate_matching_dimensions(
            self.width,
            self.height,
            mask_width,
            mask_height,
            "residual_histogram",
        )
        .map_err(|_| SegmentationError::DimensionMismatch {
            expected: (self.width, self.height),
            actual: (mask_width, mask_height),
        })?;

        Ok(self
            .data
            .iter()
            .zip(mask.pixels())
            .filter(|(&distance, &Luma([alpha]))| alpha != 0 && tolerance.admits(distance))
            .map(|(&distance, _)| distance)
            .counts()
            .into_iter()
            .collect())
    }

    /// Thresholds the map into the boolean grid one pass consumes.
    pub(crate) fn threshold(&self, tolerance: Tolerance) -> SimilarityMap {
        SimilarityMap {
            data: self
                .data
                .iter()
                .map(|&distance| tolerance.admits(distance))
                .collect(),
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Boolean similarity grid for one pass's tolerance.
#[derive(Debug, Clone)]
pub(crate) struct SimilarityMap {
    data: Vec<bool>,
    width: u32,
    height: u32,
}

impl SimilarityMap {
    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub(crate) fn is_similar(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::rgb_image;

    #[test]
    fn test_l1_distance_basic() {
        assert_eq!(l1_distance([0, 0, 0], [0, 0, 0]), 0);
        assert_eq!(l1_distance([255, 255, 255], [0, 0, 0]), 765);
        assert_eq!(l1_distance([10, 20, 30], [20, 10, 35]), 25);
    }

    #[test]
    fn test_l1_distance_symmetric() {
        let a = [12, 200, 7];
        let b = [90, 3, 255];
        assert_eq!(l1_distance(a, b), l1_distance(b, a));
    }

    #[test]
    fn test_tolerance_boundary() {
        assert!(Tolerance::inclusive(30).admits(30));
        assert!(!Tolerance::exclusive(30).admits(30));
        assert!(Tolerance::exclusive(30).admits(29));
        assert!(!Tolerance::inclusive(30).admits(31));
    }

    #[test]
    fn test_zero_tolerance() {
        assert!(Tolerance::inclusive(0).admits(0));
        assert!(!Tolerance::exclusive(0).admits(0));
    }

    #[test]
    fn test_color_channels_ignores_alpha() {
        let opaque = Rgba([5u8, 6, 7, 255]);
        let transparent = Rgba([5u8, 6, 7, 0]);
        assert_eq!(opaque.color_channels(), transparent.color_channels());
        assert_eq!(opaque.color_channels(), [5, 6, 7]);
    }

    #[test]
    fn test_distance_map_row_major() {
        let image = rgb_image!(
            [0, 0, 0], [10, 0, 0];
            [0, 20, 0], [0, 0, 40]);

        let map = DistanceMap::from_image(&image, [0, 0, 0]);

        assert_eq!(map.get(0, 0), 0);
        assert_eq!(map.get(1, 0), 10);
        assert_eq!(map.get(0, 1), 20);
        assert_eq!(map.get(1, 1), 40);
    }

    #[test]
    fn test_distance_map_u16_channels() {
        let image = rgb_image!(type: u16,
            [1000, 0, 0], [0, 0, 0]);

        let map = DistanceMap::from_image(&image, [0, 0, 0]);

        assert_eq!(map.get(0, 0), 1000);
        assert_eq!(map.get(1, 0), 0);
    }

    #[test]
    fn test_threshold_modes() {
        let image = rgb_image!([0, 0, 0], [30, 0, 0]);
        let map = DistanceMap::from_image(&image, [0, 0, 0]);

        let inclusive = map.threshold(Tolerance::inclusive(30));
        assert!(inclusive.is_similar(0, 0));
        assert!(inclusive.is_similar(1, 0));

        let exclusive = map.threshold(Tolerance::exclusive(30));
        assert!(exclusive.is_similar(0, 0));
        assert!(!exclusive.is_similar(1, 0));
    }

    #[test]
    fn test_residual_histogram_counts_opaque_pixels_only() {
        let image = rgb_image!(
            [0, 0, 0], [5, 0, 0];
            [5, 0, 0], [90, 0, 0]);
        let map = DistanceMap::from_image(&image, [0, 0, 0]);

        let mut mask = Image::from_pixel(2, 2, Luma([255u8]));
        mask.put_pixel(0, 0, Luma([0]));

        let histogram = map
            .residual_histogram(&mask, Tolerance::inclusive(60))
            .unwrap();

        // (0, 0) is already carved; (1, 1) is beyond the tolerance.
        assert_eq!(histogram.get(&5), Some(&2));
        assert_eq!(histogram.get(&0), None);
        assert_eq!(histogram.get(&90), None);
    }

    #[test]
    fn test_residual_histogram_dimension_mismatch() {
        let image = rgb_image!([0, 0, 0], [5, 0, 0]);
        let map = DistanceMap::from_image(&image, [0, 0, 0]);
        let mask = Image::from_pixel(3, 3, Luma([255u8]));

        let result = map.residual_histogram(&mask, Tolerance::inclusive(60));
        assert_eq!(
            result,
            Err(SegmentationError::DimensionMismatch {
                expected: (2, 1),
                actual: (3, 3),
            })
        );
    }
}
