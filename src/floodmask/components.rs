use std::cmp::Reverse;

use imageproc::definitions::Image;
use itertools::Itertools;

use super::{
    flood::{grow, Region, VisitedSet},
    metric::{ColorChannels, DistanceMap, SimilarityMap, Tolerance},
    reference::{resolve_reference, ReferenceStrategy},
};
use crate::{error::SegmentationError, utils::validate_non_empty_image};

/// Statistics for one connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRecord {
    /// Number of member pixels.
    pub size: usize,
    /// Whether any member lies on the image border.
    pub touches_border: bool,
    /// Whether the members are similar to the reference color.
    pub is_background: bool,
    /// First coordinate the scan admitted, a stable handle into the
    /// component.
    pub anchor: (u32, u32),
}

/// All connected components of one classification run.
///
/// Records are kept in discovery order; the accessors below are the
/// presentation layer, so callers pick an ordering or filter without the
/// classifier baking one in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionReport {
    records: Vec<ComponentRecord>,
}

impl RegionReport {
    /// Components in discovery order.
    #[must_use]
    pub fn components(&self) -> &[ComponentRecord] {
        &self.records
    }

    /// Components similar to the reference color, in discovery order.
    #[must_use]
    pub fn background_components(&self) -> Vec<ComponentRecord> {
        self.records
            .iter()
            .filter(|record| record.is_background)
            .copied()
            .collect()
    }

    /// Background components enclosed by foreground, with no border
    /// contact.
    #[must_use]
    pub fn interior_islands(&self) -> Vec<ComponentRecord> {
        self.records
            .iter()
            .filter(|record| record.is_background && !record.touches_border)
            .copied()
            .collect()
    }

    /// Components sorted largest first; ties keep discovery order.
    #[must_use]
    pub fn sorted_by_size(&self) -> Vec<ComponentRecord> {
        self.records
            .iter()
            .copied()
            .sorted_by_key(|record| Reverse(record.size))
            .collect()
    }

    /// Total pixels across all components.
    ///
    /// Equals the image area: components partition the grid.
    #[must_use]
    pub fn total_pixels(&self) -> usize {
        self.records.iter().map(|record| record.size).sum()
    }
}

/// Enumerates every component of both similarity classes.
///
/// The scan is row-major (y outer, x inner); each unvisited coordinate
/// starts a region of its own class, so the result covers the grid exactly
/// once.
pub(crate) fn classify_all(map: &SimilarityMap) -> Vec<(Region, bool)> {
    let (width, height) = map.dimensions();
    let mut visited = VisitedSet::new(width, height);
    let mut components = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited.contains(x, y) {
                continue;
            }
            let is_background = map.is_similar(x, y);
            let region = grow(
                (width, height),
                [(x, y)],
                |px, py| map.is_similar(px, py) == is_background,
                &mut visited,
            );
            components.push((region, is_background));
        }
    }

    components
}

/// Trait providing connected-component classification against a reference
/// color
pub trait ClassifyRegions {
    /// Partitions the image into connected components of
    /// background-similar and foreground pixels
    ///
    /// Components are reported in row-major discovery order. Every pixel
    /// belongs to exactly one component, so the record sizes sum to the
    /// image area.
    ///
    /// # Arguments
    ///
    /// * `strategy` - How the reference color is obtained
    /// * `tolerance` - Color similarity threshold
    ///
    /// # Errors
    ///
    /// * `SegmentationError::EmptyImage` - When the image has no pixels
    /// * `SegmentationError::ReferenceColorUnavailable` - When the
    ///   reference strategy cannot sample the image
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use floodmask::{ClassifyRegions, Image, ReferenceStrategy, Tolerance};
    /// use image::{ImageBuffer, Rgb};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgb<u8>> = ImageBuffer::new(10, 10);
    /// let report =
    ///     image.classify_regions(ReferenceStrategy::default(), Tolerance::inclusive(90))?;
    /// let background: usize = report.background_components().len();
    /// # Ok(())
    /// # }
    /// ```
    fn classify_regions(
        &self,
        strategy: ReferenceStrategy,
        tolerance: Tolerance,
    ) -> Result<RegionReport, SegmentationError>;
}

impl<P> ClassifyRegions for Image<P>
where
    P: ColorChannels,
    P::Subpixel: Send + Sync,
    u32: From<P::Subpixel>,
{
    fn classify_regions(
        &self,
        strategy: ReferenceStrategy,
        tolerance: Tolerance,
    ) -> Result<RegionReport, SegmentationError> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height, "classify_regions")
            .map_err(|_| SegmentationError::EmptyImage { width, height })?;

        let reference = resolve_reference(self, strategy)?;
        let similarity = DistanceMap::from_image(self, reference).threshold(tolerance);
        let records = classify_all(&similarity)
            .into_iter()
            .map(|(region, is_background)| ComponentRecord {
                size: region.len(),
                touches_border: region.touches_border(),
                is_background,
                anchor: region.anchor().expect("scan admits its seed"),
            })
            .collect();

        Ok(RegionReport { records })
    }
}
