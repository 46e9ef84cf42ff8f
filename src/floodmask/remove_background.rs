use image::{Luma, Pixel, Primitive, Rgba};
use imageproc::definitions::{Clamp, Image};

use super::{
    apply_alpha_mask::with_mask_alpha,
    components::classify_all,
    flood::{grow, VisitedSet},
    metric::{ColorChannels, DistanceMap, Tolerance},
    reference::{resolve_reference, Corner, ReferenceStrategy},
};
use crate::{
    error::SegmentationError,
    utils::{validate_matching_dimensions, validate_non_empty_image},
};

/// Which coordinates may seed a pass's background regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStrategy {
    /// Grow from the four image corners only.
    Corners,
    /// Scan the whole grid and consider every background component.
    FullScan,
}

/// Which background components a pass carves into the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarveScope {
    /// Only components touching the image border.
    ///
    /// Connectivity, not color alone, separates backdrop from similarly
    /// colored subject parts.
    BorderConnected,
    /// Every background component the pass discovers, enclosed holes
    /// included.
    AllComponents,
}

/// One masking pass: a tolerance plus seeding and carving policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassConfig {
    /// Color similarity threshold for this pass.
    pub tolerance: Tolerance,
    /// Where background regions may grow from.
    pub seeds: SeedStrategy,
    /// Which discovered components get carved.
    pub scope: CarveScope,
}

impl PassConfig {
    /// A pass that grows from the corners and carves what it reaches.
    #[must_use]
    pub const fn border_pass(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            seeds: SeedStrategy::Corners,
            scope: CarveScope::BorderConnected,
        }
    }

    /// A pass that sweeps the whole grid and carves every matching
    /// component, recovering holes the corner fill cannot reach.
    #[must_use]
    pub const fn interior_pass(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            seeds: SeedStrategy::FullScan,
            scope: CarveScope::AllComponents,
        }
    }
}

/// Full configuration for one masking run.
///
/// All passes share one reference color, resolved once before the first
/// pass; each pass only ever lowers mask values, so their effects combine
/// as a union of background decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationConfig {
    /// How the shared reference color is resolved.
    pub reference: ReferenceStrategy,
    /// Passes applied in order against the same mask.
    pub passes: Vec<PassConfig>,
}

impl SegmentationConfig {
    /// Border-pass tolerance of the default recipe: 60 per channel summed
    /// over three channels.
    pub const DEFAULT_BORDER_TOLERANCE: u32 = 180;
    /// Interior-pass tolerance of the default recipe.
    pub const DEFAULT_INTERIOR_TOLERANCE: u32 = 10;

    /// Configuration running a single pass.
    #[must_use]
    pub fn single_pass(reference: ReferenceStrategy, pass: PassConfig) -> Self {
        Self {
            reference,
            passes: vec![pass],
        }
    }
}

impl Default for SegmentationConfig {
    /// Loose border-connected carve followed by a strict full-grid sweep.
    fn default() -> Self {
        Self {
            reference: ReferenceStrategy::default(),
            passes: vec![
                PassConfig::border_pass(Tolerance::exclusive(Self::DEFAULT_BORDER_TOLERANCE)),
                PassConfig::interior_pass(Tolerance::exclusive(Self::DEFAULT_INTERIOR_TOLERANCE)),
            ],
        }
    }
}

/// Trait providing multi-pass background removal
///
/// A run resolves one reference color, then lets every configured pass
/// carve the regions it admits into a shared mask. A pixel stays opaque
/// only when no pass classified it as background.
pub trait RemoveBackground {
    type Subpixel: Primitive;

    /// Computes the background mask without touching the image
    ///
    /// The returned mask is 255 where pixels were kept and 0 where any
    /// pass carved background. Errors are raised before the first carve,
    /// so a partially masked buffer is never produced.
    ///
    /// # Arguments
    ///
    /// * `config` - Reference strategy and pass list for this run
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
    /// use floodmask::{Image, RemoveBackground, SegmentationConfig};
    /// use image::{ImageBuffer, Rgb};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgb<u8>> = ImageBuffer::new(10, 10);
    /// let mask = image.background_mask(&SegmentationConfig::default())?;
    /// # Ok(())
    /// # }
    /// ```
    fn background_mask(
        &self,
        config: &SegmentationConfig,
    ) -> Result<Image<Luma<u8>>, SegmentationError>;

    /// Computes the background mask and applies it as the alpha channel
    ///
    /// This consumes the original image. For RGBA input the existing
    /// alpha channel is replaced.
    ///
    /// # Arguments
    ///
    /// * `config` - Reference strategy and pass list for this run
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
    /// use floodmask::{Image, RemoveBackground, SegmentationConfig};
    /// use image::{ImageBuffer, Rgb};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgb<u8>> = ImageBuffer::new(10, 10);
    /// let cutout = image.remove_background(&SegmentationConfig::default())?;
    /// # Ok(())
    /// # }
    /// ```
    fn remove_background(
        self,
        config: &SegmentationConfig,
    ) -> Result<Image<Rgba<Self::Subpixel>>, SegmentationError>
    where
        Rgba<Self::Subpixel>: Pixel<Subpixel = Self::Subpixel>;
}

impl<P, S> RemoveBackground for Image<P>
where
    P: ColorChannels + Pixel<Subpixel = S>,
    S: Primitive + Clamp<f32> + Send + Sync,
    u32: From<S>,
{
    type Subpixel = S;

    fn background_mask(
        &self,
        config: &SegmentationConfig,
    ) -> Result<Image<Luma<u8>>, SegmentationError> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height, "background_mask")
            .map_err(|_| SegmentationError::EmptyImage { width, height })?;

        let reference = resolve_reference(self, config.reference)?;
        let distances = DistanceMap::from_image(self, reference);

        let mut mask = Image::from_pixel(width, height, Luma([u8::MAX]));
        for pass in &config.passes {
            run_pass(&distances, *pass, &mut mask);
        }
        Ok(mask)
    }

    fn remove_background(
        self,
        config: &SegmentationConfig,
    ) -> Result<Image<Rgba<S>>, SegmentationError>
    where
        Rgba<S>: Pixel<Subpixel = S>,
    {
        let mask = self.background_mask(config)?;
        Ok(with_mask_alpha(&self, &mask))
    }
}

/// Runs one pass against the shared distance map, carving its admitted
/// regions into `mask`.
fn run_pass(distances: &DistanceMap, pass: PassConfig, mask: &mut Image<Luma<u8>>) {
    let (width, height) = (distances.width(), distances.height());
    let similarity = distances.threshold(pass.tolerance);

    match pass.seeds {
        SeedStrategy::Corners => {
            // A corner-grown region contains a corner, so the border scope
            // is always satisfied.
            let mut visited = VisitedSet::new(width, height);
            let seeds = Corner::ALL.map(|corner| corner.coordinates(width, height));
            let region = grow(
                (width, height),
                seeds,
                |x, y| similarity.is_similar(x, y),
                &mut visited,
            );
            carve(mask, region.pixels());
        }
        SeedStrategy::FullScan => {
            for (region, is_background) in classify_all(&similarity) {
                if !is_background {
                    continue;
                }
                if pass.scope == CarveScope::BorderConnected && !region.touches_border() {
                    continue;
                }
                carve(mask, region.pixels());
            }
        }
    }
}

fn carve(mask: &mut Image<Luma<u8>>, pixels: &[(u32, u32)]) {
    for &(x, y) in pixels {
        mask.put_pixel(x, y, Luma([0]));
    }
}

/// Combines two background masks so a pixel counts as background when
/// either mask carved it.
///
/// # Errors
///
/// * `SegmentationError::DimensionMismatch` - When the masks differ in
///   size
pub fn merge_background_masks(
    base: &mut Image<Luma<u8>>,
    other: &Image<Luma<u8>>,
) -> Result<(), SegmentationError> {
    let (base_width, base_height) = base.dimensions();
    let (other_width, other_height) = other.dimensions();
    validate_matching_dimensions(
        base_width,
        base_height,
        other_width,
        other_height,
        "merge_background_masks",
    )
    .map_err(|_| SegmentationError::DimensionMismatch {
        expected: (base_width, base_height),
        actual: (other_width, other_height),
    })?;

    base.pixels_mut()
        .zip(other.pixels())
        .for_each(|(pixel, &Luma([alpha]))| {
            let Luma([current]) = *pixel;
            *pixel = Luma([current.min(alpha)]);
        });
    Ok(())
}
