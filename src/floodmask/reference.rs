use imageproc::definitions::Image;

use super::metric::{l1_distance, ColorChannels};
use crate::error::SegmentationError;

/// One of the four image corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All four corners in sampling order.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Returns the corner's pixel coordinate for the given dimensions.
    ///
    /// Single-row or single-column images collapse opposite corners onto
    /// the same pixel.
    #[must_use]
    pub const fn coordinates(self, width: u32, height: u32) -> (u32, u32) {
        let right = width.saturating_sub(1);
        let bottom = height.saturating_sub(1);
        match self {
            Self::TopLeft => (0, 0),
            Self::TopRight => (right, 0),
            Self::BottomLeft => (0, bottom),
            Self::BottomRight => (right, bottom),
        }
    }
}

/// How the reference background color is obtained.
///
/// The reference is resolved once per run and stays fixed across all
/// passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceStrategy {
    /// Sample a fixed corner.
    Corner(Corner),
    /// Sample all four corners and use the one most other corners agree
    /// with, where agreement means an L1 distance of at most
    /// `agreement_tolerance`.
    ///
    /// Ties keep the earlier corner in top-left, top-right, bottom-left,
    /// bottom-right order. When no two corners agree, the top-left sample
    /// is used.
    ValidatedCorners { agreement_tolerance: u32 },
    /// Use a caller-supplied color.
    ///
    /// This covers grids whose background color never reaches a corner,
    /// such as an enclosed hole whose surround is all foreground.
    Explicit([u32; 3]),
}

impl Default for ReferenceStrategy {
    fn default() -> Self {
        Self::Corner(Corner::TopLeft)
    }
}

/// Resolves the reference color for an image.
///
/// # Errors
///
/// * `SegmentationError::ReferenceColorUnavailable` - When the strategy
///   needs to sample a pixel and the image has none
pub fn resolve_reference<P>(
    image: &Image<P>,
    strategy: ReferenceStrategy,
) -> Result<[u32; 3], SegmentationError>
where
    P: ColorChannels,
{
    let (width, height) = image.dimensions();
    match strategy {
        ReferenceStrategy::Explicit(color) => Ok(color),
        _ if width == 0 || height == 0 => Err(SegmentationError::ReferenceColorUnavailable),
        ReferenceStrategy::Corner(corner) => {
            let (x, y) = corner.coordinates(width, height);
            Ok(image.get_pixel(x, y).color_channels())
        }
        ReferenceStrategy::ValidatedCorners {
            agreement_tolerance,
        } => {
            let samples = Corner::ALL.map(|corner| {
                let (x, y) = corner.coordinates(width, height);
                image.get_pixel(x, y).color_channels()
            });
            Ok(consensus_sample(&samples, agreement_tolerance))
        }
    }
}

fn consensus_sample(samples: &[[u32; 3]; 4], agreement_tolerance: u32) -> [u32; 3] {
    let mut best = samples[0];
    let mut best_score = 0_usize;
    for (index, sample) in samples.iter().enumerate() {
        let score = samples
            .iter()
            .enumerate()
            .filter(|&(other, candidate)| {
                other != index && l1_distance(*sample, *candidate) <= agreement_tolerance
            })
            .count();
        if score > best_score {
            best = *sample;
            best_score = score;
        }
    }
    best
}
