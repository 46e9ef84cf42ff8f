use thiserror::Error;

/// Error type for background segmentation operations
///
/// This error type covers failures that can occur while resolving a
/// reference color, classifying regions, or compositing a background mask.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentationError {
    /// The image has no pixels to traverse
    ///
    /// Segmentation rejects zero-area grids before any traversal begins,
    /// so an error is never raised partway through a mask.
    #[error("Image has no pixels: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// The reference color could not be sampled
    ///
    /// Returned when the configured reference strategy points at a
    /// coordinate that does not exist, such as any corner of a
    /// zero-area image.
    #[error("Reference color is unavailable for this image")]
    ReferenceColorUnavailable,

    /// Image and mask dimensions do not match
    ///
    /// This error occurs when combining a mask with an image or with
    /// another mask whose dimensions don't align.
    #[error("Image and mask dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },
}

/// Error type for alpha mask application
///
/// This error type covers failures that can occur when applying an
/// alpha mask to an image or replacing an existing alpha channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphaMaskError {
    /// Image and mask dimensions do not match
    ///
    /// This error occurs when attempting to apply an alpha mask
    /// to an image where the dimensions don't align properly.
    #[error("Image and mask dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },
}
