//! # floodmask
//!
//! A Rust library for flood-fill background segmentation of raster images.
//!
//! This crate provides connected-component operations for turning solid
//! backdrops into transparency:
//!
//! - **Background Removal**: Multi-pass segmentation that composites flood-fill
//!   decisions into a transparency mask
//! - **Region Classification**: Connected-component reports over color
//!   similarity, with sizes, border contact, and anchor coordinates
//! - **Seeded Region Carving**: Breadth-first fills grown from caller-chosen
//!   seed coordinates
//! - **Alpha Mask Application**: Applies grayscale masks to RGB images to
//!   generate RGBA images
//!
//! ## Example Usage
//!
//! ```no_run
//! use floodmask::{ClassifyRegions, ReferenceStrategy, RemoveBackground, SegmentationConfig, Tolerance};
//! use imageproc::definitions::Image;
//! use image::Rgb;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Remove a near-uniform backdrop with the default two-pass recipe
//! let image: Image<Rgb<u8>> = image::open("photo.png")?.to_rgb8();
//! let cutout = image.remove_background(&SegmentationConfig::default())?;
//! cutout.save("cutout.png")?;
//!
//! // Inspect the components similar to the top-left corner color
//! let image: Image<Rgb<u8>> = Image::new(100, 100);
//! let report = image.classify_regions(ReferenceStrategy::default(), Tolerance::inclusive(30))?;
//! for record in report.background_components() {
//!     println!("{} px at {:?}", record.size, record.anchor);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `rayon`: Enables parallel distance-map construction (optional)

mod error;
mod floodmask;
mod utils;

#[cfg(test)]
mod test_utils;

pub use error::{AlphaMaskError, SegmentationError};
pub use floodmask::apply_alpha_mask::{ApplyAlphaMask, ModifyAlpha};
pub use floodmask::components::{ClassifyRegions, ComponentRecord, RegionReport};
pub use floodmask::flood::SeededRegionMask;
pub use floodmask::metric::{ColorChannels, ComparisonMode, DistanceMap, Tolerance, l1_distance};
pub use floodmask::reference::{Corner, ReferenceStrategy, resolve_reference};
pub use floodmask::remove_background::{
    CarveScope, PassConfig, RemoveBackground, SeedStrategy, SegmentationConfig,
    merge_background_masks,
};

// Re-export imageproc::definitions::Image for convenience
pub use imageproc::definitions::Image;
