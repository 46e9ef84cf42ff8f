use image::{GenericImageView, Luma, Pixel, Primitive, Rgb, Rgba};
use imageproc::definitions::{Clamp, Image};

use crate::{
    error::AlphaMaskError,
    utils::{clamp_f32_to_primitive, validate_matching_dimensions},
};

/// Trait providing functionality to apply alpha masks to images
///
/// This trait applies the crate's `Luma<u8>` background masks to RGB
/// images to generate RGBA images. This consumes the original image.
///
/// Note: This trait performs type conversion (Rgb -> Rgba). For modifying
/// existing RGBA images' alpha channel, use the `ModifyAlpha` trait.
pub trait ApplyAlphaMask {
    type Subpixel: Primitive;

    /// Applies the specified mask to the image and generates an image with
    /// alpha channel
    ///
    /// Mask values are rescaled from the `u8` range to the image's
    /// subpixel range, so 255 stays fully opaque for 16-bit images too.
    ///
    /// # Arguments
    ///
    /// * `mask` - The alpha mask to apply (grayscale image)
    ///
    /// # Errors
    ///
    /// * `AlphaMaskError::DimensionMismatch` - When image and mask
    ///   dimensions don't match
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use floodmask::{ApplyAlphaMask, Image};
    /// use image::{ImageBuffer, Luma, Rgb};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let rgb_image: Image<Rgb<u8>> = ImageBuffer::new(10, 10);
    /// let mask: Image<Luma<u8>> = ImageBuffer::new(10, 10);
    ///
    /// let rgba_image = rgb_image.apply_alpha_mask(&mask)?;
    /// # Ok(())
    /// # }
    /// ```
    fn apply_alpha_mask(
        self,
        mask: &Image<Luma<u8>>,
    ) -> Result<Image<Rgba<Self::Subpixel>>, AlphaMaskError>
    where
        Rgba<Self::Subpixel>: Pixel<Subpixel = Self::Subpixel>;
}

/// Trait for modifying the alpha channel of existing RGBA images
///
/// This trait replaces the alpha channel of RGBA images with a `Luma<u8>`
/// mask while preserving the RGB color channels.
pub trait ModifyAlpha {
    type Subpixel: Primitive;

    /// Replaces the alpha channel with the provided mask
    ///
    /// This consumes the original image.
    ///
    /// # Arguments
    ///
    /// * `mask` - The new alpha mask (grayscale image)
    ///
    /// # Errors
    ///
    /// * `AlphaMaskError::DimensionMismatch` - When image and mask
    ///   dimensions don't match
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use floodmask::{Image, ModifyAlpha};
    /// use image::{ImageBuffer, Luma, Rgba};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let rgba_image: Image<Rgba<u8>> = ImageBuffer::new(10, 10);
    /// let new_mask: Image<Luma<u8>> = ImageBuffer::new(10, 10);
    ///
    /// let updated = rgba_image.replace_alpha(&new_mask)?;
    /// # Ok(())
    /// # }
    /// ```
    fn replace_alpha(self, mask: &Image<Luma<u8>>) -> Result<Self, AlphaMaskError>
    where
        Self: Sized;

    /// Replaces the alpha channel with the provided mask in-place
    ///
    /// # Arguments
    ///
    /// * `mask` - The new alpha mask (grayscale image)
    ///
    /// # Errors
    ///
    /// * `AlphaMaskError::DimensionMismatch` - When image and mask
    ///   dimensions don't match
    fn replace_alpha_mut(&mut self, mask: &Image<Luma<u8>>) -> Result<&mut Self, AlphaMaskError>;
}

impl<S> ApplyAlphaMask for Image<Rgb<S>>
where
    Rgb<S>: Pixel<Subpixel = S>,
    S: Primitive + Clamp<f32>,
    u32: From<S>,
{
    type Subpixel = S;

    fn apply_alpha_mask(
        self,
        mask: &Image<Luma<u8>>,
    ) -> Result<Image<Rgba<Self::Subpixel>>, AlphaMaskError>
    where
        Rgba<Self::Subpixel>: Pixel<Subpixel = Self::Subpixel>,
    {
        validate_dimensions(&self, mask)?;
        Ok(with_mask_alpha(&self, mask))
    }
}

impl<S> ModifyAlpha for Image<Rgba<S>>
where
    Rgba<S>: Pixel<Subpixel = S>,
    S: Primitive + Clamp<f32>,
    u32: From<S>,
{
    type Subpixel = S;

    fn replace_alpha(self, mask: &Image<Luma<u8>>) -> Result<Self, AlphaMaskError> {
        validate_dimensions(&self, mask)?;
        Ok(with_mask_alpha(&self, mask))
    }

    fn replace_alpha_mut(&mut self, mask: &Image<Luma<u8>>) -> Result<&mut Self, AlphaMaskError> {
        validate_dimensions(self, mask)?;

        let max_value = u32::from(S::DEFAULT_MAX_VALUE);
        self.pixels_mut()
            .zip(mask.pixels())
            .for_each(|(pixel, &Luma([mask_alpha]))| {
                let Rgba([red, green, blue, _]) = *pixel;
                *pixel = Rgba([red, green, blue, scale_mask_alpha(mask_alpha, max_value)]);
            });

        Ok(self)
    }
}

/// Builds an RGBA image whose color comes from the first three channels of
/// `image` and whose alpha comes from `mask`.
///
/// Callers guarantee matching dimensions.
pub(crate) fn with_mask_alpha<P, S>(image: &Image<P>, mask: &Image<Luma<u8>>) -> Image<Rgba<S>>
where
    P: Pixel<Subpixel = S>,
    Rgba<S>: Pixel<Subpixel = S>,
    S: Primitive + Clamp<f32>,
    u32: From<S>,
{
    let max_value = u32::from(S::DEFAULT_MAX_VALUE);
    Image::from_fn(image.width(), image.height(), |x, y| {
        let channels = image.get_pixel(x, y).channels();
        let Luma([mask_alpha]) = *mask.get_pixel(x, y);
        Rgba([
            channels[0],
            channels[1],
            channels[2],
            scale_mask_alpha(mask_alpha, max_value),
        ])
    })
}

/// Rescales a mask value from the `u8` range to the target subpixel range.
///
/// The arithmetic stays integral, so u8 masks map onto u8 alpha unchanged
/// and onto u16 alpha as exact multiples of 257.
#[inline]
fn scale_mask_alpha<S>(mask_alpha: u8, max_value: u32) -> S
where
    S: Primitive + Clamp<f32>,
{
    let mask_max = u32::from(u8::MAX);
    let scaled = (u32::from(mask_alpha) * max_value + mask_max / 2) / mask_max;
    clamp_f32_to_primitive(scaled as f32)
}

/// Function to validate dimensions
#[inline]
fn validate_dimensions<I1, I2>(image: &I1, mask: &I2) -> Result<(), AlphaMaskError>
where
    I1: GenericImageView,
    I2: GenericImageView,
{
    let (img_w, img_h) = image.dimensions();
    let (mask_w, mask_h) = mask.dimensions();

    validate_matching_dimensions(img_w, img_h, mask_w, mask_h, "ApplyAlphaMask").map_err(|_| {
        AlphaMaskError::DimensionMismatch {
            expected: (img_w, img_h),
            actual: (mask_w, mask_h),
        }
    })
}
