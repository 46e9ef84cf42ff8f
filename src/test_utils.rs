//! Test utilities for floodmask
//!
//! This module provides shared fixtures for testing segmentation
//! operations. It is only compiled when running tests.

use image::{Luma, Rgb};
use imageproc::{definitions::Image, rgb_image};

/// Creates the 4x4 two-region fixture: a dark L along the top and left
/// edges, white elsewhere.
///
/// Classified against the top-left corner with zero tolerance this yields
/// exactly two components:
/// - dark L-shape: 7 pixels, touches the border, anchored at (0, 0)
/// - white block: 9 pixels, touches the border, anchored at (1, 1)
pub fn corner_frame_image() -> Image<Rgb<u8>> {
    rgb_image!(
        [0, 0, 0], [  0,   0,   0], [  0,   0,   0], [  0,   0,   0];
        [0, 0, 0], [255, 255, 255], [255, 255, 255], [255, 255, 255];
        [0, 0, 0], [255, 255, 255], [255, 255, 255], [255, 255, 255];
        [0, 0, 0], [255, 255, 255], [255, 255, 255], [255, 255, 255])
}

/// Creates a 5x5 white image with a dark ring enclosing a white hole at
/// the center.
///
/// The hole shares the backdrop color but is cut off from the border, so
/// corner-seeded fills cannot reach it.
pub fn ring_image() -> Image<Rgb<u8>> {
    let mut image = Image::from_pixel(5, 5, Rgb([255u8, 255, 255]));
    for (x, y) in [
        (1, 1),
        (2, 1),
        (3, 1),
        (1, 2),
        (3, 2),
        (1, 3),
        (2, 3),
        (3, 3),
    ] {
        image.put_pixel(x, y, Rgb([0, 0, 0]));
    }
    image
}

/// Creates a 5x5 white image whose only dark pixel is the center.
pub fn isolated_center_image() -> Image<Rgb<u8>> {
    let mut image = Image::from_pixel(5, 5, Rgb([255u8, 255, 255]));
    image.put_pixel(2, 2, Rgb([0, 0, 0]));
    image
}

/// Creates a two-color checkerboard.
///
/// Under 4-connectivity no two same-colored cells touch, so every pixel
/// classifies as its own component.
pub fn checkerboard_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let color = if (x + y) % 2 == 0 {
                Rgb([200, 150, 100])
            } else {
                Rgb([100, 150, 200])
            };
            image.put_pixel(x, y, color);
        }
    }
    image
}

/// Counts fully carved (zero) pixels in a background mask.
pub fn carved_count(mask: &Image<Luma<u8>>) -> usize {
    mask.pixels().filter(|&&Luma([alpha])| alpha == 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_frame_image_has_expected_regions() {
        let image = corner_frame_image();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(3, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(0, 3), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([255, 255, 255]));
        assert_eq!(image.get_pixel(3, 3), &Rgb([255, 255, 255]));
    }

    #[test]
    fn ring_image_encloses_center() {
        let image = ring_image();
        assert_eq!(image.get_pixel(2, 2), &Rgb([255, 255, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(2, 1), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn checkerboard_image_alternates_colors() {
        let image = checkerboard_image(4, 4);
        assert_eq!(image.get_pixel(0, 0), &Rgb([200, 150, 100]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([100, 150, 200]));
        assert_eq!(image.get_pixel(0, 1), &Rgb([100, 150, 200]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([200, 150, 100]));
    }

    #[test]
    fn carved_count_counts_zeros_only() {
        let mut mask = Image::from_pixel(2, 2, Luma([255u8]));
        mask.put_pixel(0, 0, Luma([0]));
        mask.put_pixel(1, 1, Luma([1]));
        assert_eq!(carved_count(&mask), 1);
    }
}
