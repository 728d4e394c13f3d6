//! Geometric transforms applied before normalization.

use crate::core::errors::InchiError;
use image::RgbImage;
use image::imageops::{self, FilterType};

/// Rotates portrait images a quarter turn counter-clockwise.
///
/// Molecule renderings are mostly landscape; a taller-than-wide image is
/// treated as rotated. The transform is a transpose followed by a vertical
/// flip. Landscape and square images are returned unchanged.
pub fn fix_orientation(img: RgbImage) -> RgbImage {
    if img.height() > img.width() {
        imageops::rotate270(&img)
    } else {
        img
    }
}

/// Resizes images to a fixed square with bilinear filtering.
///
/// `FilterType::Triangle` widens its kernel when downscaling, so it
/// antialiases. The checkpoints were trained on a plain bilinear resize
/// without antialiasing, which samples only the four nearest pixels. On
/// large downscales of thin bond lines the two produce slightly different
/// pixel values, and predictions can differ from the training pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ResizeImage {
    size: u32,
}

impl ResizeImage {
    /// Creates a resizer producing `size × size` images.
    pub fn new(size: u32) -> Result<Self, InchiError> {
        if size == 0 {
            return Err(InchiError::invalid_field("size", "> 0", size));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Resizes a single image, ignoring its aspect ratio.
    pub fn apply(&self, img: &RgbImage) -> Result<RgbImage, InchiError> {
        if img.width() == 0 || img.height() == 0 {
            return Err(InchiError::resize_error(
                "cannot resize an empty image",
                crate::core::errors::SimpleError::new(format!(
                    "image is {}x{}",
                    img.width(),
                    img.height()
                )),
            ));
        }
        if img.dimensions() == (self.size, self.size) {
            return Ok(img.clone());
        }
        Ok(imageops::resize(img, self.size, self.size, FilterType::Triangle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_fix_orientation_rotates_portrait_ccw() {
        // 2 wide, 3 tall; mark the top-right pixel.
        let mut img = RgbImage::new(2, 3);
        img.put_pixel(1, 0, Rgb([255, 0, 0]));
        let rotated = fix_orientation(img);
        assert_eq!(rotated.dimensions(), (3, 2));
        // Counter-clockwise: the top-right corner moves to the top-left.
        assert_eq!(rotated.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_fix_orientation_keeps_landscape() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([1, 2, 3]));
        let out = fix_orientation(img.clone());
        assert_eq!(out, img);
    }

    #[test]
    fn test_resize_to_square() {
        let resizer = ResizeImage::new(8).unwrap();
        let img = RgbImage::from_pixel(20, 5, Rgb([9, 9, 9]));
        let out = resizer.apply(&img).unwrap();
        assert_eq!(out.dimensions(), (8, 8));
        assert_eq!(out.get_pixel(4, 4).0, [9, 9, 9]);
    }

    #[test]
    fn test_downscale_antialiases_thin_lines() {
        // One-pixel black lines at columns 0 and 4 of a white 8x8 image. A
        // four-tap bilinear resize to 2x2 samples columns 1-2 and 5-6 and
        // drops them; the widened triangle kernel keeps them as grey.
        let mut img = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        for y in 0..8 {
            img.put_pixel(0, y, Rgb([0, 0, 0]));
            img.put_pixel(4, y, Rgb([0, 0, 0]));
        }
        let out = ResizeImage::new(2).unwrap().apply(&img).unwrap();
        for pixel in out.pixels() {
            assert!(pixel.0[0] < 255, "line lost: {:?}", pixel.0);
            assert!(pixel.0[0] > 0);
        }
    }

    #[test]
    fn test_resize_rejects_zero_size_and_empty_image() {
        assert!(ResizeImage::new(0).is_err());
        let resizer = ResizeImage::new(4).unwrap();
        assert!(resizer.apply(&RgbImage::new(0, 3)).is_err());
    }
}
