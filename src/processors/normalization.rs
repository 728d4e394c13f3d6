//! Image normalization for the encoder input.
//!
//! Pixels are scaled to `[0, 1]` and standardized per channel, then laid out
//! channel-first so a batch stacks into an `[N, 3, H, W]` tensor.

use crate::core::constants::{IMAGENET_MEAN, IMAGENET_STD};
use crate::core::errors::InchiError;
use crate::core::Tensor4D;
use image::RgbImage;
use ndarray::{Array3, ArrayViewMut3, Axis};
use rayon::prelude::*;

/// Normalizes RGB images into CHW float tensors.
///
/// Each channel value becomes `x * alpha[c] + beta[c]` where
/// `alpha = scale / std` and `beta = -mean / std`, which equals
/// `(x * scale - mean) / std`.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std)
    pub alpha: [f32; 3],
    /// Offset values for each channel (beta = -mean / std)
    pub beta: [f32; 3],
}

impl NormalizeImage {
    /// Creates a normalizer.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional channel means (defaults to ImageNet)
    /// * `std` - Optional channel standard deviations (defaults to ImageNet)
    ///
    /// # Errors
    ///
    /// Returns an error if the scale or any standard deviation is not a finite
    /// positive number.
    pub fn new(
        scale: Option<f32>,
        mean: Option<[f32; 3]>,
        std: Option<[f32; 3]>,
    ) -> Result<Self, InchiError> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or(IMAGENET_MEAN);
        let std = std.unwrap_or(IMAGENET_STD);

        if !(scale.is_finite() && scale > 0.0) {
            return Err(InchiError::config_error("Scale must be greater than 0"));
        }
        for (i, &s) in std.iter().enumerate() {
            if !(s.is_finite() && s > 0.0) {
                return Err(InchiError::config_error(format!(
                    "Standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let alpha = std.map(|s| scale / s);
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            beta[c] = -mean[c] / std[c];
        }
        Ok(Self { alpha, beta })
    }

    /// ImageNet statistics with 1/255 scaling.
    pub fn imagenet() -> Result<Self, InchiError> {
        Self::new(None, None, None)
    }

    /// Normalizes a single image into a `[3, H, W]` array.
    pub fn normalize(&self, img: &RgbImage) -> Array3<f32> {
        let (width, height) = img.dimensions();
        let mut out = Array3::<f32>::zeros((3, height as usize, width as usize));
        self.normalize_into(img, out.view_mut());
        out
    }

    fn normalize_into(&self, img: &RgbImage, mut out: ArrayViewMut3<'_, f32>) {
        for (x, y, pixel) in img.enumerate_pixels() {
            for c in 0..3 {
                out[[c, y as usize, x as usize]] =
                    pixel[c] as f32 * self.alpha[c] + self.beta[c];
            }
        }
    }

    /// Normalizes equally sized images into one `[N, 3, H, W]` tensor.
    ///
    /// Images are written in parallel, each into its own slice of the batch.
    ///
    /// # Errors
    ///
    /// Returns an error when the images do not share one size.
    pub fn normalize_batch(&self, imgs: &[RgbImage]) -> Result<Tensor4D, InchiError> {
        let Some(first) = imgs.first() else {
            return Ok(Tensor4D::zeros((0, 3, 0, 0)));
        };
        let (width, height) = first.dimensions();
        if let Some((idx, img)) = imgs
            .iter()
            .enumerate()
            .find(|(_, img)| img.dimensions() != (width, height))
        {
            return Err(InchiError::shape_mismatch(
                "batch_normalization",
                &[height as usize, width as usize],
                &[img.height() as usize, img.width() as usize],
                &format!("image {idx} differs in size from the first image of the batch"),
            ));
        }

        let mut batch = Tensor4D::zeros((imgs.len(), 3, height as usize, width as usize));
        batch
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(imgs.par_iter())
            .for_each(|(slot, img)| self.normalize_into(img, slot));
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_imagenet_values() {
        let norm = NormalizeImage::imagenet().unwrap();
        let img = RgbImage::from_pixel(2, 1, Rgb([255, 0, 128]));
        let out = norm.normalize(&img);
        assert_eq!(out.shape(), &[3, 1, 2]);
        let expected_r = (1.0 - 0.485) / 0.229;
        let expected_g = (0.0 - 0.456) / 0.224;
        let expected_b = (128.0 / 255.0 - 0.406) / 0.225;
        assert!((out[[0, 0, 1]] - expected_r).abs() < 1e-5);
        assert!((out[[1, 0, 0]] - expected_g).abs() < 1e-5);
        assert!((out[[2, 0, 0]] - expected_b).abs() < 1e-5);
    }

    #[test]
    fn test_chw_layout() {
        let norm = NormalizeImage::new(Some(1.0), Some([0.0; 3]), Some([1.0; 3])).unwrap();
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([1, 2, 3]));
        let out = norm.normalize(&img);
        assert_eq!(out[[0, 0, 1]], 1.0);
        assert_eq!(out[[1, 0, 1]], 2.0);
        assert_eq!(out[[2, 0, 1]], 3.0);
        assert_eq!(out[[0, 1, 0]], 0.0);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(NormalizeImage::new(Some(0.0), None, None).is_err());
        assert!(NormalizeImage::new(None, None, Some([1.0, -1.0, 1.0])).is_err());
    }

    #[test]
    fn test_normalize_batch_stacks_images() {
        let norm = NormalizeImage::new(Some(1.0), Some([0.0; 3]), Some([1.0; 3])).unwrap();
        let imgs = vec![
            RgbImage::from_pixel(3, 2, Rgb([1, 1, 1])),
            RgbImage::from_pixel(3, 2, Rgb([2, 2, 2])),
        ];
        let batch = norm.normalize_batch(&imgs).unwrap();
        assert_eq!(batch.shape(), &[2, 3, 2, 3]);
        assert!(batch.index_axis(Axis(0), 0).iter().all(|&v| v == 1.0));
        assert!(batch.index_axis(Axis(0), 1).iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_normalize_batch_rejects_mixed_sizes() {
        let norm = NormalizeImage::imagenet().unwrap();
        let imgs = vec![RgbImage::new(3, 2), RgbImage::new(2, 3)];
        assert!(norm.normalize_batch(&imgs).is_err());
    }

    #[test]
    fn test_normalize_empty_batch() {
        let norm = NormalizeImage::imagenet().unwrap();
        assert_eq!(norm.normalize_batch(&[]).unwrap().shape(), &[0, 3, 0, 0]);
    }
}
