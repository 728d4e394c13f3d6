//! The validation-time transform chain: orientation fix, square resize and
//! ImageNet normalization.

use super::normalization::NormalizeImage;
use super::resize::{ResizeImage, fix_orientation};
use crate::core::config::InferenceConfig;
use crate::core::errors::InchiError;
use crate::core::Tensor4D;
use image::RgbImage;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    fix_orientation: bool,
    resize: ResizeImage,
    normalize: NormalizeImage,
}

impl ImagePreprocessor {
    pub fn new(
        fix_orientation: bool,
        resize: ResizeImage,
        normalize: NormalizeImage,
    ) -> Self {
        Self {
            fix_orientation,
            resize,
            normalize,
        }
    }

    /// Builds the chain from the run configuration.
    pub fn from_config(config: &InferenceConfig) -> Result<Self, InchiError> {
        Ok(Self::new(
            config.fix_orientation,
            ResizeImage::new(config.size)?,
            NormalizeImage::new(
                None,
                Some(config.normalize_mean),
                Some(config.normalize_std),
            )?,
        ))
    }

    /// Target side length of the output images.
    pub fn size(&self) -> u32 {
        self.resize.size()
    }

    /// Applies the geometric part of the chain to one image.
    pub fn transform(&self, img: RgbImage) -> Result<RgbImage, InchiError> {
        let img = if self.fix_orientation {
            fix_orientation(img)
        } else {
            img
        };
        self.resize.apply(&img)
    }

    /// Transforms and normalizes a batch into an `[N, 3, size, size]` tensor.
    pub fn preprocess_batch(&self, imgs: Vec<RgbImage>) -> Result<Tensor4D, InchiError> {
        let resized = imgs
            .into_par_iter()
            .map(|img| self.transform(img))
            .collect::<Result<Vec<_>, _>>()?;
        self.normalize.normalize_batch(&resized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_preprocess_batch_shape() {
        let config = InferenceConfig::new().with_size(16);
        let pre = ImagePreprocessor::from_config(&config).unwrap();
        let imgs = vec![
            RgbImage::from_pixel(40, 20, Rgb([255, 255, 255])),
            RgbImage::from_pixel(10, 30, Rgb([0, 0, 0])),
        ];
        let batch = pre.preprocess_batch(imgs).unwrap();
        assert_eq!(batch.shape(), &[2, 3, 16, 16]);
        let white_r = (1.0 - 0.485) / 0.229;
        assert!((batch[[0, 0, 8, 8]] - white_r).abs() < 1e-4);
    }

    #[test]
    fn test_transform_respects_orientation_flag() {
        let mut img = RgbImage::new(2, 4);
        img.put_pixel(1, 0, Rgb([255, 0, 0]));

        let rotate = ImagePreprocessor::new(
            true,
            ResizeImage::new(4).unwrap(),
            NormalizeImage::imagenet().unwrap(),
        );
        let keep = ImagePreprocessor::new(
            false,
            ResizeImage::new(4).unwrap(),
            NormalizeImage::imagenet().unwrap(),
        );

        let rotated = rotate.transform(img.clone()).unwrap();
        let kept = keep.transform(img).unwrap();
        assert_eq!(rotated.dimensions(), (4, 4));
        assert_eq!(kept.dimensions(), (4, 4));
        // The red corner ends up top-left only when rotated.
        assert!(rotated.get_pixel(0, 0).0[0] > 0);
        assert_eq!(kept.get_pixel(0, 0).0[0], 0);
    }
}
