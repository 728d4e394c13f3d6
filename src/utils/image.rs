//! Utility functions for loading images.
//!
//! The molecule renderings are stored as grayscale PNGs; every loader here
//! returns RGB so the encoder always receives three channels.

use crate::core::constants::DEFAULT_PARALLEL_THRESHOLD;
use crate::core::errors::InchiError;
use image::{DynamicImage, RgbImage};
use rayon::prelude::*;
use std::path::Path;

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns `InchiError::ImageLoad` if the file is missing or cannot be decoded.
pub fn load_image(path: &Path) -> Result<RgbImage, InchiError> {
    let img = image::open(path).map_err(|e| InchiError::image_load(path, e))?;
    Ok(dynamic_to_rgb(img))
}

/// Loads a batch of images, switching to the current rayon pool once the batch
/// is larger than `parallel_threshold` (or [`DEFAULT_PARALLEL_THRESHOLD`]).
///
/// The output order matches `paths`. The first failure aborts the batch.
pub fn load_images_batch_with_threshold<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
    parallel_threshold: Option<usize>,
) -> Result<Vec<RgbImage>, InchiError> {
    let threshold = parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD);

    if paths.len() > threshold {
        paths.par_iter().map(|p| load_image(p.as_ref())).collect()
    } else {
        paths.iter().map(|p| load_image(p.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn write_gray(dir: &Path, name: &str, w: u32, h: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        GrayImage::from_pixel(w, h, Luma([200])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_load_image_converts_gray_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gray(dir.path(), "a.png", 4, 3);
        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(0, 0).0, [200, 200, 200]);
    }

    #[test]
    fn test_load_image_missing_file() {
        let err = load_image(Path::new("/nonexistent/a.png")).unwrap_err();
        assert!(matches!(err, InchiError::ImageLoad { .. }));
    }

    #[test]
    fn test_batch_preserves_order_in_parallel() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (1..=6)
            .map(|i| write_gray(dir.path(), &format!("{i}.png"), i, 1))
            .collect();
        let images = load_images_batch_with_threshold(&paths, Some(2)).unwrap();
        let widths: Vec<u32> = images.iter().map(|img| img.width()).collect();
        assert_eq!(widths, vec![1, 2, 3, 4, 5, 6]);
    }
}
