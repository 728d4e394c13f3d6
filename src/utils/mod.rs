//! Utility functions for the translation pipeline: image loading, the token
//! vocabulary and progress reporting.

pub mod image;
pub mod progress;
pub mod vocab;

pub use image::{dynamic_to_rgb, load_image, load_images_batch_with_threshold};
pub use vocab::Vocabulary;
