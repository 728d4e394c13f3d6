//! Image processing and decoding utilities.
//!
//! * [`resize`] - portrait correction and square resizing
//! * [`normalization`] - scaling, standardization and CHW layout
//! * [`preprocess`] - the full transform chain used before the encoder
//! * [`decode`] - greedy decoding of decoder logits

pub mod decode;
pub mod normalization;
pub mod preprocess;
pub mod resize;

pub use decode::greedy_decode;
pub use normalization::NormalizeImage;
pub use preprocess::ImagePreprocessor;
pub use resize::{ResizeImage, fix_orientation};
