//! # InChI OCR
//!
//! Translates images of chemical structures into InChI strings with a pretrained
//! CNN encoder and attention LSTM decoder exported to ONNX, and scores the
//! predictions against labels with the Levenshtein distance.
//!
//! ## Features
//!
//! - Batched, multi-threaded image loading and preprocessing
//! - ONNX Runtime inference with session pooling and optional CUDA/TensorRT
//! - Greedy decoding into InChI strings through a token vocabulary
//! - Evaluation and submission CSV outputs
//!
//! ## Modules
//!
//! * [`core`] - Configuration, errors, tensor aliases and the ONNX session wrapper
//! * [`data`] - Label files, image paths, sampling and the batched loader
//! * [`evaluation`] - Levenshtein scoring
//! * [`models`] - Encoder and decoder traits with their ONNX implementations
//! * [`pipeline`] - The inference loop and CSV outputs
//! * [`processors`] - Image transforms and logits decoding
//! * [`utils`] - Image loading, vocabulary and progress reporting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use inchi_ocr::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InferenceConfig::new().with_batch_size(64);
//! let paths = ModelPaths::from_checkpoint_dir("checkpoints", &config.model_name)?;
//! let encoder = OnnxEncoder::builder().build(&paths.encoder)?;
//! let decoder = OnnxAttentionDecoder::builder().build(&paths.decoder)?;
//! let vocab = Vocabulary::from_file("checkpoints/vocab.json")?;
//! let predictor = InchiPredictor::new(encoder, decoder, vocab, config)?;
//!
//! let labels = read_labels("data/train_labels.csv")?;
//! let sample = sample_records(&labels, 100, predictor.config().seed);
//! let dataset = ImageDataset::from_labels(Path::new("data"), &sample)?;
//! let rows = join_predictions(&sample, predictor.predict_dataset(&dataset)?);
//! println!("{:?}", evaluate(&rows)?);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod evaluation;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use inchi_ocr::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{InchiError, InchiResult, InferenceConfig, OrtSessionConfig};

    pub use crate::data::{
        ImageDataset, read_labels, read_submission_template, sample_records,
    };
    pub use crate::evaluation::{EvaluationReport, evaluate};
    pub use crate::models::{ModelPaths, OnnxAttentionDecoder, OnnxEncoder};
    pub use crate::pipeline::{
        InchiPredictor, Prediction, join_predictions, write_evaluation_csv,
        write_submission_csv,
    };
    pub use crate::utils::{Vocabulary, load_image};
}
