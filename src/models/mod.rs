//! The two pretrained components of the translator.
//!
//! The image encoder turns a batch of normalized images into a feature map and
//! the attention decoder turns that feature map into per-step logits over the
//! token vocabulary. Both are exported ONNX graphs; the traits below are the
//! seam the inference loop is written against.

pub mod decoder;
pub mod encoder;

pub use decoder::{OnnxAttentionDecoder, OnnxAttentionDecoderBuilder};
pub use encoder::{OnnxEncoder, OnnxEncoderBuilder};

use crate::core::config::OrtSessionConfig;
use crate::core::errors::{InchiError, InchiResult};
use crate::core::inference::OrtInfer;
use crate::core::{Tensor3D, Tensor4D};
use std::path::{Path, PathBuf};

/// Maps a batch of images `[N, 3, S, S]` to encoder features.
pub trait ImageEncoder {
    fn encode(&self, images: &Tensor4D) -> InchiResult<Tensor4D>;
}

/// Maps encoder features to logits `[N, T, V]` with `T <= max_len`.
pub trait SequenceDecoder {
    fn predict(&self, features: &Tensor4D, max_len: usize) -> InchiResult<Tensor3D>;

    /// Size of the output vocabulary, when known before running.
    fn vocab_size(&self) -> Option<usize> {
        None
    }
}

/// Locations of the exported encoder and decoder graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub encoder: PathBuf,
    pub decoder: PathBuf,
}

impl ModelPaths {
    pub fn new(encoder: impl Into<PathBuf>, decoder: impl Into<PathBuf>) -> Self {
        Self {
            encoder: encoder.into(),
            decoder: decoder.into(),
        }
    }

    /// Resolves `{model_name}_fold0_best_encoder.onnx` and
    /// `{model_name}_fold0_best_decoder.onnx` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` naming the first graph that does not exist.
    pub fn from_checkpoint_dir(dir: impl AsRef<Path>, model_name: &str) -> InchiResult<Self> {
        let dir = dir.as_ref();
        let stem = format!("{model_name}_fold0_best");
        let paths = Self::new(
            dir.join(format!("{stem}_encoder.onnx")),
            dir.join(format!("{stem}_decoder.onnx")),
        );
        for path in [&paths.encoder, &paths.decoder] {
            if !path.is_file() {
                return Err(InchiError::model_load_error(
                    path,
                    "checkpoint graph not found",
                    Some("pass --encoder/--decoder or check --checkpoint-dir and model_name"),
                    None::<std::io::Error>,
                ));
            }
        }
        Ok(paths)
    }
}

/// Session settings shared by both model builders.
///
/// A builder pool size overrides the one carried by `ort_config`; without
/// either, a single session is used.
fn resolve_session_config(
    session_pool_size: Option<usize>,
    ort_config: Option<OrtSessionConfig>,
) -> OrtSessionConfig {
    let config = ort_config.unwrap_or_default();
    match session_pool_size {
        Some(size) => config.with_session_pool_size(size),
        None => config,
    }
}

fn build_inference(
    model_path: &Path,
    session_pool_size: Option<usize>,
    ort_config: Option<OrtSessionConfig>,
) -> InchiResult<OrtInfer> {
    let config = resolve_session_config(session_pool_size, ort_config);
    OrtInfer::from_config(&config, model_path, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_paths_follow_model_name() {
        let dir = tempfile::tempdir().unwrap();
        let enc = dir.path().join("resnet34_fold0_best_encoder.onnx");
        let dec = dir.path().join("resnet34_fold0_best_decoder.onnx");
        std::fs::write(&enc, b"").unwrap();
        std::fs::write(&dec, b"").unwrap();

        let paths = ModelPaths::from_checkpoint_dir(dir.path(), "resnet34").unwrap();
        assert_eq!(paths, ModelPaths::new(enc, dec));
    }

    #[test]
    fn test_config_pool_size_kept_without_builder_override() {
        let from_config = OrtSessionConfig::new().with_session_pool_size(4);
        let resolved = resolve_session_config(None, Some(from_config.clone()));
        assert_eq!(resolved.pool_size(), 4);
        assert_eq!(resolved, from_config);
    }

    #[test]
    fn test_builder_pool_size_overrides_config() {
        let from_config = OrtSessionConfig::new().with_session_pool_size(4);
        assert_eq!(resolve_session_config(Some(2), Some(from_config)).pool_size(), 2);
        assert_eq!(resolve_session_config(Some(3), None).pool_size(), 3);
        assert_eq!(resolve_session_config(None, None).pool_size(), 1);
    }

    #[test]
    fn test_missing_decoder_graph() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("resnet34_fold0_best_encoder.onnx"), b"").unwrap();
        let err = ModelPaths::from_checkpoint_dir(dir.path(), "resnet34").unwrap_err();
        assert!(matches!(err, InchiError::ModelLoad { .. }));
        assert!(err.to_string().contains("decoder"));
    }
}
