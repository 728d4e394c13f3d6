//! Attention LSTM decoder backed by an ONNX graph.
//!
//! The exported graph runs the greedy decoding steps internally and returns the
//! logits of every step, `[N, T, V]`. The step count is fixed at export time,
//! so the output is cut down to the requested `max_len` here.

use super::{SequenceDecoder, build_inference};
use crate::core::config::OrtSessionConfig;
use crate::core::inference::OrtInfer;
use crate::core::{InchiError, InchiResult, Tensor3D, Tensor4D};
use ndarray::s;
use std::path::Path;

#[derive(Debug)]
pub struct OnnxAttentionDecoder {
    inference: OrtInfer,
}

impl OnnxAttentionDecoder {
    pub fn new(inference: OrtInfer) -> Self {
        Self { inference }
    }

    pub fn builder() -> OnnxAttentionDecoderBuilder {
        OnnxAttentionDecoderBuilder::new()
    }
}

/// Keeps the first `max_len` steps of `[N, T, V]` logits.
pub(crate) fn truncate_steps(logits: Tensor3D, max_len: usize) -> Tensor3D {
    if logits.shape()[1] <= max_len {
        logits
    } else {
        logits.slice(s![.., ..max_len, ..]).to_owned()
    }
}

impl SequenceDecoder for OnnxAttentionDecoder {
    fn predict(&self, features: &Tensor4D, max_len: usize) -> InchiResult<Tensor3D> {
        let logits = self
            .inference
            .infer_3d(features)
            .map_err(|e| InchiError::Inference {
                model_name: self.inference.model_name().to_string(),
                context: format!(
                    "failed to decode features with shape {:?}",
                    features.shape()
                ),
                source: Box::new(e),
            })?;
        Ok(truncate_steps(logits, max_len))
    }

    fn vocab_size(&self) -> Option<usize> {
        let shape = self.inference.primary_output_shape()?;
        match shape.last() {
            Some(&v) if v > 0 => Some(v as usize),
            _ => None,
        }
    }
}

/// Builder for [`OnnxAttentionDecoder`].
#[derive(Debug, Clone)]
pub struct OnnxAttentionDecoderBuilder {
    session_pool_size: Option<usize>,
    ort_config: Option<OrtSessionConfig>,
}

impl OnnxAttentionDecoderBuilder {
    pub fn new() -> Self {
        Self {
            session_pool_size: None,
            ort_config: None,
        }
    }

    /// Sets the session pool size, overriding the one in the session configuration.
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = Some(size);
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.ort_config = Some(config);
        self
    }

    pub fn build(self, model_path: &Path) -> InchiResult<OnnxAttentionDecoder> {
        let inference = build_inference(model_path, self.session_pool_size, self.ort_config)?;
        Ok(OnnxAttentionDecoder::new(inference))
    }
}

impl Default for OnnxAttentionDecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_truncate_steps() {
        let logits = Array3::<f32>::from_shape_fn((2, 10, 4), |(_, t, _)| t as f32);
        let cut = truncate_steps(logits.clone(), 3);
        assert_eq!(cut.shape(), &[2, 3, 4]);
        assert_eq!(cut[[1, 2, 0]], 2.0);

        let kept = truncate_steps(logits, 275);
        assert_eq!(kept.shape(), &[2, 10, 4]);
    }

    #[test]
    fn test_build_missing_graph() {
        let result = OnnxAttentionDecoder::builder().build(Path::new("missing_decoder.onnx"));
        assert!(matches!(result, Err(InchiError::ModelLoad { .. })));
    }
}
