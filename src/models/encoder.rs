//! CNN image encoder backed by an ONNX graph.

use super::{ImageEncoder, build_inference};
use crate::core::config::OrtSessionConfig;
use crate::core::inference::OrtInfer;
use crate::core::{InchiError, InchiResult, Tensor4D};
use std::path::Path;

/// Encoder graph: `[N, 3, S, S]` images in, 4D feature map out.
#[derive(Debug)]
pub struct OnnxEncoder {
    inference: OrtInfer,
}

impl OnnxEncoder {
    pub fn new(inference: OrtInfer) -> Self {
        Self { inference }
    }

    pub fn builder() -> OnnxEncoderBuilder {
        OnnxEncoderBuilder::new()
    }

    /// Declared input shape, with `-1` for dynamic axes.
    pub fn input_shape(&self) -> Option<Vec<i64>> {
        self.inference.primary_input_shape()
    }
}

impl ImageEncoder for OnnxEncoder {
    fn encode(&self, images: &Tensor4D) -> InchiResult<Tensor4D> {
        self.inference
            .infer_4d(images)
            .map_err(|e| InchiError::Inference {
                model_name: self.inference.model_name().to_string(),
                context: format!(
                    "failed to encode batch with shape {:?}",
                    images.shape()
                ),
                source: Box::new(e),
            })
    }
}

/// Builder for [`OnnxEncoder`].
#[derive(Debug, Clone)]
pub struct OnnxEncoderBuilder {
    session_pool_size: Option<usize>,
    ort_config: Option<OrtSessionConfig>,
}

impl OnnxEncoderBuilder {
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

    pub fn build(self, model_path: &Path) -> InchiResult<OnnxEncoder> {
        let inference = build_inference(model_path, self.session_pool_size, self.ort_config)?;
        Ok(OnnxEncoder::new(inference))
    }
}

impl Default for OnnxEncoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_missing_graph() {
        let result = OnnxEncoder::builder()
            .session_pool_size(2)
            .build(Path::new("missing_encoder.onnx"));
        assert!(matches!(result, Err(InchiError::ModelLoad { .. })));
    }
}
