//! Error types for the InChI translation pipeline.
//!
//! Every fallible operation in the crate returns [`InchiResult`]. Errors keep the
//! underlying cause as a `source` so that callers can walk the chain when
//! reporting failures from ONNX Runtime, image decoding or CSV parsing.

use std::path::Path;
use thiserror::Error;

/// Enum representing different stages of processing in the pipeline.
///
/// This enum is used to identify which stage of processing an error occurred in,
/// which helps with debugging and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred during tensor operations.
    TensorOperation,
    /// Error occurred during image normalization.
    Normalization,
    /// Error occurred during image resizing.
    Resize,
    /// Error occurred during batch processing.
    BatchProcessing,
    /// Error occurred while turning logits into text.
    PostProcessing,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::BatchProcessing => write!(f, "batch processing"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Errors that can occur while loading models, reading data, running inference
/// or scoring predictions.
#[derive(Error, Debug)]
pub enum InchiError {
    /// Error occurred while loading an image.
    #[error("image load: {path}")]
    ImageLoad {
        /// Path of the image that failed to load.
        path: String,
        /// The underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while running a model.
    #[error("inference failed for model '{model_name}': {context}")]
    Inference {
        /// Name of the model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during a forward pass with known tensor shapes.
    #[error(
        "model '{model_name}' {operation} failed (batch {batch_index}, input shape {input_shape:?}): {context}"
    )]
    ModelInference {
        /// Name of the model that failed.
        model_name: String,
        /// The operation that failed (conversion, forward pass, extraction).
        operation: String,
        /// Index of the batch being processed.
        batch_index: usize,
        /// Shape of the input tensor.
        input_shape: Vec<usize>,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while loading a model graph.
    #[error("failed to load model '{path}': {reason}{}", suggestion.as_ref().map(|s| format!(" ({s})")).unwrap_or_default())]
    ModelLoad {
        /// Path of the model file.
        path: String,
        /// Why loading failed.
        reason: String,
        /// Optional hint for the user.
        suggestion: Option<String>,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// Error reading or writing CSV.
    #[error("csv")]
    Csv(#[from] csv::Error),

    /// Error parsing JSON configuration or vocabulary files.
    #[error("json")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for crate operations.
pub type InchiResult<T> = Result<T, InchiError>;

/// Lightweight error carrying only a message, used as a `source` when there is
/// no richer underlying error.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a new message-only error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl InchiError {
    #[inline]
    fn processing_with_context(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an error for tensor operations.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::TensorOperation, context, error)
    }

    /// Creates an error for post-processing operations.
    pub fn post_processing(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::PostProcessing, context, error)
    }

    /// Creates an error for normalization operations.
    pub fn normalization(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::Normalization, context, error)
    }

    /// Creates an error for resize operations.
    pub fn resize_error(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::Resize, context, error)
    }

    /// Creates an error for batch processing operations.
    pub fn batch_processing(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::BatchProcessing, context, error)
    }

    /// Creates an error for a failed inference call on a named model.
    pub fn inference_error(
        model_name: &str,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an error for a failed forward pass, recording the tensor shape.
    pub fn model_inference_error(
        model_name: &str,
        operation: &str,
        batch_index: usize,
        input_shape: &[usize],
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ModelInference {
            model_name: model_name.to_string(),
            operation: operation.to_string(),
            batch_index,
            input_shape: input_shape.to_vec(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an error for a model that could not be loaded.
    pub fn model_load_error(
        path: &Path,
        reason: &str,
        suggestion: Option<&str>,
        error: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        Self::ModelLoad {
            path: path.display().to_string(),
            reason: reason.to_string(),
            suggestion: suggestion.map(str::to_string),
            source: error.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Creates an error for a tensor whose shape does not match expectations.
    pub fn shape_mismatch(
        operation: &str,
        expected: &[usize],
        actual: &[usize],
        context: &str,
    ) -> Self {
        Self::tensor_operation(
            &format!("{operation}: expected {expected:?}, got {actual:?}: {context}"),
            SimpleError::new("tensor shape mismatch"),
        )
    }

    /// Creates an error for an image that failed to decode.
    pub fn image_load(path: &Path, error: image::ImageError) -> Self {
        Self::ImageLoad {
            path: path.display().to_string(),
            source: error,
        }
    }

    /// Creates an error for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a configuration error for a single named field.
    pub fn invalid_field(field: &str, expected: &str, actual: impl std::fmt::Display) -> Self {
        Self::ConfigError {
            message: format!("{field}: expected {expected}, got {actual}"),
        }
    }
}

/// Renders an error followed by every `source()` in its chain, joined by `": "`.
///
/// Variants such as [`InchiError::Csv`] display only their category, so the
/// chain is what carries the parser or filesystem message.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_processing_error_keeps_source() {
        let err = InchiError::normalization(
            "bad channel count",
            std::io::Error::new(std::io::ErrorKind::InvalidData, "4 channels"),
        );
        assert_eq!(err.to_string(), "normalization failed: bad channel count");
        assert_eq!(err.source().map(|e| e.to_string()), Some("4 channels".into()));
    }

    #[test]
    fn test_model_load_error_with_suggestion() {
        let err = InchiError::model_load_error(
            Path::new("models/encoder.onnx"),
            "file not found",
            Some("export the encoder first"),
            None::<SimpleError>,
        );
        let msg = err.to_string();
        assert!(msg.contains("models/encoder.onnx"));
        assert!(msg.contains("(export the encoder first)"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_invalid_field_message() {
        let err = InchiError::invalid_field("batch_size", "> 0", 0);
        assert_eq!(err.to_string(), "configuration: batch_size: expected > 0, got 0");
    }

    #[test]
    fn test_error_chain_includes_json_cause() {
        let err: InchiError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.to_string(), "json");
        let report = error_chain(&err);
        assert!(report.starts_with("json: "));
        assert!(report.contains("line 1"));
    }

    #[test]
    fn test_error_chain_walks_nested_sources() {
        let err = InchiError::inference_error(
            "encoder",
            "batch 0",
            InchiError::normalization("bad input", SimpleError::new("nan pixel")),
        );
        let report = error_chain(&err);
        assert!(report.contains("batch 0"));
        assert!(report.contains("normalization failed: bad input"));
        assert!(report.ends_with("nan pixel"));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(ProcessingStage::PostProcessing.to_string(), "post-processing");
        assert_eq!(ProcessingStage::Generic.to_string(), "processing");
    }
}
