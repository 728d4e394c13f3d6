//! Configuration management for the translation pipeline.
//!
//! [`InferenceConfig`] carries everything the inference loop needs besides the
//! model files themselves. It can be built in code, deserialized from a JSON
//! file, or overridden field by field from the command line.

pub mod onnx;

pub use onnx::*;

use crate::core::constants::*;
use crate::core::errors::{InchiError, InchiResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a single inference run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Maximum number of tokens decoded per image.
    pub max_len: usize,
    /// Side length of the square encoder input.
    pub size: u32,
    /// Images per forward pass.
    pub batch_size: usize,
    /// Threads used to load and preprocess images.
    pub num_workers: usize,
    /// Seed for sampling labelled rows.
    pub seed: u64,
    /// Number of labelled rows scored by an evaluation run.
    pub sample_size: usize,
    /// Encoder backbone name; also the stem of the checkpoint files.
    pub model_name: String,
    /// Rotate portrait images by 90° before resizing.
    pub fix_orientation: bool,
    /// Channel means applied after scaling to `[0, 1]`.
    pub normalize_mean: [f32; 3],
    /// Channel standard deviations applied after mean subtraction.
    pub normalize_std: [f32; 3],
    /// Text prepended to every decoded caption.
    pub inchi_prefix: String,
    /// ONNX Runtime session options shared by encoder and decoder.
    pub ort_session: Option<OrtSessionConfig>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            size: DEFAULT_IMAGE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            num_workers: DEFAULT_NUM_WORKERS,
            seed: DEFAULT_SEED,
            sample_size: DEFAULT_SAMPLE_SIZE,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            fix_orientation: true,
            normalize_mean: IMAGENET_MEAN,
            normalize_std: IMAGENET_STD,
            inchi_prefix: INCHI_PREFIX.to_string(),
            ort_session: None,
        }
    }
}

impl InferenceConfig {
    /// Creates a configuration with the checkpoint defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> InchiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            InchiError::config_error(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the maximum decoded length.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Sets the encoder input size.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Sets the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the number of loader threads.
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Sets the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of sampled rows.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Enables or disables the portrait rotation.
    pub fn with_fix_orientation(mut self, enabled: bool) -> Self {
        self.fix_orientation = enabled;
        self
    }

    /// Sets the ONNX Runtime session options.
    pub fn with_ort_session(mut self, ort_session: OrtSessionConfig) -> Self {
        self.ort_session = Some(ort_session);
        self
    }

    /// Checks that every field is usable by the pipeline.
    pub fn validate(&self) -> InchiResult<()> {
        if self.max_len == 0 {
            return Err(InchiError::invalid_field("max_len", "> 0", self.max_len));
        }
        if self.size == 0 {
            return Err(InchiError::invalid_field("size", "> 0", self.size));
        }
        if self.batch_size == 0 {
            return Err(InchiError::invalid_field("batch_size", "> 0", self.batch_size));
        }
        if self.num_workers == 0 {
            return Err(InchiError::invalid_field(
                "num_workers",
                "> 0",
                self.num_workers,
            ));
        }
        if self.model_name.trim().is_empty() {
            return Err(InchiError::config_error("model_name must not be empty"));
        }
        for (i, (&m, &s)) in self
            .normalize_mean
            .iter()
            .zip(self.normalize_std.iter())
            .enumerate()
        {
            if !m.is_finite() {
                return Err(InchiError::invalid_field(
                    &format!("normalize_mean[{i}]"),
                    "a finite value",
                    m,
                ));
            }
            if !s.is_finite() || s <= 0.0 {
                return Err(InchiError::invalid_field(
                    &format!("normalize_std[{i}]"),
                    "a finite value > 0",
                    s,
                ));
            }
        }
        Ok(())
    }
}
