//! ONNX Runtime configuration types and utilities.

use crate::core::errors::{InchiError, InchiResult};
use serde::{Deserialize, Serialize};

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    #[default]
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
}

/// Execution providers for ONNX Runtime.
///
/// Providers are tried in the order they are listed; ONNX Runtime falls back to
/// the next one when a provider is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum OrtExecutionProvider {
    /// CPU execution provider (always available)
    #[default]
    CPU,
    /// NVIDIA CUDA execution provider
    CUDA {
        /// CUDA device ID (default: 0)
        device_id: Option<i32>,
    },
    /// TensorRT execution provider
    TensorRT {
        /// TensorRT device ID (default: 0)
        device_id: Option<i32>,
        /// FP16 enable flag
        fp16_enable: Option<bool>,
    },
}

/// Configuration for ONNX Runtime sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes
    pub inter_threads: Option<usize>,
    /// Graph optimization level
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
    /// Execution providers in order of preference
    pub execution_providers: Option<Vec<OrtExecutionProvider>>,
    /// Number of sessions kept per model for concurrent calls
    pub session_pool_size: Option<usize>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }

    /// Sets the execution providers.
    pub fn with_execution_providers(mut self, providers: Vec<OrtExecutionProvider>) -> Self {
        self.execution_providers = Some(providers);
        self
    }

    /// Sets how many sessions each model keeps.
    pub fn with_session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = Some(size);
        self
    }

    /// Effective pool size, never below one.
    pub fn pool_size(&self) -> usize {
        self.session_pool_size.unwrap_or(1).max(1)
    }

    /// Gets the execution providers, defaulting to CPU.
    pub fn get_execution_providers(&self) -> Vec<OrtExecutionProvider> {
        self.execution_providers
            .clone()
            .unwrap_or_else(|| vec![OrtExecutionProvider::CPU])
    }
}

/// Parses a device string (`cpu`, `cuda`, `cuda:N`, `tensorrt`, `tensorrt:N`)
/// into execution providers in order of preference.
///
/// GPU providers are always followed by a CPU fallback.
pub fn parse_device(device: &str) -> InchiResult<Vec<OrtExecutionProvider>> {
    let device = device.trim().to_lowercase();
    let (kind, index) = match device.split_once(':') {
        Some((kind, index)) => {
            let id: i32 = index.parse().map_err(|_| {
                InchiError::invalid_field("device", "a numeric device index", index)
            })?;
            (kind.to_string(), Some(id))
        }
        None => (device.clone(), None),
    };

    match kind.as_str() {
        "cpu" if index.is_none() => Ok(vec![OrtExecutionProvider::CPU]),
        "cuda" => Ok(vec![
            OrtExecutionProvider::CUDA {
                device_id: Some(index.unwrap_or(0)),
            },
            OrtExecutionProvider::CPU,
        ]),
        "tensorrt" => Ok(vec![
            OrtExecutionProvider::TensorRT {
                device_id: Some(index.unwrap_or(0)),
                fp16_enable: None,
            },
            OrtExecutionProvider::CPU,
        ]),
        _ => Err(InchiError::invalid_field(
            "device",
            "cpu, cuda, cuda:N, tensorrt or tensorrt:N",
            device,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ort_session_config_builder() {
        let config = OrtSessionConfig::new()
            .with_intra_threads(4)
            .with_inter_threads(2)
            .with_optimization_level(OrtGraphOptimizationLevel::Level2)
            .with_session_pool_size(0);

        assert_eq!(config.intra_threads, Some(4));
        assert_eq!(config.inter_threads, Some(2));
        assert_eq!(
            config.optimization_level,
            Some(OrtGraphOptimizationLevel::Level2)
        );
        assert_eq!(config.pool_size(), 1);
        assert_eq!(
            config.get_execution_providers(),
            vec![OrtExecutionProvider::CPU]
        );
    }

    #[test]
    fn test_parse_device_cpu() {
        assert_eq!(parse_device("CPU").unwrap(), vec![OrtExecutionProvider::CPU]);
    }

    #[test]
    fn test_parse_device_cuda_with_index() {
        let providers = parse_device("cuda:1").unwrap();
        assert_eq!(
            providers,
            vec![
                OrtExecutionProvider::CUDA { device_id: Some(1) },
                OrtExecutionProvider::CPU
            ]
        );
    }

    #[test]
    fn test_parse_device_rejects_unknown() {
        assert!(parse_device("tpu").is_err());
        assert!(parse_device("cuda:x").is_err());
        assert!(parse_device("cpu:0").is_err());
    }

    #[test]
    fn test_session_config_deserializes_partial_json() {
        let config: OrtSessionConfig =
            serde_json::from_str(r#"{"intra_threads": 2, "execution_providers": ["CPU"]}"#)
                .unwrap();
        assert_eq!(config.intra_threads, Some(2));
        assert!(config.optimization_level.is_none());
    }
}
