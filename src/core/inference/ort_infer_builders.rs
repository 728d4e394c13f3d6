use super::*;
use crate::core::config::{OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig};
use ort::execution_providers::ExecutionProviderDispatch;
use ort::logging::LogLevel;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use std::path::Path;

impl OrtInfer {
    /// Creates a new OrtInfer instance with default ONNX Runtime settings and a single session.
    pub fn new(model_path: impl AsRef<Path>, input_name: Option<&str>) -> Result<Self, InchiError> {
        Self::from_config(&OrtSessionConfig::default(), model_path, input_name)
    }

    /// Creates a single-session engine and picks the input name from the graph.
    pub fn with_auto_input_name(model_path: impl AsRef<Path>) -> Result<Self, InchiError> {
        Self::from_config(&OrtSessionConfig::default(), model_path, None)
    }

    /// Creates an engine from session options, constructing a session pool for
    /// concurrent predictions. Without an explicit `input_name` the first
    /// graph input matching [`COMMON_INPUT_NAMES`] is used, falling back to the
    /// graph's first input.
    pub fn from_config(
        config: &OrtSessionConfig,
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
    ) -> Result<Self, InchiError> {
        let path = model_path.as_ref();
        if !path.is_file() {
            return Err(InchiError::model_load_error(
                path,
                "model file not found",
                Some("export the checkpoint to ONNX and check the path"),
                None::<ort::Error>,
            ));
        }

        let pool_size = config.pool_size();
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let builder = Self::apply_ort_config(Session::builder()?, config)?;
            let session = builder.commit_from_file(path).map_err(|e| {
                InchiError::model_load_error(
                    path,
                    "failed to create ONNX session",
                    Some("check device/EP configuration and model file"),
                    Some(e),
                )
            })?;
            sessions.push(Mutex::new(session));
        }

        let input_name = match input_name {
            Some(name) => name.to_string(),
            None => Self::detect_input_name(&sessions[0], path)?,
        };

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        tracing::debug!(
            model = %model_name,
            input = %input_name,
            pool_size,
            "loaded ONNX session"
        );

        Ok(OrtInfer {
            sessions,
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name,
            output_name: None,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Pins the output tensor read after each run.
    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = Some(output_name.into());
        self
    }

    fn detect_input_name(session: &Mutex<Session>, path: &Path) -> Result<String, InchiError> {
        let session = session
            .lock()
            .map_err(|_| InchiError::invalid_input("Failed to acquire session lock"))?;
        let available: Vec<&str> = session.inputs.iter().map(|i| i.name.as_str()).collect();
        COMMON_INPUT_NAMES
            .iter()
            .find(|name| available.contains(name))
            .map(|name| name.to_string())
            .or_else(|| available.first().map(|name| name.to_string()))
            .ok_or_else(|| {
                InchiError::model_load_error(
                    path,
                    "graph declares no inputs",
                    None,
                    None::<ort::Error>,
                )
            })
    }

    fn apply_ort_config(
        mut builder: SessionBuilder,
        cfg: &OrtSessionConfig,
    ) -> Result<SessionBuilder, ort::Error> {
        builder = builder.with_log_level(LogLevel::Error)?;
        if let Some(intra) = cfg.intra_threads {
            builder = builder.with_intra_threads(intra)?;
        }
        if let Some(inter) = cfg.inter_threads {
            builder = builder.with_inter_threads(inter)?;
        }
        if let Some(level) = cfg.optimization_level {
            let mapped = match level {
                OrtGraphOptimizationLevel::DisableAll => GraphOptimizationLevel::Disable,
                OrtGraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
                OrtGraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
                OrtGraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
            };
            builder = builder.with_optimization_level(mapped)?;
        }
        if let Some(eps) = &cfg.execution_providers {
            let providers = Self::build_execution_providers(eps)?;
            if !providers.is_empty() {
                builder = builder.with_execution_providers(providers)?;
            }
        }
        Ok(builder)
    }

    fn build_execution_providers(
        eps: &[OrtExecutionProvider],
    ) -> Result<Vec<ExecutionProviderDispatch>, ort::Error> {
        let mut providers = Vec::with_capacity(eps.len());
        for ep in eps {
            match ep {
                OrtExecutionProvider::CPU => {
                    providers.push(ort::execution_providers::CPUExecutionProvider::default().build());
                }
                #[cfg(feature = "cuda")]
                OrtExecutionProvider::CUDA { device_id } => {
                    let mut cuda = ort::execution_providers::CUDAExecutionProvider::default();
                    if let Some(id) = device_id {
                        cuda = cuda.with_device_id(*id);
                    }
                    providers.push(cuda.build());
                }
                #[cfg(feature = "tensorrt")]
                OrtExecutionProvider::TensorRT {
                    device_id,
                    fp16_enable,
                } => {
                    let mut trt = ort::execution_providers::TensorRTExecutionProvider::default();
                    if let Some(id) = device_id {
                        trt = trt.with_device_id(*id);
                    }
                    if let Some(fp16) = fp16_enable {
                        trt = trt.with_fp16(*fp16);
                    }
                    providers.push(trt.build());
                }
                #[cfg(not(feature = "cuda"))]
                OrtExecutionProvider::CUDA { .. } => {
                    tracing::warn!("CUDA requested but cuda feature not enabled, skipping provider");
                }
                #[cfg(not(feature = "tensorrt"))]
                OrtExecutionProvider::TensorRT { .. } => {
                    tracing::warn!(
                        "TensorRT requested but tensorrt feature not enabled, skipping provider"
                    );
                }
            }
        }
        Ok(providers)
    }
}
