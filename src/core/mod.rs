//! The core module of the translation pipeline.
//!
//! This module contains the fundamental pieces shared by every stage:
//! - Batch helpers and tensor aliases
//! - Configuration management
//! - Constants taken from the pretrained checkpoint
//! - Error handling
//! - ONNX Runtime integration

pub mod batch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;

pub use batch::{BatchSampler, Tensor2D, Tensor3D, Tensor4D};
pub use config::{
    InferenceConfig, OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig,
    parse_device,
};
pub use constants::*;
pub use errors::{InchiError, InchiResult, ProcessingStage, SimpleError, error_chain};
pub use inference::OrtInfer;

/// Initializes the tracing subscriber for logging.
///
/// The filter comes from `RUST_LOG` and defaults to `info` when unset. Calling
/// this twice is harmless; the second call leaves the first subscriber in place.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
