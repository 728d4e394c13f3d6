//! Core ONNX Runtime inference engine with session pooling.

use crate::core::{
    batch::{Tensor3D, Tensor4D},
    errors::InchiError,
};
use ort::{session::Session, value::ValueType};
use std::sync::Mutex;

#[path = "ort_infer_builders.rs"]
mod ort_infer_builders;
#[path = "ort_infer_execution.rs"]
mod ort_infer_execution;
#[cfg(test)]
#[path = "ort_infer_tests.rs"]
mod ort_infer_tests;

/// Input names tried, in order, when the caller does not name the graph input.
pub(crate) const COMMON_INPUT_NAMES: [&str; 6] =
    ["images", "image", "features", "encoder_out", "input", "x"];

pub struct OrtInfer {
    pub(super) sessions: Vec<Mutex<Session>>,
    pub(super) next_idx: std::sync::atomic::AtomicUsize,
    pub(super) input_name: String,
    pub(super) output_name: Option<String>,
    pub(super) model_path: std::path::PathBuf,
    pub(super) model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Attempts to retrieve the primary input tensor shape from the first session.
    ///
    /// Dynamic dimensions (e.g., -1) are returned as-is.
    pub fn primary_input_shape(&self) -> Option<Vec<i64>> {
        let session_guard = self.sessions.first()?.lock().ok()?;
        let input = session_guard.inputs.first()?;
        match &input.input_type {
            ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
            _ => None,
        }
    }

    /// Attempts to retrieve the primary output tensor shape from the first session.
    pub fn primary_output_shape(&self) -> Option<Vec<i64>> {
        let session_guard = self.sessions.first()?.lock().ok()?;
        let output = session_guard.outputs.first()?;
        match &output.output_type {
            ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
            _ => None,
        }
    }

    /// Name of the graph input fed by this engine.
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Number of pooled sessions.
    pub fn pool_size(&self) -> usize {
        self.sessions.len()
    }

    /// Runs a 4D input through the graph and returns a 4D output.
    pub fn infer_4d(&self, x: &Tensor4D) -> Result<Tensor4D, InchiError> {
        self.run_4d(x)
    }

    /// Runs a 4D input through the graph and returns a 3D output.
    pub fn infer_3d(&self, x: &Tensor4D) -> Result<Tensor3D, InchiError> {
        self.run_3d(x)
    }
}
