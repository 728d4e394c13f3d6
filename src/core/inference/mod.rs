//! Structures and helpers for ONNX Runtime inference.
//!
//! [`OrtInfer`] wraps a small pool of sessions for one exported graph and
//! converts between `ndarray` tensors and ONNX Runtime values.

pub mod ort_infer;

pub use ort_infer::OrtInfer;
