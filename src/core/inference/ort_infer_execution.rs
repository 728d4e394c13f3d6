use super::*;
use crate::core::errors::SimpleError;
use ndarray::{ArrayView3, ArrayView4};
use ort::value::TensorRef;

impl OrtInfer {
    /// Returns the configured or discovered output tensor name.
    fn get_output_name(&self) -> Result<String, InchiError> {
        if let Some(ref name) = self.output_name {
            return Ok(name.clone());
        }
        let session = self.sessions[0]
            .lock()
            .map_err(|_| InchiError::invalid_input("Failed to acquire session lock"))?;
        session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                InchiError::invalid_input(
                    "No outputs available in session - model may be invalid or corrupted",
                )
            })
    }

    fn run_inference_with_processor<T>(
        &self,
        x: &Tensor4D,
        processor: impl FnOnce(&[i64], &[f32]) -> Result<T, InchiError>,
    ) -> Result<T, InchiError> {
        let input_shape = x.shape().to_vec();

        let output_name = self.get_output_name().map_err(|e| {
            InchiError::inference_error(
                &self.model_name,
                &format!(
                    "Failed to get output name for model at '{}'",
                    self.model_path.display()
                ),
                e,
            )
        })?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            InchiError::model_inference_error(
                &self.model_name,
                "tensor_conversion",
                0,
                &input_shape,
                &format!("Failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self
            .next_idx
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            InchiError::inference_error(
                &self.model_name,
                &format!(
                    "Failed to acquire session lock for session {}/{}",
                    idx,
                    self.sessions.len()
                ),
                SimpleError::new("Session lock acquisition failed"),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            InchiError::model_inference_error(
                &self.model_name,
                "forward_pass",
                0,
                &input_shape,
                &format!(
                    "ONNX Runtime inference failed with input '{}' -> output '{}'",
                    self.input_name, output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                InchiError::model_inference_error(
                    &self.model_name,
                    "output_extraction",
                    0,
                    &input_shape,
                    &format!("Failed to extract output tensor '{output_name}' as f32"),
                    e,
                )
            })?;

        processor(output_shape, output_data)
    }

    fn output_dims<const N: usize>(
        &self,
        output_shape: &[i64],
        output_len: usize,
    ) -> Result<[usize; N], InchiError> {
        if output_shape.len() != N || output_shape.iter().any(|&d| d < 0) {
            return Err(InchiError::shape_mismatch(
                "output_validation",
                &[N],
                &[output_shape.len()],
                &format!(
                    "Model '{}' expected a {}D output tensor, got shape {:?}",
                    self.model_name, N, output_shape
                ),
            ));
        }
        let mut dims = [0usize; N];
        for (dst, &src) in dims.iter_mut().zip(output_shape) {
            *dst = src as usize;
        }
        let expected_len: usize = dims.iter().product();
        if output_len != expected_len {
            return Err(InchiError::invalid_input(format!(
                "Output data size mismatch for model '{}': expected {}, got {}",
                self.model_name, expected_len, output_len
            )));
        }
        Ok(dims)
    }

    pub(super) fn run_4d(&self, x: &Tensor4D) -> Result<Tensor4D, InchiError> {
        self.run_inference_with_processor(x, |output_shape, output_data| {
            let dims = self.output_dims::<4>(output_shape, output_data.len())?;
            let view = ArrayView4::from_shape(dims, output_data)?;
            Ok(view.to_owned())
        })
    }

    pub(super) fn run_3d(&self, x: &Tensor4D) -> Result<Tensor3D, InchiError> {
        self.run_inference_with_processor(x, |output_shape, output_data| {
            let dims = self.output_dims::<3>(output_shape, output_data.len())?;
            let view = ArrayView3::from_shape(dims, output_data)?;
            Ok(view.to_owned())
        })
    }
}
