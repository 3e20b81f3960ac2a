//! Conversion of examples into candle tensors.
use crate::Example;
use anyhow::Result;
use candle_core::{Device, Tensor};
use ndarray::{Array, Dimension};

/// Converts an array into [`Tensor`] of the same shape.
pub fn array_to_tensor<D: Dimension>(arr: &Array<f32, D>, device: &Device) -> Result<Tensor> {
    let v = arr.iter().copied().collect::<Vec<_>>();
    let t = Tensor::from_vec(v, arr.shape(), device)?;
    Ok(t)
}

impl Example {
    /// Returns `(image, proprioception, action_sequence)` as tensors.
    pub fn to_tensors(&self, device: &Device) -> Result<(Tensor, Tensor, Tensor)> {
        Ok((
            array_to_tensor(&self.image, device)?,
            array_to_tensor(&self.proprioception, device)?,
            array_to_tensor(&self.action_sequence, device)?,
        ))
    }
}
