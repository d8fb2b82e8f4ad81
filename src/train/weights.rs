//! Weight snapshot and restore

use crate::error::{Error, Result};
use crate::Tensor;
use ndarray::Array1;

/// Owned copy of every model parameter, in parameter order
pub type Weights = Vec<Array1<f32>>;

/// Read and overwrite the live model parameters
///
/// Callbacks that snapshot or restore weights receive a `&mut dyn WeightStore`
/// from the trainer.
pub trait WeightStore {
    /// Copy the current parameters
    fn get_weights(&self) -> Weights;

    /// Replace the current parameters
    ///
    /// The snapshot must match the model's parameter count and shapes.
    fn set_weights(&mut self, weights: &[Array1<f32>]) -> Result<()>;
}

impl WeightStore for Vec<Tensor> {
    fn get_weights(&self) -> Weights {
        self.iter().map(|t| t.data().clone()).collect()
    }

    fn set_weights(&mut self, weights: &[Array1<f32>]) -> Result<()> {
        if weights.len() != self.len() {
            return Err(Error::ShapeMismatch {
                expected: vec![self.len()],
                got: vec![weights.len()],
            });
        }

        for (param, w) in self.iter().zip(weights) {
            if param.len() != w.len() {
                return Err(Error::ShapeMismatch {
                    expected: vec![param.len()],
                    got: vec![w.len()],
                });
            }
        }

        for (param, w) in self.iter_mut().zip(weights) {
            param.data_mut().assign(w);
        }
        Ok(())
    }
}
