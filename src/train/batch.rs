//! Training batch

use ndarray::Array1;

/// One mini-batch of inputs and targets
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub inputs: Array1<f32>,
    pub targets: Array1<f32>,
}

impl Batch {
    pub fn new(inputs: Array1<f32>, targets: Array1<f32>) -> Self {
        Self { inputs, targets }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}
