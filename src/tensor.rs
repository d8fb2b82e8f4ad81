//! Parameter tensor with gradient storage

use ndarray::Array1;

/// Flat parameter vector with an optional gradient
///
/// Gradients are written by the caller's step closure and consumed by the
/// optimizer; there is no computation graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    data: Array1<f32>,
    grad: Option<Array1<f32>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a new tensor with data
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        Self {
            data,
            grad: None,
            requires_grad,
        }
    }

    /// Create a tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a tensor filled with zeros
    pub fn zeros(size: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(size), requires_grad)
    }

    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Get gradient (if set)
    pub fn grad(&self) -> Option<&Array1<f32>> {
        self.grad.as_ref()
    }

    /// Set gradient, ignored for tensors that do not require one
    pub fn set_grad(&mut self, grad: Array1<f32>) {
        if self.requires_grad {
            self.grad = Some(grad);
        }
    }

    /// Accumulate gradient (for when tensor is used multiple times)
    pub fn accumulate_grad(&mut self, grad: Array1<f32>) {
        if !self.requires_grad {
            return;
        }
        match self.grad.as_mut() {
            Some(existing) => *existing += &grad,
            None => self.grad = Some(grad),
        }
    }

    pub fn zero_grad(&mut self) {
        self.grad = None;
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
