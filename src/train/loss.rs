//! Loss functions for training
//!
//! Losses return both the scalar value and the gradient with respect to the
//! predictions, so a step closure can chain it into parameter gradients.

use ndarray::Array1;

/// Scalar loss and its gradient with respect to the predictions
#[derive(Clone, Debug)]
pub struct LossOutput {
    pub value: f32,
    pub grad: Array1<f32>,
}

/// Trait for loss functions
pub trait LossFn {
    /// Compute loss given predictions and targets
    fn forward(&self, predictions: &Array1<f32>, targets: &Array1<f32>) -> LossOutput;

    /// Name of the loss function
    fn name(&self) -> &str;
}

/// Mean Squared Error Loss
///
/// L = mean((predictions - targets)²)
///
/// # Example
///
/// ```
/// use swats::train::{LossFn, MSELoss};
/// use ndarray::arr1;
///
/// let out = MSELoss.forward(&arr1(&[1.0, 2.0, 3.0]), &arr1(&[1.5, 2.5, 3.5]));
/// assert!(out.value > 0.0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct MSELoss;

impl LossFn for MSELoss {
    fn forward(&self, predictions: &Array1<f32>, targets: &Array1<f32>) -> LossOutput {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        let diff = predictions - targets;
        let value = diff.mapv(|d| d * d).mean().unwrap_or(0.0);

        // d(MSE)/d(pred) = 2 * (pred - target) / n
        let n = predictions.len().max(1) as f32;
        let grad = diff * (2.0 / n);

        LossOutput { value, grad }
    }

    fn name(&self) -> &str {
        "MSE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    #[test]
    fn test_mse_loss_basic() {
        let out = MSELoss.forward(&arr1(&[1.0, 2.0, 3.0]), &arr1(&[1.5, 2.5, 3.5]));

        // MSE = mean((0.5, 0.5, 0.5)^2) = 0.25
        assert_relative_eq!(out.value, 0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_mse_loss_zero_for_perfect() {
        let out = MSELoss.forward(&arr1(&[1.0, 2.0, 3.0]), &arr1(&[1.0, 2.0, 3.0]));

        assert_relative_eq!(out.value, 0.0, epsilon = 1e-5);
        assert!(out.grad.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_mse_gradient() {
        let out = MSELoss.forward(&arr1(&[1.0, 2.0, 3.0]), &arr1(&[0.0, 0.0, 0.0]));

        assert_relative_eq!(out.grad[0], 2.0 / 3.0, epsilon = 1e-5);
        assert_relative_eq!(out.grad[1], 4.0 / 3.0, epsilon = 1e-5);
        assert_relative_eq!(out.grad[2], 6.0 / 3.0, epsilon = 1e-5);
    }

    #[test]
    #[should_panic(expected = "must have same length")]
    fn test_mse_mismatched_lengths() {
        MSELoss.forward(&arr1(&[1.0, 2.0]), &arr1(&[1.0, 2.0, 3.0]));
    }
}
