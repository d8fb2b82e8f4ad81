//! Gradient clipping

use crate::Tensor;

/// Clip gradients by their global L2 norm
///
/// Scales every gradient by `max_norm / global_norm` when the global norm
/// exceeds `max_norm`. Returns the norm measured before clipping.
pub fn clip_grad_norm(params: &mut [Tensor], max_norm: f32) -> f32 {
    let total_norm_sq: f32 = params
        .iter()
        .filter_map(|p| p.grad())
        .map(|g| g.iter().map(|&x| x * x).sum::<f32>())
        .sum();

    let global_norm = total_norm_sq.sqrt();

    if global_norm > max_norm {
        let clip_coef = max_norm / global_norm;
        for param in params.iter_mut() {
            if let Some(grad) = param.grad() {
                let clipped = grad * clip_coef;
                param.set_grad(clipped);
            }
        }
    }

    global_norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_clip_scales_large_gradient() {
        let mut params = vec![Tensor::from_vec(vec![1.0], true)];
        params[0].set_grad(ndarray::arr1(&[100.0]));

        let global_norm = clip_grad_norm(&mut params, 1.0);

        assert_abs_diff_eq!(global_norm, 100.0, epsilon = 1e-6);
        assert_abs_diff_eq!(params[0].grad().unwrap()[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_leaves_small_gradient() {
        let mut params = vec![
            Tensor::from_vec(vec![0.0, 0.0], true),
            Tensor::from_vec(vec![0.0], true),
        ];
        params[0].set_grad(ndarray::arr1(&[0.3, 0.0]));
        params[1].set_grad(ndarray::arr1(&[0.4]));

        let global_norm = clip_grad_norm(&mut params, 1.0);

        assert_abs_diff_eq!(global_norm, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(params[1].grad().unwrap()[0], 0.4, epsilon = 1e-6);
    }
}
