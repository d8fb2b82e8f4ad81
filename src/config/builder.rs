//! Build training components from configuration

use super::schema::{AdamSpec, SgdSpec, TrainingParams};
use crate::optim::{Adam, SGD};
use crate::train::TrainConfig;

/// Build the Adam phase optimizer
pub fn build_adam(spec: &AdamSpec) -> Adam {
    Adam::new(spec.lr, spec.beta1, spec.beta2, spec.epsilon)
}

/// Build the SGD phase optimizer at the hand-off learning rate
pub fn build_sgd(lr: f32, spec: &SgdSpec) -> SGD {
    SGD::new(lr, spec.momentum)
}

/// Build trainer configuration
pub fn build_train_config(params: &TrainingParams) -> TrainConfig {
    let config = TrainConfig::new().with_log_interval(params.log_interval);
    match params.grad_clip {
        Some(max_norm) => config.with_grad_clip(max_norm),
        None => config.without_grad_clip(),
    }
}
