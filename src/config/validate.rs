//! Configuration validation

use super::schema::SwatsSpec;

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid learning rate: {0} (must be > 0.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid beta1: {0} (must be in [0.0, 1.0))")]
    InvalidBeta1(f32),

    #[error("Invalid beta2: {0} (must be in [0.0, 1.0))")]
    InvalidBeta2(f32),

    #[error("Invalid epsilon: {0} (must be > 0.0)")]
    InvalidEpsilon(f32),

    #[error("Invalid momentum: {0} (must be in [0.0, 1.0))")]
    InvalidMomentum(f32),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid gradient clip value: {0} (must be > 0.0)")]
    InvalidGradClip(f32),

    #[error("Invalid min_delta: {0} (must be >= 0.0)")]
    InvalidMinDelta(f32),

    #[error("Monitored metric name is empty")]
    EmptyMonitor,
}

fn in_unit_interval(x: f32) -> bool {
    (0.0..1.0).contains(&x)
}

// NaN fails both checks below
fn positive(x: f32) -> bool {
    x > 0.0
}

fn non_negative(x: f32) -> bool {
    x >= 0.0
}

/// Validate a SWATS specification
///
/// Checks numeric ranges; `beta2 = 1` is rejected because the
/// bias-corrected rate `lr / (1 - beta2)` is undefined there.
pub fn validate_config(spec: &SwatsSpec) -> Result<(), ValidationError> {
    let adam = &spec.optimizer;
    if !positive(adam.lr) {
        return Err(ValidationError::InvalidLearningRate(adam.lr));
    }
    if !in_unit_interval(adam.beta1) {
        return Err(ValidationError::InvalidBeta1(adam.beta1));
    }
    if !in_unit_interval(adam.beta2) {
        return Err(ValidationError::InvalidBeta2(adam.beta2));
    }
    if !positive(adam.epsilon) {
        return Err(ValidationError::InvalidEpsilon(adam.epsilon));
    }

    if !in_unit_interval(spec.sgd.momentum) {
        return Err(ValidationError::InvalidMomentum(spec.sgd.momentum));
    }

    let training = &spec.training;
    if training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(training.epochs));
    }
    if training.sgd_epochs == 0 {
        return Err(ValidationError::InvalidEpochs(training.sgd_epochs));
    }
    if let Some(clip) = training.grad_clip {
        if !positive(clip) {
            return Err(ValidationError::InvalidGradClip(clip));
        }
    }

    let es = &spec.early_stopping;
    if !non_negative(es.min_delta) {
        return Err(ValidationError::InvalidMinDelta(es.min_delta));
    }
    if es.monitor.trim().is_empty() {
        return Err(ValidationError::EmptyMonitor);
    }

    Ok(())
}
