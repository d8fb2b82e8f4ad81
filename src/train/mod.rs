//! High-level training loop
//!
//! This module provides:
//! - Trainer abstraction with callback hooks and a halt flag
//! - Weight snapshot/restore through [`WeightStore`]
//! - Early stopping and the Adam-to-SGD switching callback
//! - Loss functions, training configuration and metrics tracking
//!
//! # Example
//!
//! ```no_run
//! use swats::optim::Adam;
//! use swats::train::{AdamToSgd, EarlyStoppingConfig, TrainConfig, Trainer};
//! use swats::Tensor;
//!
//! let params = vec![Tensor::zeros(10, true)];
//! let optimizer = Adam::new(0.001, 0.9, 0.999, 1e-8);
//!
//! let mut trainer = Trainer::new(params, Box::new(optimizer), TrainConfig::default());
//! trainer.add_callback(AdamToSgd::new(EarlyStoppingConfig::new(), || Ok(())));
//!
//! // let result = trainer.train(10, || batches.clone(), step_fn)?;
//! ```

mod adam_to_sgd;
mod batch;
pub mod callback;
mod config;
mod early_stopping;
mod loss;
mod trainer;
mod weights;

pub use adam_to_sgd::{
    bias_corrected_rate, is_stable, AdamToSgd, RetrainFn, SwitchHandle, SwitchPoint, SwitchState,
    STABILITY_TOLERANCE,
};
pub use batch::Batch;
pub use callback::{
    CallbackAction, CallbackContext, CallbackManager, ProgressCallback, TrainerCallback,
};
pub use config::{MetricsTracker, TrainConfig};
pub use early_stopping::{EarlyStopping, EarlyStoppingConfig, MonitorMode};
pub use loss::{LossFn, LossOutput, MSELoss};
pub use trainer::{TrainResult, Trainer, ValidationFn};
pub use weights::{WeightStore, Weights};
