//! Adam-to-SGD switching callback
//!
//! Watches Adam's bias-corrected learning-rate estimate once per epoch
//! (Keskar & Socher, arXiv:1712.07628, eq. 4). While the estimate matches the
//! raw learning rate the model weights are snapshotted; once it departs, the
//! callback records the switch point, optionally restores the snapshot and
//! halts the Adam phase. At the end of training it hands control to a
//! caller-supplied re-training procedure, which is expected to continue
//! with SGD.
//!
//! # Example
//!
//! ```rust
//! use swats::train::{AdamToSgd, EarlyStoppingConfig};
//!
//! let config = EarlyStoppingConfig::new().with_restore_best_weights(false);
//! let callback = AdamToSgd::new(config, || {
//!     // rebuild the optimizer as SGD and resume training here
//!     Ok(())
//! });
//! let handle = callback.switch_handle();
//! assert!(handle.get().is_none());
//! ```

use super::callback::{CallbackAction, CallbackContext, TrainerCallback};
use super::early_stopping::{EarlyStopping, EarlyStoppingConfig};
use super::weights::{WeightStore, Weights};
use crate::error::{Error, Result};
use std::sync::{Arc, Mutex};

/// Default tolerance on `|lr / (1 - beta2) - lr|`
pub const STABILITY_TOLERANCE: f64 = 1e-9;

/// Procedure run once at end of training, with its inputs pre-bound
pub type RetrainFn = Box<dyn FnMut() -> Result<()> + Send>;

/// `lr / (1 - beta2)`, computed in f64
pub fn bias_corrected_rate(lr: f32, beta2: f32) -> f64 {
    f64::from(lr) / (1.0 - f64::from(beta2))
}

/// Whether the bias-corrected rate is within `tolerance` of `lr`
pub fn is_stable(lr: f32, beta2: f32, tolerance: f64) -> bool {
    (bias_corrected_rate(lr, beta2) - f64::from(lr)).abs() < tolerance
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchState {
    /// Still training with Adam
    Monitoring,
    /// Condition fired; terminal for the current run
    Switched,
}

/// Optimizer scalars observed when the switch fired
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchPoint {
    pub epoch: usize,
    /// Learning rate to carry into SGD
    pub lr: f32,
    pub beta2: f32,
    pub bias_corrected_rate: f64,
}

/// Shared view of the switch point
///
/// Clone it into the re-training procedure to read the learning rate that
/// triggered the switch.
#[derive(Clone, Debug, Default)]
pub struct SwitchHandle(Arc<Mutex<Option<SwitchPoint>>>);

impl SwitchHandle {
    pub fn get(&self) -> Option<SwitchPoint> {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set(&self, point: Option<SwitchPoint>) {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = point;
    }
}

/// Early-stopping callback that ends the Adam phase and triggers re-training
pub struct AdamToSgd {
    base: EarlyStopping,
    tolerance: f64,
    state: SwitchState,
    switch: SwitchHandle,
    retrain: RetrainFn,
    retrain_calls: usize,
}

impl AdamToSgd {
    /// Create the callback
    ///
    /// `config` is the early-stopping option set, used as-is for verbosity,
    /// best-weights restore and stop bookkeeping.
    pub fn new<F>(config: EarlyStoppingConfig, retrain: F) -> Self
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        Self {
            base: EarlyStopping::from_config(config),
            tolerance: STABILITY_TOLERANCE,
            state: SwitchState::Monitoring,
            switch: SwitchHandle::default(),
            retrain: Box::new(retrain),
            retrain_calls: 0,
        }
    }

    /// Override the stability tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    pub fn stopped_epoch(&self) -> usize {
        self.base.stopped_epoch()
    }

    pub fn switch_point(&self) -> Option<SwitchPoint> {
        self.switch.get()
    }

    pub fn switch_handle(&self) -> SwitchHandle {
        self.switch.clone()
    }

    pub fn best_weights(&self) -> Option<&Weights> {
        self.base.best_weights()
    }

    /// Re-training invocations in the current run
    pub fn retrain_calls(&self) -> usize {
        self.retrain_calls
    }

    pub fn config(&self) -> &EarlyStoppingConfig {
        self.base.config()
    }
}

impl std::fmt::Debug for AdamToSgd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdamToSgd")
            .field("base", &self.base)
            .field("tolerance", &self.tolerance)
            .field("state", &self.state)
            .field("switch", &self.switch.get())
            .field("retrain_calls", &self.retrain_calls)
            .finish()
    }
}

impl TrainerCallback for AdamToSgd {
    fn on_train_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.base.on_train_begin(ctx);
        self.state = SwitchState::Monitoring;
        self.switch.set(None);
        self.retrain_calls = 0;
        CallbackAction::Continue
    }

    fn on_epoch_end(
        &mut self,
        ctx: &CallbackContext,
        model: &mut dyn WeightStore,
    ) -> Result<CallbackAction> {
        // One restore per run
        if self.state == SwitchState::Switched {
            return Ok(CallbackAction::Stop);
        }

        let beta2 = ctx.beta2.ok_or(Error::MissingOptimizerState("beta2"))?;
        if is_stable(ctx.lr, beta2, self.tolerance) {
            self.base.snapshot(model);
            return Ok(CallbackAction::Continue);
        }

        let point = SwitchPoint {
            epoch: ctx.epoch,
            lr: ctx.lr,
            beta2,
            bias_corrected_rate: bias_corrected_rate(ctx.lr, beta2),
        };
        self.base.mark_stopped(ctx.epoch);
        self.state = SwitchState::Switched;
        self.switch.set(Some(point));
        tracing::info!(
            epoch = point.epoch,
            lr = point.lr,
            beta2 = point.beta2,
            bias_corrected_rate = point.bias_corrected_rate,
            "Adam step size condition met, stopping Adam phase"
        );

        if self.base.restore_best_weights() {
            if self.base.verbose() > 0 {
                tracing::info!("Restoring model weights from the end of the best epoch");
            }
            self.base.restore(model)?;
        }

        Ok(CallbackAction::Stop)
    }

    fn on_train_end(&mut self, ctx: &CallbackContext, model: &mut dyn WeightStore) -> Result<()> {
        self.base.on_train_end(ctx, model)?;
        self.retrain_calls += 1;
        (self.retrain)()
    }

    fn name(&self) -> &str {
        "AdamToSgd"
    }
}
