//! Callback system for training events
//!
//! Provides extensible hooks for training loop events:
//! - `on_train_begin` / `on_train_end`
//! - `on_epoch_begin` / `on_epoch_end`
//! - `on_step_begin` / `on_step_end`
//!
//! Epoch-end and train-end hooks also receive the live model as a
//! [`WeightStore`] so callbacks can snapshot and restore weights, and they
//! return `Result` so failures abort the run.
//!
//! # Example
//!
//! ```rust
//! use swats::train::{CallbackAction, CallbackContext, TrainerCallback, WeightStore};
//!
//! struct PrintCallback;
//!
//! impl TrainerCallback for PrintCallback {
//!     fn on_epoch_end(
//!         &mut self,
//!         ctx: &CallbackContext,
//!         _model: &mut dyn WeightStore,
//!     ) -> swats::Result<CallbackAction> {
//!         println!("Epoch {} finished with loss {:.4}", ctx.epoch, ctx.loss);
//!         Ok(CallbackAction::Continue)
//!     }
//! }
//! ```

use super::weights::WeightStore;
use crate::error::Result;
use std::collections::HashMap;

/// Context passed to callbacks with current training state
#[derive(Clone, Debug)]
pub struct CallbackContext {
    /// Current epoch (0-indexed)
    pub epoch: usize,
    /// Total epochs planned
    pub max_epochs: usize,
    /// Current step within epoch
    pub step: usize,
    /// Total steps in epoch
    pub steps_per_epoch: usize,
    /// Global step count
    pub global_step: usize,
    /// Current loss value
    pub loss: f32,
    /// Current learning rate
    pub lr: f32,
    /// Optimizer second-moment decay (None for non-adaptive optimizers)
    pub beta2: Option<f32>,
    /// Best loss seen so far
    pub best_loss: Option<f32>,
    /// Validation loss (if available)
    pub val_loss: Option<f32>,
    /// Additional named epoch metrics
    pub metrics: HashMap<String, f32>,
    /// Training duration in seconds
    pub elapsed_secs: f64,
}

impl CallbackContext {
    /// Look up a metric by name
    ///
    /// `loss`, `val_loss` and `lr` resolve to the dedicated fields; anything
    /// else is read from `metrics`.
    pub fn metric(&self, name: &str) -> Option<f32> {
        match name {
            "loss" => Some(self.loss),
            "val_loss" => self.val_loss,
            "lr" => Some(self.lr),
            other => self.metrics.get(other).copied(),
        }
    }
}

impl Default for CallbackContext {
    fn default() -> Self {
        Self {
            epoch: 0,
            max_epochs: 0,
            step: 0,
            steps_per_epoch: 0,
            global_step: 0,
            loss: 0.0,
            lr: 0.0,
            beta2: None,
            best_loss: None,
            val_loss: None,
            metrics: HashMap::new(),
            elapsed_secs: 0.0,
        }
    }
}

/// Action to take after a callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Continue training normally
    Continue,
    /// Stop training (sets the trainer's halt flag)
    Stop,
    /// Skip rest of current epoch
    SkipEpoch,
}

/// Trait for training callbacks
///
/// Implement this trait to hook into training events. All methods have
/// default no-op implementations, so you only need to implement the
/// events you care about.
pub trait TrainerCallback: Send {
    /// Called before training starts
    fn on_train_begin(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after training ends
    fn on_train_end(&mut self, _ctx: &CallbackContext, _model: &mut dyn WeightStore) -> Result<()> {
        Ok(())
    }

    /// Called before each epoch
    fn on_epoch_begin(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after each epoch
    fn on_epoch_end(
        &mut self,
        _ctx: &CallbackContext,
        _model: &mut dyn WeightStore,
    ) -> Result<CallbackAction> {
        Ok(CallbackAction::Continue)
    }

    /// Called before each training step
    fn on_step_begin(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after each training step
    fn on_step_end(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Get callback name for logging
    fn name(&self) -> &str {
        "TrainerCallback"
    }
}

// =============================================================================
// Progress Callback
// =============================================================================

/// Progress callback for logging training progress
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    /// Log every N steps
    log_interval: usize,
}

impl ProgressCallback {
    /// Create progress callback
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
        }
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self { log_interval: 10 }
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_epoch_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        tracing::info!(
            "Epoch {}/{} starting (lr: {:.2e})",
            ctx.epoch + 1,
            ctx.max_epochs,
            ctx.lr
        );
        CallbackAction::Continue
    }

    fn on_epoch_end(
        &mut self,
        ctx: &CallbackContext,
        _model: &mut dyn WeightStore,
    ) -> Result<CallbackAction> {
        let val_str = ctx
            .val_loss
            .map(|v| format!(", val_loss: {:.4}", v))
            .unwrap_or_default();

        tracing::info!(
            "Epoch {}/{}: loss: {:.4}{} ({:.1}s)",
            ctx.epoch + 1,
            ctx.max_epochs,
            ctx.loss,
            val_str,
            ctx.elapsed_secs
        );
        Ok(CallbackAction::Continue)
    }

    fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        if ctx.step > 0 && ctx.step.is_multiple_of(self.log_interval) {
            tracing::debug!(
                "  Step {}/{}: loss: {:.4}",
                ctx.step,
                ctx.steps_per_epoch,
                ctx.loss
            );
        }
        CallbackAction::Continue
    }

    fn name(&self) -> &str {
        "ProgressCallback"
    }
}

// =============================================================================
// Callback Manager
// =============================================================================

/// Manages multiple callbacks and dispatches events in registration order
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    /// Create new callback manager
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Add a callback
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Get number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Names of registered callbacks
    pub fn names(&self) -> Vec<&str> {
        self.callbacks.iter().map(|cb| cb.name()).collect()
    }

    /// Fire train begin event
    pub fn on_train_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        for cb in &mut self.callbacks {
            if cb.on_train_begin(ctx) == CallbackAction::Stop {
                return CallbackAction::Stop;
            }
        }
        CallbackAction::Continue
    }

    /// Fire train end event on every callback
    pub fn on_train_end(&mut self, ctx: &CallbackContext, model: &mut dyn WeightStore) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_train_end(ctx, model)?;
        }
        Ok(())
    }

    /// Fire epoch begin event
    pub fn on_epoch_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        for cb in &mut self.callbacks {
            match cb.on_epoch_begin(ctx) {
                CallbackAction::Stop => return CallbackAction::Stop,
                CallbackAction::SkipEpoch => return CallbackAction::SkipEpoch,
                CallbackAction::Continue => {}
            }
        }
        CallbackAction::Continue
    }

    /// Fire epoch end event
    pub fn on_epoch_end(
        &mut self,
        ctx: &CallbackContext,
        model: &mut dyn WeightStore,
    ) -> Result<CallbackAction> {
        for cb in &mut self.callbacks {
            if cb.on_epoch_end(ctx, model)? == CallbackAction::Stop {
                tracing::debug!("{} requested stop at epoch {}", cb.name(), ctx.epoch);
                return Ok(CallbackAction::Stop);
            }
        }
        Ok(CallbackAction::Continue)
    }

    /// Fire step begin event
    pub fn on_step_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        for cb in &mut self.callbacks {
            if cb.on_step_begin(ctx) == CallbackAction::Stop {
                return CallbackAction::Stop;
            }
        }
        CallbackAction::Continue
    }

    /// Fire step end event
    pub fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        for cb in &mut self.callbacks {
            if cb.on_step_end(ctx) == CallbackAction::Stop {
                return CallbackAction::Stop;
            }
        }
        CallbackAction::Continue
    }
}

impl Default for CallbackManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;

    struct StopAt(usize);

    impl TrainerCallback for StopAt {
        fn on_epoch_end(
            &mut self,
            ctx: &CallbackContext,
            _model: &mut dyn WeightStore,
        ) -> Result<CallbackAction> {
            if ctx.epoch >= self.0 {
                Ok(CallbackAction::Stop)
            } else {
                Ok(CallbackAction::Continue)
            }
        }

        fn name(&self) -> &str {
            "StopAt"
        }
    }

    struct Failing;

    impl TrainerCallback for Failing {
        fn on_epoch_end(
            &mut self,
            _ctx: &CallbackContext,
            _model: &mut dyn WeightStore,
        ) -> Result<CallbackAction> {
            Err(crate::Error::NoWeightsSnapshot)
        }
    }

    #[test]
    fn test_callback_context_default() {
        let ctx = CallbackContext::default();
        assert_eq!(ctx.epoch, 0);
        assert_eq!(ctx.loss, 0.0);
        assert!(ctx.best_loss.is_none());
        assert!(ctx.beta2.is_none());
    }

    #[test]
    fn test_context_metric_lookup() {
        let mut ctx = CallbackContext {
            loss: 0.5,
            val_loss: Some(0.7),
            lr: 0.01,
            ..Default::default()
        };
        ctx.metrics.insert("accuracy".to_string(), 0.9);

        assert_eq!(ctx.metric("loss"), Some(0.5));
        assert_eq!(ctx.metric("val_loss"), Some(0.7));
        assert_eq!(ctx.metric("lr"), Some(0.01));
        assert_eq!(ctx.metric("accuracy"), Some(0.9));
        assert_eq!(ctx.metric("missing"), None);
    }

    #[test]
    fn test_callback_manager_dispatch() {
        let mut manager = CallbackManager::new();
        manager.add(StopAt(1));
        let mut model = vec![Tensor::zeros(1, true)];

        let mut ctx = CallbackContext::default();
        assert_eq!(
            manager.on_epoch_end(&ctx, &mut model).unwrap(),
            CallbackAction::Continue
        );

        ctx.epoch = 1;
        assert_eq!(
            manager.on_epoch_end(&ctx, &mut model).unwrap(),
            CallbackAction::Stop
        );
    }

    #[test]
    fn test_callback_manager_propagates_error() {
        let mut manager = CallbackManager::new();
        manager.add(Failing);
        manager.add(StopAt(0));
        let mut model = vec![Tensor::zeros(1, true)];

        let ctx = CallbackContext::default();
        assert!(manager.on_epoch_end(&ctx, &mut model).is_err());
    }

    #[test]
    fn test_progress_callback() {
        let mut progress = ProgressCallback::new(5);
        let mut model = vec![Tensor::zeros(1, true)];
        let ctx = CallbackContext {
            epoch: 0,
            max_epochs: 10,
            step: 5,
            steps_per_epoch: 100,
            loss: 0.5,
            lr: 0.001,
            ..Default::default()
        };

        assert_eq!(progress.on_epoch_begin(&ctx), CallbackAction::Continue);
        assert_eq!(progress.on_step_end(&ctx), CallbackAction::Continue);
        assert_eq!(
            progress.on_epoch_end(&ctx, &mut model).unwrap(),
            CallbackAction::Continue
        );
    }

    #[test]
    fn test_manager_names() {
        let mut manager = CallbackManager::new();
        manager.add(ProgressCallback::default());
        manager.add(StopAt(3));
        assert_eq!(manager.names(), vec!["ProgressCallback", "StopAt"]);
        assert_eq!(manager.len(), 2);
    }
}

// =============================================================================
// Property Tests
// =============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::Tensor;
    use proptest::prelude::*;

    proptest! {
        /// Progress callback should always continue
        #[test]
        fn progress_callback_never_stops(
            epoch in 0usize..100,
            step in 0usize..1000,
            loss in -100.0f32..100.0,
        ) {
            let mut progress = ProgressCallback::new(10);
            let mut model = vec![Tensor::zeros(1, true)];
            let ctx = CallbackContext {
                epoch,
                max_epochs: 100,
                step,
                steps_per_epoch: 100,
                loss,
                lr: 0.001,
                ..Default::default()
            };

            prop_assert_eq!(progress.on_train_begin(&ctx), CallbackAction::Continue);
            prop_assert_eq!(progress.on_epoch_begin(&ctx), CallbackAction::Continue);
            prop_assert_eq!(progress.on_step_begin(&ctx), CallbackAction::Continue);
            prop_assert_eq!(progress.on_step_end(&ctx), CallbackAction::Continue);
            prop_assert_eq!(progress.on_epoch_end(&ctx, &mut model).unwrap(), CallbackAction::Continue);
        }

        /// Multiple callbacks should all fire
        #[test]
        fn multiple_callbacks_fire(
            num_callbacks in 1usize..5,
        ) {
            use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};

            struct CounterCallback {
                counter: Arc<AtomicUsize>,
            }

            impl TrainerCallback for CounterCallback {
                fn on_train_end(&mut self, _: &CallbackContext, _: &mut dyn WeightStore) -> Result<()> {
                    self.counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
                fn name(&self) -> &str { "CounterCallback" }
            }

            let counter = Arc::new(AtomicUsize::new(0));
            let mut manager = CallbackManager::new();
            let mut model = vec![Tensor::zeros(1, true)];

            for _ in 0..num_callbacks {
                manager.add(CounterCallback { counter: counter.clone() });
            }

            let ctx = CallbackContext::default();
            manager.on_train_end(&ctx, &mut model).unwrap();

            prop_assert_eq!(counter.load(Ordering::SeqCst), num_callbacks);
        }
    }
}
