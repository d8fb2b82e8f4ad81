//! Trainer abstraction for training loops

use super::callback::{CallbackAction, CallbackContext, CallbackManager, TrainerCallback};
use super::{Batch, MetricsTracker, TrainConfig};
use crate::error::Result;
use crate::optim::{clip_grad_norm, Optimizer};
use crate::Tensor;
use std::time::Instant;

/// Validation closure: computes a loss on held-out data
pub type ValidationFn = Box<dyn Fn(&[Tensor]) -> f32 + Send>;

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainResult {
    /// Epochs completed
    pub final_epoch: usize,
    /// Final training loss
    pub final_loss: f32,
    /// Best loss achieved
    pub best_loss: f32,
    /// Whether a callback halted training
    pub stopped_early: bool,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}

/// High-level trainer that orchestrates the training loop
///
/// Gradients come from a step closure: it receives the parameters and a
/// batch, writes each parameter's gradient with [`Tensor::set_grad`] and
/// returns the batch loss.
///
/// # Example
///
/// ```
/// use swats::optim::Adam;
/// use swats::train::{Batch, LossFn, MSELoss, TrainConfig, Trainer};
/// use swats::Tensor;
/// use ndarray::arr1;
///
/// let params = vec![Tensor::zeros(2, true)];
/// let mut trainer = Trainer::new(params, Box::new(Adam::default_params(0.05)), TrainConfig::default());
///
/// let batches = vec![Batch::new(arr1(&[1.0, 2.0]), arr1(&[2.0, 4.0]))];
/// let result = trainer
///     .train(3, || batches.clone(), |params, batch| {
///         let preds = params[0].data() * &batch.inputs;
///         let out = MSELoss.forward(&preds, &batch.targets);
///         params[0].set_grad(&out.grad * &batch.inputs);
///         out.value
///     })
///     .unwrap();
/// assert_eq!(result.final_epoch, 3);
/// ```
pub struct Trainer {
    /// Model parameters
    params: Vec<Tensor>,

    /// Optimizer
    optimizer: Box<dyn Optimizer>,

    /// Training configuration
    config: TrainConfig,

    /// Metrics tracker
    pub metrics: MetricsTracker,

    /// Callback manager
    callbacks: CallbackManager,

    /// Optional validation pass run after every epoch
    validation: Option<ValidationFn>,

    /// Halt flag, set when a callback returns `Stop`
    stop_training: bool,

    /// Best loss achieved during training
    best_loss: Option<f32>,

    /// Training start time
    start_time: Option<Instant>,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(params: Vec<Tensor>, optimizer: Box<dyn Optimizer>, config: TrainConfig) -> Self {
        Self {
            params,
            optimizer,
            config,
            metrics: MetricsTracker::new(),
            callbacks: CallbackManager::new(),
            validation: None,
            stop_training: false,
            best_loss: None,
            start_time: None,
        }
    }

    /// Add a callback to the trainer
    pub fn add_callback<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    /// Run `validation` after each epoch and report it as `val_loss`
    pub fn set_validation<V>(&mut self, validation: V)
    where
        V: Fn(&[Tensor]) -> f32 + Send + 'static,
    {
        self.validation = Some(Box::new(validation));
    }

    /// Get current learning rate
    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Set learning rate
    pub fn set_lr(&mut self, lr: f32) {
        self.optimizer.set_lr(lr);
    }

    pub fn optimizer(&self) -> &dyn Optimizer {
        self.optimizer.as_ref()
    }

    /// Whether the last run was halted by a callback
    pub fn stop_training(&self) -> bool {
        self.stop_training
    }

    /// Get reference to model parameters
    pub fn params(&self) -> &[Tensor] {
        &self.params
    }

    /// Get mutable reference to model parameters
    pub fn params_mut(&mut self) -> &mut [Tensor] {
        &mut self.params
    }

    /// Consume the trainer and hand back the parameters
    pub fn into_params(self) -> Vec<Tensor> {
        self.params
    }

    /// Get reference to callback manager
    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Build callback context from current state
    fn build_context(
        &self,
        epoch: usize,
        max_epochs: usize,
        step: usize,
        steps_per_epoch: usize,
        loss: f32,
        val_loss: Option<f32>,
    ) -> CallbackContext {
        CallbackContext {
            epoch,
            max_epochs,
            step,
            steps_per_epoch,
            global_step: self.metrics.steps,
            loss,
            lr: self.optimizer.lr(),
            beta2: self.optimizer.beta2(),
            best_loss: self.best_loss,
            val_loss,
            elapsed_secs: self.elapsed_secs(),
            ..Default::default()
        }
    }

    /// Perform a single training step
    ///
    /// Clears gradients, runs `step_fn`, clips and applies the optimizer.
    /// Returns the batch loss reported by `step_fn`.
    pub fn train_step<F>(&mut self, batch: &Batch, step_fn: F) -> f32
    where
        F: FnOnce(&mut [Tensor], &Batch) -> f32,
    {
        self.optimizer.zero_grad(&mut self.params);

        let loss = step_fn(&mut self.params, batch);

        if let Some(max_norm) = self.config.max_grad_norm {
            clip_grad_norm(&mut self.params, max_norm);
        }

        self.optimizer.step(&mut self.params);
        self.metrics.increment_step();

        loss
    }

    /// Train for multiple epochs with full callback support
    ///
    /// # Arguments
    ///
    /// * `max_epochs` - Maximum number of epochs to train
    /// * `batch_fn` - Function that returns batches for each epoch
    /// * `step_fn` - Closure that writes gradients and returns the batch loss
    ///
    /// # Errors
    ///
    /// Any error raised by an epoch-end or train-end callback aborts the run.
    pub fn train<F, B, I>(
        &mut self,
        max_epochs: usize,
        mut batch_fn: B,
        mut step_fn: F,
    ) -> Result<TrainResult>
    where
        F: FnMut(&mut [Tensor], &Batch) -> f32,
        B: FnMut() -> I,
        I: IntoIterator<Item = Batch>,
    {
        self.start_time = Some(Instant::now());
        self.best_loss = None;
        self.stop_training = false;
        let mut final_loss = 0.0;

        tracing::info!(
            "Training with {} for up to {} epochs (lr: {:.2e})",
            self.optimizer.name(),
            max_epochs,
            self.lr()
        );

        let ctx = self.build_context(0, max_epochs, 0, 0, 0.0, None);
        if self.callbacks.on_train_begin(&ctx) == CallbackAction::Stop {
            self.stop_training = true;
        }

        for epoch in 0..max_epochs {
            if self.stop_training {
                break;
            }

            let ctx = self.build_context(epoch, max_epochs, 0, 0, final_loss, None);
            match self.callbacks.on_epoch_begin(&ctx) {
                CallbackAction::Stop => {
                    self.stop_training = true;
                    break;
                }
                CallbackAction::SkipEpoch => continue,
                CallbackAction::Continue => {}
            }

            let batches: Vec<Batch> = batch_fn().into_iter().collect();
            let steps_per_epoch = batches.len();

            let mut total_loss = 0.0;
            let mut num_batches = 0;

            for (step, batch) in batches.iter().enumerate() {
                let ctx =
                    self.build_context(epoch, max_epochs, step, steps_per_epoch, final_loss, None);
                if self.callbacks.on_step_begin(&ctx) == CallbackAction::Stop {
                    self.stop_training = true;
                    break;
                }

                let loss = self.train_step(batch, &mut step_fn);
                total_loss += loss;
                num_batches += 1;

                if (step + 1) % self.config.log_interval.max(1) == 0 {
                    tracing::debug!(
                        "Epoch {}, Step {}: loss={:.4}, lr={:.6}",
                        epoch,
                        step + 1,
                        total_loss / num_batches as f32,
                        self.lr()
                    );
                }

                let ctx = self.build_context(epoch, max_epochs, step, steps_per_epoch, loss, None);
                if self.callbacks.on_step_end(&ctx) == CallbackAction::Stop {
                    self.stop_training = true;
                    break;
                }
            }

            if self.stop_training {
                break;
            }

            let avg_loss = if num_batches > 0 {
                total_loss / num_batches as f32
            } else {
                0.0
            };
            final_loss = avg_loss;

            if self.best_loss.is_none_or(|best| avg_loss < best) {
                self.best_loss = Some(avg_loss);
            }

            let val_loss = self.validation.as_ref().map(|v| v(&self.params));
            if let Some(v) = val_loss {
                self.metrics.record_val_loss(v);
            }
            self.metrics.record_epoch(avg_loss, self.lr());

            let ctx = self.build_context(
                epoch,
                max_epochs,
                steps_per_epoch,
                steps_per_epoch,
                avg_loss,
                val_loss,
            );
            if self.callbacks.on_epoch_end(&ctx, &mut self.params)? == CallbackAction::Stop {
                self.stop_training = true;
            }
        }

        let ctx = self.build_context(self.metrics.epoch, max_epochs, 0, 0, final_loss, None);
        self.callbacks.on_train_end(&ctx, &mut self.params)?;

        Ok(TrainResult {
            final_epoch: self.metrics.epoch,
            final_loss,
            best_loss: self.best_loss.unwrap_or(final_loss),
            stopped_early: self.stop_training,
            elapsed_secs: self.elapsed_secs(),
        })
    }
}
