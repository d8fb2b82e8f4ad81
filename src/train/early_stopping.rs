//! Early stopping with optional best-weights restore
//!
//! Monitors a named metric and halts training once it stops improving for
//! `patience` epochs. This is also the base that [`AdamToSgd`] composes for
//! its configuration, stop epoch and weight snapshot.
//!
//! [`AdamToSgd`]: super::AdamToSgd

use super::callback::{CallbackAction, CallbackContext, TrainerCallback};
use super::weights::{WeightStore, Weights};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Direction in which the monitored metric improves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorMode {
    /// Inferred from the metric name (`acc`/`auc` maximize, everything else minimizes)
    #[default]
    Auto,
    /// Lower is better
    Min,
    /// Higher is better
    Max,
}

impl MonitorMode {
    /// Resolve `Auto` against a metric name
    pub fn resolve(self, monitor: &str) -> MonitorMode {
        match self {
            MonitorMode::Auto => {
                if monitor.contains("acc") || monitor.contains("auc") {
                    MonitorMode::Max
                } else {
                    MonitorMode::Min
                }
            }
            other => other,
        }
    }
}

/// Options accepted by [`EarlyStopping`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarlyStoppingConfig {
    /// Metric to monitor (`loss`, `val_loss`, or a key of `CallbackContext::metrics`)
    pub monitor: String,
    /// Minimum change that counts as an improvement
    pub min_delta: f32,
    /// Epochs without improvement before stopping
    pub patience: usize,
    /// 0 = silent, >0 = log stop and restore events
    pub verbose: u8,
    /// Improvement direction
    pub mode: MonitorMode,
    /// Value the metric must beat before patience resets
    pub baseline: Option<f32>,
    /// Restore the best snapshot when stopping
    pub restore_best_weights: bool,
    /// Epochs to ignore before monitoring starts
    pub start_from_epoch: usize,
}

impl Default for EarlyStoppingConfig {
    fn default() -> Self {
        Self {
            monitor: "loss".to_string(),
            min_delta: 0.0,
            patience: 0,
            verbose: 0,
            mode: MonitorMode::Auto,
            baseline: None,
            restore_best_weights: false,
            start_from_epoch: 0,
        }
    }
}

impl EarlyStoppingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_monitor(mut self, monitor: impl Into<String>) -> Self {
        self.monitor = monitor.into();
        self
    }

    /// Negative values are taken as their magnitude
    pub fn with_min_delta(mut self, min_delta: f32) -> Self {
        self.min_delta = min_delta.abs();
        self
    }

    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_mode(mut self, mode: MonitorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_baseline(mut self, baseline: f32) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn with_restore_best_weights(mut self, restore: bool) -> Self {
        self.restore_best_weights = restore;
        self
    }

    pub fn with_start_from_epoch(mut self, epoch: usize) -> Self {
        self.start_from_epoch = epoch;
        self
    }
}

/// Early stopping callback to halt training when a metric plateaus
///
/// # Example
///
/// ```rust
/// use swats::train::EarlyStopping;
///
/// // Stop if no improvement for 5 epochs, min improvement 0.001
/// let early_stop = EarlyStopping::new(5, 0.001).with_restore_best();
/// ```
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    config: EarlyStoppingConfig,
    /// Resolved improvement direction
    mode: MonitorMode,
    /// Best metric value seen so far
    best: f32,
    /// Epoch at which `best` was recorded
    best_epoch: usize,
    /// Epochs without improvement
    wait: usize,
    /// Epoch at which training was halted (0 = not stopped)
    stopped_epoch: usize,
    /// Snapshot taken at the best epoch
    best_weights: Option<Weights>,
}

impl EarlyStopping {
    /// Create early stopping on training loss
    pub fn new(patience: usize, min_delta: f32) -> Self {
        Self::from_config(
            EarlyStoppingConfig::new()
                .with_patience(patience)
                .with_min_delta(min_delta),
        )
    }

    /// Create early stopping from the full option set
    pub fn from_config(config: EarlyStoppingConfig) -> Self {
        let mode = config.mode.resolve(&config.monitor);
        let mut es = Self {
            config,
            mode,
            best: 0.0,
            best_epoch: 0,
            wait: 0,
            stopped_epoch: 0,
            best_weights: None,
        };
        es.reset();
        es
    }

    /// Configure to restore best weights on stop
    pub fn with_restore_best(mut self) -> Self {
        self.config.restore_best_weights = true;
        self
    }

    /// Monitor validation loss instead of training loss
    pub fn monitor_validation(mut self) -> Self {
        self.config.monitor = "val_loss".to_string();
        self.mode = self.config.mode.resolve(&self.config.monitor);
        self.reset();
        self
    }

    /// Reset internal state for a new run
    pub fn reset(&mut self) {
        self.wait = 0;
        self.stopped_epoch = 0;
        self.best_epoch = 0;
        self.best_weights = None;
        self.best = match self.mode {
            MonitorMode::Max => f32::NEG_INFINITY,
            _ => f32::INFINITY,
        };
    }

    pub fn config(&self) -> &EarlyStoppingConfig {
        &self.config
    }

    pub fn stopped_epoch(&self) -> usize {
        self.stopped_epoch
    }

    pub fn best(&self) -> f32 {
        self.best
    }

    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    pub fn wait(&self) -> usize {
        self.wait
    }

    pub fn best_weights(&self) -> Option<&Weights> {
        self.best_weights.as_ref()
    }

    pub fn restore_best_weights(&self) -> bool {
        self.config.restore_best_weights
    }

    pub fn verbose(&self) -> u8 {
        self.config.verbose
    }

    /// Whether `current` beats `reference` by more than `min_delta`
    fn is_improvement(&self, current: f32, reference: f32) -> bool {
        match self.mode {
            MonitorMode::Max => current - self.config.min_delta > reference,
            _ => current + self.config.min_delta < reference,
        }
    }

    /// Overwrite the best-weights snapshot with the current model weights
    pub(crate) fn snapshot(&mut self, model: &dyn WeightStore) {
        self.best_weights = Some(model.get_weights());
    }

    pub(crate) fn mark_stopped(&mut self, epoch: usize) {
        self.stopped_epoch = epoch;
    }

    /// Reinstate the snapshot into the model
    pub(crate) fn restore(&self, model: &mut dyn WeightStore) -> Result<()> {
        let snapshot = self.best_weights.as_ref().ok_or(Error::NoWeightsSnapshot)?;
        model.set_weights(snapshot)
    }
}

impl TrainerCallback for EarlyStopping {
    fn on_train_begin(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        self.reset();
        CallbackAction::Continue
    }

    fn on_epoch_end(
        &mut self,
        ctx: &CallbackContext,
        model: &mut dyn WeightStore,
    ) -> Result<CallbackAction> {
        let Some(current) = ctx.metric(&self.config.monitor) else {
            tracing::warn!(
                "Early stopping conditioned on metric `{}` which is not available",
                self.config.monitor
            );
            return Ok(CallbackAction::Continue);
        };
        if ctx.epoch < self.config.start_from_epoch {
            return Ok(CallbackAction::Continue);
        }

        // Guarantees a snapshot exists even if the first epoch never improves
        if self.config.restore_best_weights && self.best_weights.is_none() {
            self.snapshot(model);
        }

        self.wait += 1;
        if self.is_improvement(current, self.best) {
            self.best = current;
            self.best_epoch = ctx.epoch;
            if self.config.restore_best_weights {
                self.snapshot(model);
            }
            let beats_baseline = self
                .config
                .baseline
                .is_none_or(|baseline| self.is_improvement(current, baseline));
            if beats_baseline {
                self.wait = 0;
            }
            return Ok(CallbackAction::Continue);
        }

        if self.wait >= self.config.patience && ctx.epoch > 0 {
            self.stopped_epoch = ctx.epoch;
            tracing::debug!(
                "Early stopping: no improvement for {} epochs (best {}: {:.4})",
                self.wait,
                self.config.monitor,
                self.best
            );
            if self.config.restore_best_weights {
                if self.config.verbose > 0 {
                    tracing::info!(
                        "Restoring model weights from the end of the best epoch: {}",
                        self.best_epoch + 1
                    );
                }
                self.restore(model)?;
            }
            return Ok(CallbackAction::Stop);
        }

        Ok(CallbackAction::Continue)
    }

    fn on_train_end(&mut self, _ctx: &CallbackContext, _model: &mut dyn WeightStore) -> Result<()> {
        if self.stopped_epoch > 0 && self.config.verbose > 0 {
            tracing::info!("Epoch {}: early stopping", self.stopped_epoch + 1);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "EarlyStopping"
    }
}
