//! Two-phase SWATS run: Adam until the switch fires, then SGD
//!
//! Phase one trains with Adam and an [`AdamToSgd`] callback. Its re-training
//! procedure only records that the hand-off was requested; the run itself
//! owns the parameters, so it rebuilds the optimizer as SGD and continues
//! once the Adam trainer returns them.

use crate::config::{build_adam, build_sgd, build_train_config, SwatsSpec};
use crate::error::Result;
use crate::train::{AdamToSgd, Batch, SwitchPoint, TrainResult, Trainer};
use crate::Tensor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of both phases
#[derive(Debug, Clone)]
pub struct SwatsReport {
    /// Adam phase result
    pub adam: TrainResult,
    /// Where the switch fired, if it did
    pub switch: Option<SwitchPoint>,
    /// Learning rate handed to SGD
    pub sgd_lr: f32,
    /// SGD phase result (None if the hand-off never ran)
    pub sgd: Option<TrainResult>,
}

impl SwatsReport {
    /// Total epochs across both phases
    pub fn total_epochs(&self) -> usize {
        self.adam.final_epoch + self.sgd.as_ref().map_or(0, |r| r.final_epoch)
    }
}

/// Run Adam, switch to SGD, and return the trained parameters
///
/// `batch_fn` supplies each epoch's batches and `step_fn` writes gradients
/// and returns the batch loss, for both phases.
///
/// # Example
///
/// ```
/// use swats::config::parse_config;
/// use swats::run_swats;
/// use swats::train::{Batch, LossFn, MSELoss};
/// use swats::Tensor;
/// use ndarray::arr1;
///
/// let spec = parse_config("optimizer:\n  lr: 0.05\ntraining:\n  sgd_epochs: 3\n")?;
/// let batches = vec![Batch::new(arr1(&[1.0, 2.0]), arr1(&[3.0, 6.0]))];
///
/// let (params, report) = run_swats(
///     &spec,
///     vec![Tensor::zeros(2, true)],
///     || batches.clone(),
///     |params, batch| {
///         let preds = params[0].data() * &batch.inputs;
///         let out = MSELoss.forward(&preds, &batch.targets);
///         params[0].set_grad(&out.grad * &batch.inputs);
///         out.value
///     },
/// )?;
/// assert_eq!(params.len(), 1);
/// assert!(report.switch.is_some());
/// # Ok::<(), swats::Error>(())
/// ```
pub fn run_swats<F, B, I>(
    spec: &SwatsSpec,
    params: Vec<Tensor>,
    mut batch_fn: B,
    mut step_fn: F,
) -> Result<(Vec<Tensor>, SwatsReport)>
where
    F: FnMut(&mut [Tensor], &Batch) -> f32,
    B: FnMut() -> I,
    I: IntoIterator<Item = Batch>,
{
    let handoff = Arc::new(AtomicBool::new(false));
    let requested = handoff.clone();

    let callback = AdamToSgd::new(spec.early_stopping.clone(), move || {
        requested.store(true, Ordering::SeqCst);
        Ok(())
    });
    let switch = callback.switch_handle();

    let mut adam_trainer = Trainer::new(
        params,
        Box::new(build_adam(&spec.optimizer)),
        build_train_config(&spec.training),
    );
    adam_trainer.add_callback(callback);

    let adam = adam_trainer.train(spec.training.epochs, &mut batch_fn, &mut step_fn)?;
    let final_adam_lr = adam_trainer.lr();
    let params = adam_trainer.into_params();

    let switch = switch.get();
    let sgd_lr = switch.map_or(final_adam_lr, |p| p.lr);

    if !handoff.load(Ordering::SeqCst) {
        return Ok((
            params,
            SwatsReport {
                adam,
                switch,
                sgd_lr,
                sgd: None,
            },
        ));
    }

    match &switch {
        Some(point) => tracing::info!(
            "Switching to SGD at epoch {} with lr {:.2e}",
            point.epoch + 1,
            sgd_lr
        ),
        None => tracing::info!(
            "Adam budget exhausted without switch, continuing with SGD at lr {:.2e}",
            sgd_lr
        ),
    }

    let mut sgd_trainer = Trainer::new(
        params,
        Box::new(build_sgd(sgd_lr, &spec.sgd)),
        build_train_config(&spec.training),
    );
    let sgd = sgd_trainer.train(spec.training.sgd_epochs, &mut batch_fn, &mut step_fn)?;

    Ok((
        sgd_trainer.into_params(),
        SwatsReport {
            adam,
            switch,
            sgd_lr,
            sgd: Some(sgd),
        },
    ))
}
