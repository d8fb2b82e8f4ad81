//! Integration tests for the Adam-to-SGD switch through the public API

use ndarray::arr1;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use swats::optim::Adam;
use swats::train::{
    AdamToSgd, Batch, CallbackAction, CallbackContext, EarlyStoppingConfig, LossFn, MSELoss,
    SwitchState, TrainConfig, Trainer, TrainerCallback, WeightStore,
};
use swats::Tensor;

fn linear_step(params: &mut [Tensor], batch: &Batch) -> f32 {
    let preds = params[0].data() * &batch.inputs;
    let out = MSELoss.forward(&preds, &batch.targets);
    params[0].set_grad(&out.grad * &batch.inputs);
    out.value
}

fn data() -> Vec<Batch> {
    vec![Batch::new(arr1(&[1.0, 2.0, 3.0]), arr1(&[2.0, 4.0, 6.0]))]
}

fn counting_callback(config: EarlyStoppingConfig) -> (AdamToSgd, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let cb = AdamToSgd::new(config, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (cb, calls)
}

#[test]
fn test_scenario_default_adam_halts_on_first_epoch() {
    let (cb, calls) = counting_callback(EarlyStoppingConfig::new());
    let handle = cb.switch_handle();

    let mut trainer = Trainer::new(
        vec![Tensor::zeros(3, true)],
        Box::new(Adam::new(0.001, 0.9, 0.999, 1e-8)),
        TrainConfig::default(),
    );
    trainer.add_callback(cb);

    let batches = data();
    let result = trainer.train(25, || batches.clone(), linear_step).unwrap();

    assert!(result.stopped_early);
    assert!(trainer.stop_training());
    assert_eq!(result.final_epoch, 1);

    let point = handle.get().expect("switch should have fired");
    assert_eq!(point.epoch, 0);
    assert!((point.bias_corrected_rate - 1.0).abs() < 1e-4);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scenario_zero_beta2_never_halts() {
    let (cb, calls) = counting_callback(EarlyStoppingConfig::new());
    let handle = cb.switch_handle();

    let mut trainer = Trainer::new(
        vec![Tensor::zeros(3, true)],
        Box::new(Adam::new(0.01, 0.9, 0.0, 1e-8)),
        TrainConfig::default(),
    );
    trainer.add_callback(cb);

    let batches = data();
    let result = trainer.train(8, || batches.clone(), linear_step).unwrap();

    assert!(!result.stopped_early);
    assert_eq!(result.final_epoch, 8);
    assert!(handle.get().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_restore_matches_last_snapshot_on_switch() {
    let config = EarlyStoppingConfig::new().with_restore_best_weights(true);
    let mut cb = AdamToSgd::new(config, || Ok(()));
    let mut model = vec![Tensor::from_vec(vec![0.5, 0.5], true)];

    let stable = CallbackContext {
        lr: 0.01,
        beta2: Some(0.0),
        ..Default::default()
    };
    for epoch in 0..3 {
        model[0].data_mut()[0] += 1.0;
        let ctx = CallbackContext {
            epoch,
            ..stable.clone()
        };
        assert_eq!(
            cb.on_epoch_end(&ctx, &mut model).unwrap(),
            CallbackAction::Continue
        );
    }
    let snapshot = model.get_weights();
    assert_eq!(cb.best_weights(), Some(&snapshot));

    model[0].data_mut()[1] = -100.0;
    let unstable = CallbackContext {
        epoch: 3,
        lr: 0.01,
        beta2: Some(0.999),
        ..Default::default()
    };
    assert_eq!(
        cb.on_epoch_end(&unstable, &mut model).unwrap(),
        CallbackAction::Stop
    );
    assert_eq!(cb.state(), SwitchState::Switched);
    assert_eq!(cb.stopped_epoch(), 3);
    assert_eq!(model.get_weights(), snapshot);
}

#[test]
fn test_retrain_runs_once_per_run_across_runs() {
    let (cb, calls) = counting_callback(EarlyStoppingConfig::new());
    let mut trainer = Trainer::new(
        vec![Tensor::zeros(3, true)],
        Box::new(Adam::new(0.01, 0.9, 0.0, 1e-8)),
        TrainConfig::default(),
    );
    trainer.add_callback(cb);

    let batches = data();
    trainer.train(3, || batches.clone(), linear_step).unwrap();
    trainer.train(5, || batches.clone(), linear_step).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

proptest! {
    /// Repeated stable epochs never leave the monitoring state
    #[test]
    fn prop_stable_scalars_are_idempotent(
        lr in 1e-6f32..0.5,
        epochs in 1usize..50,
    ) {
        let mut cb = AdamToSgd::new(EarlyStoppingConfig::new(), || Ok(()));
        let mut model = vec![Tensor::zeros(4, true)];
        let mut ctx = CallbackContext { lr, beta2: Some(0.0), ..Default::default() };

        for epoch in 0..epochs {
            ctx.epoch = epoch;
            prop_assert_eq!(cb.on_epoch_end(&ctx, &mut model).unwrap(), CallbackAction::Continue);
            prop_assert_eq!(cb.state(), SwitchState::Monitoring);
        }
    }
}
