// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch-driven train + validation loop using Burn's DataLoader
// and Adam, steered by a pure TrainController state machine.
//
// Per epoch:
//   1. shuffle the train split and iterate mini-batches of 32
//   2. forward / cross-entropy / backward / Adam step, at the
//      controller's current learning rate
//   3. validation pass on model.valid() (dropout disabled)
//   4. hand val loss + accuracy to the controller, which decides:
//        - new best?   → snapshot + persist checkpoint
//        - LR plateau? → halve the learning rate (floor 1e-7)
//        - early stop? → restore the best snapshot and halt
//        - epoch cap?  → halt as Completed
//   5. append the epoch's metrics to the history log
//
// Key Burn 0.16 insight:
//   - Training uses TrainBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on ValidBackend (Wgpu)
//   - Validation batcher must also use ValidBackend
//   - argmax(1) returns [batch,1] so we flatten before .equal()
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::SequenceBatcher, dataset::SequenceDataset};
use crate::domain::sample::SequenceSpec;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{SequenceClassifier, SequenceClassifierConfig};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
pub type ValidBackend = burn::backend::Wgpu;

// ─── TrainController ──────────────────────────────────────────────────────────

/// Where the bounded epoch state machine currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainState {
    /// Training continues; holds the next epoch number.
    Running(usize),
    /// Validation loss stalled past the early-stop patience.
    EarlyStopped,
    /// The hard epoch cap was reached.
    Completed,
}

/// What the controller decided after seeing one epoch's
/// validation results.
#[derive(Debug, Clone, Copy)]
pub struct EpochDecision {
    /// Validation accuracy improved — snapshot the weights.
    pub new_best: bool,
    /// Learning rate for the next epoch.
    pub lr: f64,
    /// The rate was halved this epoch (plateau detected).
    pub lr_halved: bool,
    /// Leave the epoch loop (early stop or cap).
    pub stop: bool,
}

/// Pure, tensor-free adaptive control for the epoch loop.
///
/// Two independent plateau counters watch the validation loss:
/// one gates early stopping, the other learning-rate decay.
/// Best-snapshot tracking is keyed by validation ACCURACY, the
/// loss counters only measure staleness.
pub struct TrainController {
    max_epochs:          usize,
    early_stop_patience: usize,
    lr_patience:         usize,
    min_lr:              f64,
    lr:                  f64,
    epoch:               usize,
    best_val_loss:       f64,
    best_val_accuracy:   f64,
    stale_for_stop:      usize,
    stale_for_decay:     usize,
    state:               TrainState,
}

impl TrainController {
    pub fn new(
        max_epochs:          usize,
        early_stop_patience: usize,
        lr_patience:         usize,
        initial_lr:          f64,
        min_lr:              f64,
    ) -> Self {
        Self {
            max_epochs,
            early_stop_patience,
            lr_patience,
            min_lr,
            lr: initial_lr,
            epoch: 0,
            best_val_loss: f64::INFINITY,
            best_val_accuracy: f64::NEG_INFINITY,
            stale_for_stop: 0,
            stale_for_decay: 0,
            state: TrainState::Running(1),
        }
    }

    pub fn lr(&self) -> f64 {
        self.lr
    }

    pub fn state(&self) -> TrainState {
        self.state
    }

    pub fn epochs_run(&self) -> usize {
        self.epoch
    }

    /// Feed one epoch's validation results into the state machine.
    pub fn observe(&mut self, val_loss: f64, val_accuracy: f64) -> EpochDecision {
        self.epoch += 1;

        let new_best = val_accuracy > self.best_val_accuracy;
        if new_best {
            self.best_val_accuracy = val_accuracy;
        }

        if val_loss < self.best_val_loss {
            self.best_val_loss = val_loss;
            self.stale_for_stop = 0;
            self.stale_for_decay = 0;
        } else {
            self.stale_for_stop += 1;
            self.stale_for_decay += 1;
        }

        // LR decay: independent counter, resets after each halving
        let mut lr_halved = false;
        if self.stale_for_decay >= self.lr_patience {
            let halved = (self.lr * 0.5).max(self.min_lr);
            lr_halved = halved < self.lr;
            self.lr = halved;
            self.stale_for_decay = 0;
        }

        let stop = if self.stale_for_stop >= self.early_stop_patience {
            self.state = TrainState::EarlyStopped;
            true
        } else if self.epoch >= self.max_epochs {
            self.state = TrainState::Completed;
            true
        } else {
            self.state = TrainState::Running(self.epoch + 1);
            false
        };

        EpochDecision { new_best, lr: self.lr, lr_halved, stop }
    }
}

// ─── Training entry point ─────────────────────────────────────────────────────

/// Summary of a finished run, persisted into training_info.json.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub final_state:        TrainState,
    pub epochs_run:         usize,
    pub best_epoch:         usize,
    pub best_val_accuracy:  f64,
    pub final_val_loss:     f64,
    pub final_val_accuracy: f64,
}

pub fn run_training(
    cfg:           &TrainConfig,
    model_cfg:     &SequenceClassifierConfig,
    spec:          SequenceSpec,
    train_dataset: SequenceDataset,
    val_dataset:   SequenceDataset,
    ckpt_manager:  &CheckpointManager,
    history:       &MetricsLogger,
) -> Result<(SequenceClassifier<TrainBackend>, TrainOutcome)> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, model_cfg, spec, train_dataset, val_dataset, ckpt_manager, history, device)
}

#[allow(clippy::too_many_arguments)]
fn train_loop(
    cfg:           &TrainConfig,
    model_cfg:     &SequenceClassifierConfig,
    spec:          SequenceSpec,
    train_dataset: SequenceDataset,
    val_dataset:   SequenceDataset,
    ckpt_manager:  &CheckpointManager,
    history:       &MetricsLogger,
    device:        burn::backend::wgpu::WgpuDevice,
) -> Result<(SequenceClassifier<TrainBackend>, TrainOutcome)> {

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: SequenceClassifier<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: D={}, C={}, hidden {}→{}",
        model_cfg.feature_width, model_cfg.num_classes,
        model_cfg.rnn1_hidden, model_cfg.rnn2_hidden,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    let mut controller = TrainController::new(
        cfg.max_epochs,
        cfg.early_stop_patience,
        cfg.lr_patience,
        cfg.lr,
        cfg.min_lr,
    );

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = SequenceBatcher::<TrainBackend>::new(device.clone(), spec);
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = SequenceBatcher::<ValidBackend>::new(device.clone(), spec);
    let val_loader = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    // Best snapshot — updated only here, at epoch boundaries
    let mut best_model = model.clone();
    let mut best_epoch = 0usize;
    let mut last_val_loss = f64::NAN;
    let mut last_val_accuracy = 0.0f64;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.max_epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches = 0usize;
        let mut train_correct = 0usize;
        let mut train_total = 0usize;

        for batch in train_loader.iter() {
            let labels = batch.labels.clone();
            let (loss, logits) = model.forward_classification(batch.sequences, batch.labels);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            if !loss_val.is_finite() {
                // Non-finite loss is not auto-recovered; surface it loudly
                tracing::warn!("Non-finite training loss at epoch {} — check inputs/LR", epoch);
            }
            train_loss_sum += loss_val;
            train_batches += 1;
            train_total += labels.dims()[0];
            train_correct += count_correct(logits, labels);

            // Backward pass + Adam update at the controller's current rate
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(controller.lr(), model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };
        let train_accuracy = if train_total > 0 {
            train_correct as f64 / train_total as f64
        } else { 0.0 };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → SequenceClassifier<ValidBackend>
        // dropout disabled for deterministic evaluation
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches = 0usize;
        let mut val_correct = 0usize;
        let mut val_total = 0usize;

        for batch in val_loader.iter() {
            let logits = model_valid.forward(batch.sequences);

            let ce = burn::nn::loss::CrossEntropyLossConfig::new().init(&logits.device());
            let batch_loss: f64 = ce
                .forward(logits.clone(), batch.labels.clone())
                .into_scalar()
                .elem::<f64>();
            val_loss_sum += batch_loss;
            val_batches += 1;

            val_total += batch.labels.dims()[0];
            val_correct += count_correct(logits, batch.labels);
        }

        let avg_val_loss = if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let val_accuracy = if val_total > 0 { val_correct as f64 / val_total as f64 } else { 0.0 };
        last_val_loss = avg_val_loss;
        last_val_accuracy = val_accuracy;

        // ── Adaptive control ──────────────────────────────────────────────────
        let decision = controller.observe(avg_val_loss, val_accuracy);

        if decision.new_best {
            best_model = model.clone();
            best_epoch = epoch;
            ckpt_manager.save_best(&best_model, epoch, val_accuracy)?;
        }
        if decision.lr_halved {
            tracing::info!(
                "Validation loss plateaued — learning rate halved to {:.2e}",
                decision.lr,
            );
        }

        history.log(&EpochMetrics {
            epoch,
            train_loss: avg_train_loss,
            train_acc:  train_accuracy,
            val_loss:   avg_val_loss,
            val_acc:    val_accuracy,
            lr:         decision.lr,
        })?;

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | val_loss={:.4} | val_acc={:.1}% | lr={:.2e}",
            epoch, cfg.max_epochs, avg_train_loss, train_accuracy * 100.0,
            avg_val_loss, val_accuracy * 100.0, decision.lr,
        );

        if decision.stop {
            break;
        }
    }

    // Early stops hand back the best snapshot; a completed run
    // keeps the last-epoch weights (the best is on disk either way).
    let final_state = controller.state();
    let final_model = match final_state {
        TrainState::EarlyStopped => {
            tracing::info!(
                "Early stopped after {} epochs — restoring best snapshot (epoch {})",
                controller.epochs_run(),
                best_epoch,
            );
            best_model
        }
        _ => model,
    };

    ckpt_manager.save_final(&final_model)?;
    tracing::info!("Training complete: {:?}", final_state);

    let outcome = TrainOutcome {
        final_state,
        epochs_run:         controller.epochs_run(),
        best_epoch,
        best_val_accuracy:  controller.best_val_accuracy,
        final_val_loss:     last_val_loss,
        final_val_accuracy: last_val_accuracy,
    };

    Ok((final_model, outcome))
}

/// How many rows of `logits` predict their label correctly.
/// argmax(1) returns shape [batch, 1] — flatten to [batch]
/// before comparing with the labels tensor.
fn count_correct<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> usize {
    let predictions = logits.argmax(1).flatten::<1>(0, 1);
    let correct: i64 = predictions
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    correct as usize
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> TrainController {
        TrainController::new(100, 20, 7, 1e-3, 1e-7)
    }

    #[test]
    fn test_keeps_running_while_loss_improves() {
        let mut c = controller();
        for epoch in 1..=30 {
            let d = c.observe(1.0 / epoch as f64, 0.5);
            assert!(!d.stop);
        }
        assert_eq!(c.state(), TrainState::Running(31));
        assert!((c.lr() - 1e-3).abs() < 1e-12);
    }

    #[test]
    fn test_early_stops_after_twenty_stale_epochs() {
        let mut c = controller();
        c.observe(0.5, 0.5);
        // 19 stale epochs keep it running, the 20th stops it
        for _ in 0..19 {
            assert!(!c.observe(0.9, 0.5).stop);
        }
        let d = c.observe(0.9, 0.5);
        assert!(d.stop);
        assert_eq!(c.state(), TrainState::EarlyStopped);
    }

    #[test]
    fn test_lr_halves_after_seven_stale_epochs() {
        let mut c = controller();
        c.observe(0.5, 0.5);
        for _ in 0..6 {
            assert!(!c.observe(0.9, 0.5).lr_halved);
        }
        let d = c.observe(0.9, 0.5);
        assert!(d.lr_halved);
        assert!((d.lr - 5e-4).abs() < 1e-12);

        // Decay counter resets; the next plateau needs 7 more epochs
        for _ in 0..6 {
            assert!(!c.observe(0.9, 0.5).lr_halved);
        }
        // 15th stale epoch in a row: second halving before early stop
        assert!(c.observe(0.9, 0.5).lr_halved);
    }

    #[test]
    fn test_lr_never_drops_below_floor() {
        let mut c = TrainController::new(1000, 1000, 1, 2e-7, 1e-7);
        c.observe(0.5, 0.5);
        c.observe(0.9, 0.5); // 2e-7 → 1e-7
        assert!((c.lr() - 1e-7).abs() < 1e-15);
        c.observe(0.9, 0.5); // would halve below the floor → clamped
        assert!((c.lr() - 1e-7).abs() < 1e-15);
    }

    #[test]
    fn test_completes_at_epoch_cap() {
        let mut c = TrainController::new(3, 20, 7, 1e-3, 1e-7);
        assert!(!c.observe(0.9, 0.1).stop);
        assert!(!c.observe(0.8, 0.2).stop);
        let d = c.observe(0.7, 0.3);
        assert!(d.stop);
        assert_eq!(c.state(), TrainState::Completed);
        assert_eq!(c.epochs_run(), 3);
    }

    #[test]
    fn test_best_snapshot_keyed_by_accuracy_not_loss() {
        let mut c = controller();
        assert!(c.observe(0.5, 0.60).new_best);
        // Loss improves but accuracy does not → no new snapshot
        assert!(!c.observe(0.4, 0.55).new_best);
        // Accuracy improves even though loss got worse → snapshot
        assert!(c.observe(0.6, 0.70).new_best);
    }
}
