// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the gesture registry   (Layer 3 - domain)
//   Step 2: Load + validate the dataset (Layer 4 - data)
//   Step 3: Augment (optional)          (Layer 4 - data)
//   Step 4: Stratified 70/15/15 split   (Layer 4 - data)
//   Step 5: Build Burn datasets         (Layer 4 - data)
//   Step 6: Save config + label map     (Layer 6 - infra)
//   Step 7: Run training loop           (Layer 5 - ml)
//   Step 8: Evaluate on the test split  (Layer 5 - ml)
//   Step 9: Persist run artifacts       (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::module::AutodiffModule;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data::{
    augmentor::{AugmentConfig, Augmentor},
    dataset::SequenceDataset,
    loader::DatasetLoader,
    splitter::stratified_split,
};
use crate::domain::registry::GestureRegistry;
use crate::domain::sample::{HandMode, SequenceSpec};
use crate::infra::{
    artifacts::{ArtifactStore, TrainingInfo},
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
};
use crate::ml::evaluator::evaluate_model;
use crate::ml::model::SequenceClassifierConfig;
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All parameters for a training run. Serialisable so it can be
// saved to disk and reloaded for evaluation — the stored seed and
// augment factor are what make the split reproducible later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:            String,
    pub artifacts_dir:       String,
    pub registry_path:       String,
    pub frames_per_sequence: usize,
    pub dual_hand:           bool,
    pub augment_factor:      usize,
    pub seed:                u64,
    pub batch_size:          usize,
    pub max_epochs:          usize,
    pub lr:                  f64,
    pub early_stop_patience: usize,
    pub lr_patience:         usize,
    pub min_lr:              f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:            "dataset".to_string(),
            artifacts_dir:       "artifacts".to_string(),
            registry_path:       "gestures.json".to_string(),
            frames_per_sequence: 30,
            dual_hand:           false,
            augment_factor:      1,
            seed:                42,
            batch_size:          32,
            max_epochs:          100,
            lr:                  1e-3,
            early_stop_patience: 20,
            lr_patience:         7,
            min_lr:              1e-7,
        }
    }
}

impl TrainConfig {
    /// The shape constants this run is fixed to.
    pub fn sequence_spec(&self) -> SequenceSpec {
        SequenceSpec {
            frames_per_sequence: self.frames_per_sequence,
            hand_mode: if self.dual_hand { HandMode::Dual } else { HandMode::Single },
        }
    }

    /// The model architecture implied by this run's shape and registry.
    pub fn model_config(&self, registry: &GestureRegistry) -> SequenceClassifierConfig {
        SequenceClassifierConfig::new(self.sequence_spec().feature_width(), registry.len())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        let spec = cfg.sequence_spec();

        // ── Step 1: Load the gesture registry ─────────────────────────────────
        // The single source of truth for label indices
        let registry = GestureRegistry::from_file(&cfg.registry_path)?;
        tracing::info!(
            "Registry: {} gestures ({})",
            registry.len(),
            registry.names().join(", "),
        );

        // ── Step 2: Load and validate the dataset ─────────────────────────────
        // Fatal only if nothing at all was accepted
        let loader = DatasetLoader::new(&cfg.data_dir, spec);
        let loaded = loader.load(&registry)?;
        let mut samples = loaded.samples;

        // ── Step 3: Optional augmentation ─────────────────────────────────────
        // factor 1 means training on real recordings only
        if cfg.augment_factor > 1 {
            let augmentor = Augmentor::new(AugmentConfig::default(), spec);
            let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
            samples = augmentor.augment_dataset(&samples, cfg.augment_factor, &mut rng);
        }
        let total_samples = samples.len();

        // ── Step 4: Stratified 70/15/15 split ─────────────────────────────────
        // Index partitions over the (possibly augmented) dataset,
        // recomputable from the stored seed
        let labels: Vec<usize> = samples.iter().map(|s| s.label).collect();
        let split = stratified_split(&labels, registry.len(), cfg.seed);

        // ── Step 5: Build Burn datasets per partition ──────────────────────────
        let train_dataset = SequenceDataset::from_indices(&samples, &split.train);
        let val_dataset = SequenceDataset::from_indices(&samples, &split.val);
        let test_dataset = SequenceDataset::from_indices(&samples, &split.test);

        // ── Step 6: Persist config and label map up front ──────────────────────
        // Evaluation needs the config to rebuild the model; the
        // inference boundary needs the label map to decode outputs
        let ckpt_manager = CheckpointManager::new(&cfg.artifacts_dir);
        ckpt_manager.save_config(cfg)?;
        let artifacts = ArtifactStore::new(&cfg.artifacts_dir);
        artifacts.write_labels(&registry)?;

        // ── Step 7: Run the training loop (Layer 5) ────────────────────────────
        let history = MetricsLogger::new(&cfg.artifacts_dir)?;
        let model_cfg = cfg.model_config(&registry);
        let (model, outcome) = run_training(
            cfg,
            &model_cfg,
            spec,
            train_dataset,
            val_dataset,
            &ckpt_manager,
            &history,
        )?;

        // ── Step 8: Held-out evaluation on the test split ──────────────────────
        let device = burn::backend::wgpu::WgpuDevice::default();
        let evaluation = evaluate_model(
            &model.valid(),
            test_dataset,
            spec,
            &registry,
            cfg.batch_size,
            &device,
        )?;
        artifacts.write_evaluation(&evaluation)?;

        // ── Step 9: Persist the run summary ────────────────────────────────────
        artifacts.write_training_info(&TrainingInfo {
            gestures:        registry.names().to_vec(),
            num_classes:     registry.len(),
            sequence_length: spec.frames_per_sequence,
            num_landmarks:   spec.hand_mode.landmarks_per_frame(),
            total_samples,
            train_samples:   split.train.len(),
            val_samples:     split.val.len(),
            test_samples:    split.test.len(),
            final_accuracy:  outcome.final_val_accuracy,
            final_loss:      outcome.final_val_loss,
        })?;

        tracing::info!(
            "Run finished: {:?} after {} epochs (best epoch {}, best val_acc={:.4}, test_acc={:.4})",
            outcome.final_state,
            outcome.epochs_run,
            outcome.best_epoch,
            outcome.best_val_accuracy,
            evaluation.accuracy,
        );
        Ok(())
    }
}
