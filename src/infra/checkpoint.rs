// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved per run:
//   1. model_best.mpk.gz   — weights of the highest-val-accuracy
//                            epoch, overwritten on improvement
//   2. model_final.mpk.gz  — weights at the end of the run
//   3. best.json           — which epoch the best snapshot came
//                            from and its validation accuracy
//   4. train_config.json   — the full training configuration
//
// Why save the config separately?
//   When loading for evaluation or export, we need the exact
//   architecture parameters (feature width, class count, hidden
//   sizes) to rebuild the model before loading weights into it.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip for smaller file size
//   - Type-safe: loading fails if the architecture doesn't match
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::domain::error::PipelineError;
use crate::ml::model::SequenceClassifier;

const BEST_WEIGHTS: &str = "model_best";
const FINAL_WEIGHTS: &str = "model_final";

/// Pointer file describing the current best snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestSnapshot {
    pub epoch:        usize,
    pub val_accuracy: f64,
}

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Persist the best snapshot. Called by the training loop
    /// whenever validation accuracy improves.
    pub fn save_best<B: AutodiffBackend>(
        &self,
        model:        &SequenceClassifier<B>,
        epoch:        usize,
        val_accuracy: f64,
    ) -> Result<()> {
        let path = self.dir.join(BEST_WEIGHTS);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save best checkpoint to '{}'", path.display()))?;

        let pointer = BestSnapshot { epoch, val_accuracy };
        let pointer_path = self.dir.join("best.json");
        fs::write(&pointer_path, serde_json::to_string(&pointer)?)
            .with_context(|| "Failed to write best.json")?;

        tracing::debug!(
            "Saved best checkpoint: epoch {} (val_acc={:.4})",
            epoch,
            val_accuracy,
        );
        Ok(())
    }

    /// Persist the end-of-run weights.
    pub fn save_final<B: AutodiffBackend>(&self, model: &SequenceClassifier<B>) -> Result<()> {
        let path = self.dir.join(FINAL_WEIGHTS);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save final weights to '{}'", path.display()))?;
        Ok(())
    }

    /// Load the best snapshot's weights into `model`.
    ///
    /// The model must have the architecture the checkpoint was
    /// trained with. Fails with MissingModelArtifact if no run
    /// has produced a checkpoint here yet.
    pub fn load_best<B: Backend>(
        &self,
        model:  SequenceClassifier<B>,
        device: &B::Device,
    ) -> Result<SequenceClassifier<B>> {
        let pointer_path = self.dir.join("best.json");
        if !pointer_path.exists() {
            return Err(PipelineError::MissingModelArtifact(
                self.dir.display().to_string(),
            )
            .into());
        }

        let pointer: BestSnapshot = serde_json::from_str(
            &fs::read_to_string(&pointer_path).with_context(|| "Cannot read best.json")?,
        )?;
        tracing::info!(
            "Loading best checkpoint (epoch {}, val_acc={:.4})",
            pointer.epoch,
            pointer.val_accuracy,
        );

        let path = self.dir.join(BEST_WEIGHTS);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;

        // load_record() returns a new model with the loaded weights
        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    ///
    /// This must be called before training starts so evaluation
    /// can reconstruct the exact model architecture and split.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'evaluate'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}
