// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `evaluate`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the gesture classifier on landmark recordings
    Train(TrainArgs),

    /// Re-evaluate a trained checkpoint on the held-out test split
    Evaluate(EvaluateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Dataset root: one subdirectory of JSON recordings per gesture
    #[arg(long, default_value = "dataset")]
    pub data_dir: String,

    /// Directory for checkpoints, history, and exported records
    #[arg(long, default_value = "artifacts")]
    pub artifacts_dir: String,

    /// JSON file with the ordered gesture-name registry
    #[arg(long, default_value = "gestures.json")]
    pub registry: String,

    /// Frames per sequence (T) — recordings of any other length are skipped
    #[arg(long, default_value_t = 30)]
    pub frames: usize,

    /// Expect 42 landmarks per frame (both hands) instead of 21
    #[arg(long, default_value_t = false)]
    pub dual_hand: bool,

    /// Samples produced per real recording: the original plus
    /// factor-1 synthetic variants. 1 disables augmentation
    #[arg(long, default_value_t = 1)]
    pub augment_factor: usize,

    /// Seed driving augmentation, the stratified split, and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Hard cap on training epochs
    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    /// Initial learning rate for Adam — decays on validation plateaus
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Stop after this many epochs without validation-loss improvement
    #[arg(long, default_value_t = 20)]
    pub early_stop_patience: usize,

    /// Halve the learning rate after this many stale epochs
    #[arg(long, default_value_t = 7)]
    pub lr_patience: usize,

    /// Learning-rate floor for plateau decay
    #[arg(long, default_value_t = 1e-7)]
    pub min_lr: f64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:            a.data_dir,
            artifacts_dir:       a.artifacts_dir,
            registry_path:       a.registry,
            frames_per_sequence: a.frames,
            dual_hand:           a.dual_hand,
            augment_factor:      a.augment_factor,
            seed:                a.seed,
            batch_size:          a.batch_size,
            max_epochs:          a.epochs,
            lr:                  a.lr,
            early_stop_patience: a.early_stop_patience,
            lr_patience:         a.lr_patience,
            min_lr:              a.min_lr,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Directory where a previous `train` run left its artifacts
    #[arg(long, default_value = "artifacts")]
    pub artifacts_dir: String,
}
