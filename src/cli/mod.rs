// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — runs the full training pipeline on a
//                   dataset of gesture recordings
//   2. `evaluate` — reloads the best checkpoint and recomputes
//                   held-out metrics
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "gesture-trainer",
    version = "0.1.0",
    about = "Train a temporal hand-gesture classifier on landmark recordings."
)]
pub struct Cli {
    /// The subcommand to run (train or evaluate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(ref args)    => self.run_train(args.clone()),
            Commands::Evaluate(ref args) => self.run_evaluate(args.clone()),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(&self, args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on recordings in: {}", args.data_dir);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Artifacts saved.");
        Ok(())
    }

    /// Handles the `evaluate` subcommand.
    /// Reloads the best checkpoint and prints held-out metrics.
    fn run_evaluate(&self, args: EvaluateArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        let use_case = EvaluateUseCase::new(args.artifacts_dir.clone());
        let evaluation = use_case.execute()?;

        println!(
            "\nTest loss: {:.4}\nTest accuracy: {:.4} ({:.2}%)",
            evaluation.loss,
            evaluation.accuracy,
            evaluation.accuracy * 100.0,
        );
        for class in &evaluation.per_class {
            println!(
                "  {:<12} precision={:.3} recall={:.3} f1={:.3} (n={})",
                class.gesture, class.precision, class.recall, class.f1, class.support,
            );
        }
        Ok(())
    }
}
