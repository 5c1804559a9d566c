// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles all cross-cutting concerns that don't belong in
// any specific business layer:
//
//   checkpoint.rs — Saving and loading model weights
//                   Uses Burn's CompactRecorder to serialise
//                   model parameters to disk. Tracks the best
//                   snapshot via a pointer file, and saves/loads
//                   the TrainConfig as JSON so evaluation can
//                   rebuild the exact architecture.
//
//   metrics.rs    — Training history logging
//                   Appends epoch-level metrics (loss, accuracy,
//                   learning rate) to history.csv — the raw data
//                   behind the external training-curve rendering.
//
//   artifacts.rs  — Exported records for the inference boundary
//                   labels.json (the label-index map),
//                   training_info.json (run summary), and
//                   evaluation.json (held-out metrics).
//
// Why is this a separate layer?
//   These concerns are used by multiple other layers but
//   don't belong to any one of them. Keeping them here:
//   - Prevents duplication across layers
//   - Makes it easy to swap implementations
//     (e.g. swap file checkpoints for S3 cloud storage)
//   - Keeps other layers focused on their core logic
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Per-epoch training history CSV logger
pub mod metrics;

/// Label map, training info, and evaluation artifacts
pub mod artifacts;
