// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from raw JSON sample records
// all the way to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   dataset/<gesture>/*.json
//       │
//       ▼
//   DatasetLoader     → parses records, validates shapes,
//       │               flattens frames to [T, D] samples
//       ▼
//   Augmentor         → (optional) synthesises extra labelled
//       │               variants: scale → noise → rotate
//       ▼
//   stratified_split  → seeded 70/15/15 train/val/test
//       │               index partitions, per class
//       ▼
//   SequenceDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   SequenceBatcher   → stacks samples into [batch, T, D] tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Scans gesture directories and parses sample record files
pub mod loader;

/// Synthesises additional labelled variants from real samples
pub mod augmentor;

/// Seeded stratified train/validation/test partitioning
pub mod splitter;

/// Implements Burn's Dataset trait over gesture samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
