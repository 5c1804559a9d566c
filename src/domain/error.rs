// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Only the conditions that abort the pipeline are modelled as
// error values. Per-file and per-sequence problems (a missing
// gesture directory, a malformed record, a wrong frame count)
// are contained inside the DatasetLoader: they are logged,
// counted, and never stop the scan of the remaining data.
//
// Reference: Rust Book §9 (Error Handling), thiserror docs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// No sequence survived the dataset scan — nothing to train on.
    #[error("no usable sequences found in the dataset — check the data directory layout")]
    EmptyDataset,

    /// A registry must name at least one gesture.
    #[error("the gesture registry is empty")]
    EmptyRegistry,

    /// Duplicate names would break the label-index bijection.
    #[error("duplicate gesture name in registry: '{0}'")]
    DuplicateGesture(String),

    /// Evaluation or export was invoked before any model was trained.
    #[error("no trained model artifact found at '{0}' — run `train` first")]
    MissingModelArtifact(String),
}
