// ============================================================
// Layer 4 — Sequence Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec of flattened
// gesture samples into GPU-ready tensors.
//
// How batching works here:
//   Input:  Vec of N GestureSamples, each a [T, D] row-major Vec
//   Output: SequenceBatch with a [N, T, D] float tensor and a
//           [N] integer label tensor
//
//   We flatten all features into one long Vec, then reshape:
//   [s1_t1d1, ..., s1_tTdD, s2_t1d1, ...] → [N, T, D]
//
// Why is this easy here?
//   Because the loader already validated every sample to the
//   same [T, D] shape. No per-batch padding is ever needed.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::domain::sample::{GestureSample, SequenceSpec};

// ─── SequenceBatch ────────────────────────────────────────────────────────────
/// A batch of gesture sequences ready for the model forward pass.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// Landmark sequences — shape: [batch_size, T, D]
    pub sequences: Tensor<B, 3>,

    /// Ground truth class indices — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── SequenceBatcher ──────────────────────────────────────────────────────────
/// Holds the target device and the fixed sample shape.
#[derive(Clone, Debug)]
pub struct SequenceBatcher<B: Backend> {
    pub device: B::Device,
    spec: SequenceSpec,
}

impl<B: Backend> SequenceBatcher<B> {
    pub fn new(device: B::Device, spec: SequenceSpec) -> Self {
        Self { device, spec }
    }
}

impl<B: Backend> Batcher<GestureSample, SequenceBatch<B>> for SequenceBatcher<B> {
    fn batch(&self, items: Vec<GestureSample>) -> SequenceBatch<B> {
        let batch_size = items.len();
        let frames = self.spec.frames_per_sequence;
        let width = self.spec.feature_width();

        let features_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let sequences = Tensor::<B, 1>::from_floats(features_flat.as_slice(), &self.device)
            .reshape([batch_size, frames, width]);

        let labels_flat: Vec<i32> = items.iter().map(|s| s.label as i32).collect();
        let labels = Tensor::<B, 1, Int>::from_ints(labels_flat.as_slice(), &self.device);

        SequenceBatch { sequences, labels }
    }
}
