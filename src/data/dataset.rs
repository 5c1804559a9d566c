use burn::data::dataset::Dataset;

use crate::domain::sample::GestureSample;

/// Gesture samples behind Burn's Dataset trait, so the
/// DataLoader can call .get(index) and .len().
pub struct SequenceDataset {
    samples: Vec<GestureSample>,
}

impl SequenceDataset {
    pub fn new(samples: Vec<GestureSample>) -> Self {
        Self { samples }
    }

    /// Materialise one split partition as its own dataset.
    pub fn from_indices(all: &[GestureSample], indices: &[usize]) -> Self {
        Self {
            samples: indices.iter().map(|&i| all[i].clone()).collect(),
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<GestureSample> for SequenceDataset {
    fn get(&self, index: usize) -> Option<GestureSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
