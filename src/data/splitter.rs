// ============================================================
// Layer 4 — Stratified Splitter
// ============================================================
// Partitions sample indices into train/validation/test subsets
// while preserving per-class proportions.
//
// Why stratify?
//   Gesture datasets are rarely balanced. A plain random split
//   can leave a rare gesture entirely out of the validation set,
//   making its accuracy numbers meaningless. Stratifying splits
//   each class separately so every partition mirrors the global
//   class mix.
//
// Two-stage split, both stages stratified:
//   1. 70% train / 30% remainder
//   2. remainder halved into validation and test
//   → approximately 70 / 15 / 15
//
// Rounding rule (fixed, so split sizes are reproducible):
//   per class, train takes round(n · 0.7); of the remainder,
//   test takes the ceil half and validation the floor half.
//
// The split is computed over indices, not samples — partitions
// are views into the (possibly augmented) dataset, recomputed
// each run from a fixed seed. The seeded ChaCha8 generator makes
// the same seed produce the same partition on every platform.
//
// Reference: rand / rand_chacha documentation
//            Rust Book §8 (Vectors)

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Disjoint index partitions over a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub val:   Vec<usize>,
    pub test:  Vec<usize>,
}

impl SplitIndices {
    pub fn total(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }
}

/// Stratified 70/15/15 split of `labels` (one label per sample).
///
/// Every index in `0..labels.len()` lands in exactly one
/// partition. Per-class counts in each partition stay within one
/// sample of the exact 70/15/15 targets.
pub fn stratified_split(labels: &[usize], num_classes: usize, seed: u64) -> SplitIndices {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    // Bucket sample indices by class, in label order so the
    // iteration sequence (and hence the RNG stream) is fixed.
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); num_classes];
    for (idx, &label) in labels.iter().enumerate() {
        by_class[label].push(idx);
    }

    let mut split = SplitIndices {
        train: Vec::new(),
        val:   Vec::new(),
        test:  Vec::new(),
    };

    for bucket in by_class.iter_mut() {
        // Fisher-Yates shuffle — every permutation equally likely
        bucket.shuffle(&mut rng);

        let n = bucket.len();
        let train_n = (n as f64 * 0.7).round() as usize;
        let remainder = n - train_n;
        let test_n = (remainder + 1) / 2; // ceil half
        let val_n = remainder - test_n;   // floor half

        split.train.extend_from_slice(&bucket[..train_n]);
        split.val.extend_from_slice(&bucket[train_n..train_n + val_n]);
        split.test.extend_from_slice(&bucket[train_n + val_n..]);
    }

    tracing::info!(
        "Dataset split: {} train, {} val, {} test (seed {})",
        split.train.len(),
        split.val.len(),
        split.test.len(),
        seed,
    );

    split
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// `count` samples for each of `classes` classes, interleaved.
    fn balanced_labels(classes: usize, count: usize) -> Vec<usize> {
        (0..classes * count).map(|i| i % classes).collect()
    }

    fn class_counts(indices: &[usize], labels: &[usize], classes: usize) -> Vec<usize> {
        let mut counts = vec![0usize; classes];
        for &i in indices {
            counts[labels[i]] += 1;
        }
        counts
    }

    #[test]
    fn test_reference_dataset_split_sizes() {
        // 5 classes × 50 samples: per class 35 train, 7 val, 8 test
        let labels = balanced_labels(5, 50);
        let split = stratified_split(&labels, 5, 42);

        assert_eq!(split.train.len(), 175);
        assert_eq!(split.val.len(), 35);
        assert_eq!(split.test.len(), 40);
        assert_eq!(split.total(), 250);
    }

    #[test]
    fn test_same_seed_reproduces_partition() {
        let labels = balanced_labels(5, 50);
        let a = stratified_split(&labels, 5, 42);
        let b = stratified_split(&labels, 5, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_partitions_are_disjoint_and_cover_everything() {
        let labels = balanced_labels(3, 17);
        let split = stratified_split(&labels, 3, 7);

        let mut all: Vec<usize> = split
            .train
            .iter()
            .chain(split.val.iter())
            .chain(split.test.iter())
            .copied()
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), labels.len());
        assert_eq!(all, (0..labels.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_per_class_counts_stay_within_one_of_targets() {
        let labels = balanced_labels(4, 25);
        let split = stratified_split(&labels, 4, 3);

        let train = class_counts(&split.train, &labels, 4);
        let val = class_counts(&split.val, &labels, 4);
        let test = class_counts(&split.test, &labels, 4);

        for c in 0..4 {
            assert!((train[c] as f64 - 25.0 * 0.70).abs() <= 1.0);
            assert!((val[c] as f64 - 25.0 * 0.15).abs() <= 1.0);
            assert!((test[c] as f64 - 25.0 * 0.15).abs() <= 1.0);
        }
    }

    #[test]
    fn test_unbalanced_classes_keep_proportions() {
        // 40 of class 0, 10 of class 1
        let mut labels = vec![0usize; 40];
        labels.extend(vec![1usize; 10]);
        let split = stratified_split(&labels, 2, 19);

        let train = class_counts(&split.train, &labels, 2);
        assert_eq!(train[0], 28); // round(40 · 0.7)
        assert_eq!(train[1], 7);  // round(10 · 0.7)
    }
}
