// ============================================================
// Layer 4 — Augmentation Engine
// ============================================================
// Synthesises additional labelled training variation from the
// limited real recordings. Each variant applies, in this fixed
// order, to the full flattened [T, D] sample:
//
//   1. Scale   — one scalar s ~ U(0.9, 1.1) per variant,
//                multiplied into every coordinate
//   2. Noise   — iid Gaussian N(0, 0.01²) on every coordinate
//   3. Rotate  — one planar angle θ ~ U(-15°, +15°) per variant,
//                applied to every landmark's (x, y) pair; a
//                single angle for the whole sequence keeps the
//                motion temporally coherent. z is untouched by
//                the rotation.
//
// The label of every generated variant equals the source
// sample's label, so class proportions never change. Variants
// are marked `derived` for provenance; originals are never
// mutated.
//
// The random generator is an explicit parameter — callers seed
// it, which makes augmentation reproducible and keeps this
// module free of global state.
//
// Reference: rand / rand_distr documentation
//            Rust Book §13 (Iterators and Closures)

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::domain::sample::{GestureSample, SequenceSpec};

/// Transform parameters. The defaults match the capture-scale
/// conventions of the recordings; tests zero individual fields
/// to isolate one transform at a time.
#[derive(Debug, Clone, Copy)]
pub struct AugmentConfig {
    /// Uniform range for the per-variant scale factor.
    pub scale_range: (f32, f32),
    /// Standard deviation of the per-coordinate Gaussian noise.
    pub noise_std: f32,
    /// Half-width, in degrees, of the uniform rotation range.
    pub rotation_degrees: f32,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            scale_range:      (0.9, 1.1),
            noise_std:        0.01,
            rotation_degrees: 15.0,
        }
    }
}

pub struct Augmentor {
    config: AugmentConfig,
    spec:   SequenceSpec,
}

impl Augmentor {
    pub fn new(config: AugmentConfig, spec: SequenceSpec) -> Self {
        Self { config, spec }
    }

    /// Produce one synthetic variant of `sample`.
    /// The source is cloned, never mutated.
    pub fn augment_sample(&self, sample: &GestureSample, rng: &mut impl Rng) -> GestureSample {
        let mut features = sample.features.clone();

        // 1. Scale — one factor for the whole variant
        let (lo, hi) = self.config.scale_range;
        let scale = rng.gen_range(lo..=hi);
        for v in features.iter_mut() {
            *v *= scale;
        }

        // 2. Gaussian noise on every coordinate
        let noise = Normal::new(0.0f32, self.config.noise_std)
            .expect("noise_std must be non-negative");
        for v in features.iter_mut() {
            *v += noise.sample(rng);
        }

        // 3. Planar rotation — one angle for the whole sequence
        let half = self.config.rotation_degrees;
        let theta = rng.gen_range(-half..=half).to_radians();
        let (sin, cos) = theta.sin_cos();

        let width = self.spec.feature_width();
        let landmarks = self.spec.hand_mode.landmarks_per_frame();
        for frame in 0..self.spec.frames_per_sequence {
            for lm in 0..landmarks {
                let xi = frame * width + lm * 3;
                let yi = xi + 1;
                let x = features[xi];
                let y = features[yi];
                features[xi] = x * cos - y * sin;
                features[yi] = x * sin + y * cos;
            }
        }

        GestureSample {
            features,
            label:     sample.label,
            person_id: sample.person_id.clone(),
            derived:   true,
        }
    }

    /// Expand `samples` by `factor`: each input contributes the
    /// original plus `factor - 1` independently drawn variants,
    /// so the output holds exactly `factor * N` samples with the
    /// same class proportions. `factor == 1` is the identity.
    pub fn augment_dataset(
        &self,
        samples: &[GestureSample],
        factor: usize,
        rng: &mut impl Rng,
    ) -> Vec<GestureSample> {
        assert!(factor >= 1, "augmentation factor must be at least 1");

        let mut out = Vec::with_capacity(samples.len() * factor);
        for sample in samples {
            out.push(sample.clone());
            for _ in 1..factor {
                out.push(self.augment_sample(sample, rng));
            }
        }

        tracing::info!(
            "Augmented dataset: {} → {} samples (factor {})",
            samples.len(),
            out.len(),
            factor,
        );
        out
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::HandMode;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spec() -> SequenceSpec {
        SequenceSpec { frames_per_sequence: 4, hand_mode: HandMode::Single }
    }

    fn sample(label: usize) -> GestureSample {
        let spec = spec();
        let features: Vec<f32> = (0..spec.values_per_sample())
            .map(|i| (i as f32 * 0.37).sin() * 0.4)
            .collect();
        GestureSample { features, label, person_id: "person1".into(), derived: false }
    }

    #[test]
    fn test_factor_three_triples_counts_per_class() {
        let augmentor = Augmentor::new(AugmentConfig::default(), spec());
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let input: Vec<GestureSample> =
            (0..30).map(|i| sample(i % 3)).collect();
        let out = augmentor.augment_dataset(&input, 3, &mut rng);

        assert_eq!(out.len(), 90);
        for class in 0..3 {
            let count = out.iter().filter(|s| s.label == class).count();
            assert_eq!(count, 30);
        }
        // Originals survive unchanged and retain provenance
        assert_eq!(out[0].features, input[0].features);
        assert!(!out[0].derived);
        assert!(out[1].derived);
    }

    #[test]
    fn test_factor_one_is_identity() {
        let augmentor = Augmentor::new(AugmentConfig::default(), spec());
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let input = vec![sample(0), sample(1)];
        let out = augmentor.augment_dataset(&input, 1, &mut rng);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].features, input[0].features);
        assert_eq!(out[1].features, input[1].features);
    }

    #[test]
    fn test_rotation_preserves_planar_norm() {
        // Disable scale and noise so only the rotation acts
        let config = AugmentConfig {
            scale_range:      (1.0, 1.0),
            noise_std:        0.0,
            rotation_degrees: 15.0,
        };
        let spec = spec();
        let augmentor = Augmentor::new(config, spec);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let original = sample(0);
        let rotated = augmentor.augment_sample(&original, &mut rng);

        let width = spec.feature_width();
        for frame in 0..spec.frames_per_sequence {
            for lm in 0..spec.hand_mode.landmarks_per_frame() {
                let xi = frame * width + lm * 3;
                let (x0, y0, z0) = (
                    original.features[xi],
                    original.features[xi + 1],
                    original.features[xi + 2],
                );
                let (x1, y1, z1) = (
                    rotated.features[xi],
                    rotated.features[xi + 1],
                    rotated.features[xi + 2],
                );

                let norm0 = (x0 * x0 + y0 * y0).sqrt();
                let norm1 = (x1 * x1 + y1 * y1).sqrt();
                assert!((norm0 - norm1).abs() < 1e-5);
                // z is untouched by the rotation
                assert_eq!(z0, z1);
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces_variants() {
        let augmentor = Augmentor::new(AugmentConfig::default(), spec());
        let input = vec![sample(0), sample(1), sample(2)];

        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);
        let out_a = augmentor.augment_dataset(&input, 3, &mut rng_a);
        let out_b = augmentor.augment_dataset(&input, 3, &mut rng_b);

        assert_eq!(out_a.len(), out_b.len());
        for (a, b) in out_a.iter().zip(out_b.iter()) {
            assert_eq!(a.features, b.features);
        }
    }
}
