// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Re-evaluates a previously trained model on the test split,
// without retraining:
//
//   1. Reload train_config.json from the artifacts directory
//   2. Reload the registry the run was trained against
//   3. Reload the dataset and replay augmentation + split with
//      the STORED seed and factor — the partition is a pure
//      function of (data, seed, factor), so the test split is
//      byte-for-byte the one training held out
//   4. Rebuild the model architecture and load the best weights
//      (MissingModelArtifact if no run produced them)
//   5. Evaluate and rewrite evaluation.json

use anyhow::Result;

use crate::data::{
    augmentor::{AugmentConfig, Augmentor},
    dataset::SequenceDataset,
    loader::DatasetLoader,
    splitter::stratified_split,
};
use crate::domain::registry::GestureRegistry;
use crate::infra::{artifacts::ArtifactStore, checkpoint::CheckpointManager};
use crate::ml::evaluator::{evaluate_model, EvaluationRecord};
use crate::ml::model::SequenceClassifier;
use crate::ml::trainer::ValidBackend;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct EvaluateUseCase {
    artifacts_dir: String,
}

impl EvaluateUseCase {
    pub fn new(artifacts_dir: impl Into<String>) -> Self {
        Self { artifacts_dir: artifacts_dir.into() }
    }

    pub fn execute(&self) -> Result<EvaluationRecord> {
        let ckpt_manager = CheckpointManager::new(&self.artifacts_dir);
        let cfg = ckpt_manager.load_config()?;
        let spec = cfg.sequence_spec();

        let registry = GestureRegistry::from_file(&cfg.registry_path)?;

        // Replay the data pipeline to recover the held-out split
        let loaded = DatasetLoader::new(&cfg.data_dir, spec).load(&registry)?;
        let mut samples = loaded.samples;
        if cfg.augment_factor > 1 {
            let augmentor = Augmentor::new(AugmentConfig::default(), spec);
            let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
            samples = augmentor.augment_dataset(&samples, cfg.augment_factor, &mut rng);
        }
        let labels: Vec<usize> = samples.iter().map(|s| s.label).collect();
        let split = stratified_split(&labels, registry.len(), cfg.seed);
        let test_dataset = SequenceDataset::from_indices(&samples, &split.test);

        // Rebuild the architecture, then load the best weights into it
        let device = burn::backend::wgpu::WgpuDevice::default();
        let model: SequenceClassifier<ValidBackend> =
            cfg.model_config(&registry).init(&device);
        let model = ckpt_manager.load_best(model, &device)?;

        let evaluation = evaluate_model(
            &model,
            test_dataset,
            spec,
            &registry,
            cfg.batch_size,
            &device,
        )?;

        ArtifactStore::new(&self.artifacts_dir).write_evaluation(&evaluation)?;
        Ok(evaluation)
    }
}
