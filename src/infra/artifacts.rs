// ============================================================
// Layer 6 — Exported Artifacts
// ============================================================
// The records consumed outside this pipeline:
//
//   labels.json         — the label-index map (index → gesture
//                         name), the inference boundary's key for
//                         decoding model outputs
//   training_info.json  — run summary: gesture list, shape
//                         constants, per-split sample counts,
//                         final validation accuracy/loss
//   evaluation.json     — held-out metrics incl. the confusion
//                         matrix, consumed by the external
//                         rendering collaborator
//
// The export boundary (weight conversion into a quantised
// deployment bundle) is an external collaborator: it reads the
// best weights, train_config.json and labels.json from this
// same directory.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::registry::GestureRegistry;
use crate::ml::evaluator::EvaluationRecord;

/// Run summary persisted as training_info.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingInfo {
    pub gestures:        Vec<String>,
    pub num_classes:     usize,
    pub sequence_length: usize,
    pub num_landmarks:   usize,
    pub total_samples:   usize,
    pub train_samples:   usize,
    pub val_samples:     usize,
    pub test_samples:    usize,
    pub final_accuracy:  f64,
    pub final_loss:      f64,
}

/// Writes the exported JSON records into the artifacts directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Persist the label-index map for the inference boundary.
    pub fn write_labels(&self, registry: &GestureRegistry) -> Result<()> {
        let path = self.dir.join("labels.json");
        let json = serde_json::to_string_pretty(&registry.label_map())?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write label map to '{}'", path.display()))?;
        tracing::info!("Label map saved to '{}'", path.display());
        Ok(())
    }

    pub fn write_training_info(&self, info: &TrainingInfo) -> Result<()> {
        let path = self.dir.join("training_info.json");
        let json = serde_json::to_string_pretty(info)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write training info to '{}'", path.display()))?;
        tracing::info!("Training info saved to '{}'", path.display());
        Ok(())
    }

    pub fn write_evaluation(&self, record: &EvaluationRecord) -> Result<()> {
        let path = self.dir.join("evaluation.json");
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write evaluation to '{}'", path.display()))?;
        tracing::info!("Evaluation record saved to '{}'", path.display());
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_labels_json_round_trips_registry_order() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let registry = GestureRegistry::new(vec![
            "Đau".into(),
            "Bác_sĩ".into(),
            "Thuốc".into(),
        ])
        .unwrap();

        store.write_labels(&registry).unwrap();

        let json = fs::read_to_string(tmp.path().join("labels.json")).unwrap();
        let map: std::collections::BTreeMap<usize, String> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map[&0], "Đau");
        assert_eq!(map[&2], "Thuốc");
    }
}
