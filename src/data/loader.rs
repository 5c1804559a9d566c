// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Loads gesture recordings from a directory tree laid out as
// one subdirectory per gesture label:
//
//   dataset/
//   ├── Đau/
//   │   ├── person1_seq001.json
//   │   └── ...
//   ├── Bác_sĩ/
//   └── ...
//
// Filenames are not semantically constrained — only the
// directory name (the gesture) and the file contents matter.
//
// Containment policy:
//   - missing gesture directory  → warn, zero samples, continue
//   - unparseable file           → warn, count, continue
//   - sequence with wrong shape  → warn, count, continue
//   - zero samples overall       → fatal (EmptyDataset)
//
// Only the last case can abort the pipeline; everything else
// is surfaced as aggregate skip counts for logging.
//
// Reference: Rust Book §8 (Collections), §9 (Error Handling)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::error::PipelineError;
use crate::domain::registry::GestureRegistry;
use crate::domain::sample::{GestureSample, SampleRecord, SequenceRecord, SequenceSpec};

/// Scans a dataset root and produces flattened samples.
pub struct DatasetLoader {
    root: PathBuf,
    spec: SequenceSpec,
}

/// Everything the scan produced, plus the skip counters the
/// containment policy requires.
#[derive(Debug)]
pub struct LoadedDataset {
    pub samples:           Vec<GestureSample>,
    /// Accepted sequence count per gesture, in registry order.
    pub per_gesture:       Vec<usize>,
    pub skipped_files:     usize,
    pub skipped_sequences: usize,
    pub spec:              SequenceSpec,
}

impl DatasetLoader {
    pub fn new(root: impl Into<PathBuf>, spec: SequenceSpec) -> Self {
        Self { root: root.into(), spec }
    }

    /// Scan every gesture subdirectory in registry order.
    ///
    /// Returns a fatal EmptyDataset error only if no sequence at
    /// all was accepted; individual bad files and bad sequences
    /// are skipped and counted.
    pub fn load(&self, registry: &GestureRegistry) -> Result<LoadedDataset> {
        let mut samples = Vec::new();
        let mut per_gesture = vec![0usize; registry.len()];
        let mut skipped_files = 0usize;
        let mut skipped_sequences = 0usize;

        for (label, gesture) in registry.names().iter().enumerate() {
            let gesture_dir = self.root.join(gesture);

            if !gesture_dir.exists() {
                tracing::warn!(
                    "Gesture directory '{}' not found — skipping",
                    gesture_dir.display()
                );
                continue;
            }

            let before = samples.len();

            for entry in fs::read_dir(&gesture_dir)
                .with_context(|| format!("Cannot read directory '{}'", gesture_dir.display()))?
            {
                let entry = entry?;
                let path = entry.path();

                // Only JSON record files are considered
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }

                match read_record(&path) {
                    Ok(record) => {
                        for sequence in &record.sequences {
                            match self.flatten_sequence(sequence) {
                                Some(features) => samples.push(GestureSample {
                                    features,
                                    label,
                                    person_id: record.person_id.clone(),
                                    derived: false,
                                }),
                                None => {
                                    tracing::warn!(
                                        "'{}': sequence has wrong shape (expected {} frames × {} landmarks) — skipping",
                                        path.display(),
                                        self.spec.frames_per_sequence,
                                        self.spec.hand_mode.landmarks_per_frame(),
                                    );
                                    skipped_sequences += 1;
                                }
                            }
                        }
                    }
                    // Log a warning but continue — don't fail on one bad file
                    Err(e) => {
                        tracing::warn!("Skipping '{}': {}", path.display(), e);
                        skipped_files += 1;
                    }
                }
            }

            per_gesture[label] = samples.len() - before;
            tracing::info!("  {}: {} sequences loaded", gesture, per_gesture[label]);
        }

        if samples.is_empty() {
            return Err(PipelineError::EmptyDataset.into());
        }

        tracing::info!(
            "Dataset loaded: {} sequences ({} files skipped, {} sequences skipped)",
            samples.len(),
            skipped_files,
            skipped_sequences,
        );

        Ok(LoadedDataset {
            samples,
            per_gesture,
            skipped_files,
            skipped_sequences,
            spec: self.spec,
        })
    }

    /// Flatten one embedded sequence to a row-major [T, D] vector.
    /// Returns None if the frame count or any frame's landmark
    /// count does not match the configured shape.
    fn flatten_sequence(&self, sequence: &SequenceRecord) -> Option<Vec<f32>> {
        if sequence.frames.len() != self.spec.frames_per_sequence {
            return None;
        }

        let landmarks_per_frame = self.spec.hand_mode.landmarks_per_frame();
        let mut features = Vec::with_capacity(self.spec.values_per_sample());

        for frame in &sequence.frames {
            if frame.landmarks.len() != landmarks_per_frame {
                return None;
            }
            for lm in &frame.landmarks {
                features.push(lm.x);
                features.push(lm.y);
                features.push(lm.z);
            }
        }

        Some(features)
    }
}

/// Parse a single sample record file.
fn read_record(path: &Path) -> Result<SampleRecord> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    let record: SampleRecord = serde_json::from_str(&json)
        .with_context(|| format!("Malformed sample record '{}'", path.display()))?;
    Ok(record)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::{FrameRecord, HandMode, LandmarkPoint};
    use tempfile::TempDir;

    const T: usize = 5;

    fn spec() -> SequenceSpec {
        SequenceSpec { frames_per_sequence: T, hand_mode: HandMode::Single }
    }

    fn registry(names: &[&str]) -> GestureRegistry {
        GestureRegistry::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn sequence_with_frames(frame_count: usize) -> SequenceRecord {
        let landmarks: Vec<LandmarkPoint> = (0..21)
            .map(|i| LandmarkPoint { x: 0.5 + i as f32 * 0.01, y: 0.4, z: -0.02 })
            .collect();
        SequenceRecord {
            frames: (0..frame_count)
                .map(|_| FrameRecord { landmarks: landmarks.clone() })
                .collect(),
        }
    }

    fn write_record(dir: &Path, name: &str, record: &SampleRecord) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), serde_json::to_string(record).unwrap()).unwrap();
    }

    #[test]
    fn test_loads_all_valid_sequences() {
        let tmp = TempDir::new().unwrap();
        let reg = registry(&["Đau", "Thuốc"]);

        // Two sequences in one file for the first gesture
        write_record(&tmp.path().join("Đau"), "p1_seq001.json", &SampleRecord {
            gesture:   "Đau".into(),
            person_id: "person1".into(),
            sequences: vec![sequence_with_frames(T), sequence_with_frames(T)],
        });
        // One sequence for the second
        write_record(&tmp.path().join("Thuốc"), "p2_seq001.json", &SampleRecord {
            gesture:   "Thuốc".into(),
            person_id: "person2".into(),
            sequences: vec![sequence_with_frames(T)],
        });

        let loaded = DatasetLoader::new(tmp.path(), spec()).load(&reg).unwrap();

        assert_eq!(loaded.samples.len(), 3);
        assert_eq!(loaded.per_gesture, vec![2, 1]);
        assert_eq!(loaded.skipped_files, 0);
        assert_eq!(loaded.skipped_sequences, 0);

        // Every sample is a flattened [T, D] row with the right label
        for sample in &loaded.samples {
            assert_eq!(sample.features.len(), spec().values_per_sample());
            assert!(!sample.derived);
        }
        assert_eq!(loaded.samples[0].label, 0);
        assert_eq!(loaded.samples[2].label, 1);
    }

    #[test]
    fn test_wrong_frame_count_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let reg = registry(&["Đau"]);

        write_record(&tmp.path().join("Đau"), "p1_seq001.json", &SampleRecord {
            gesture:   "Đau".into(),
            person_id: "person1".into(),
            sequences: vec![sequence_with_frames(T), sequence_with_frames(T - 1)],
        });

        let loaded = DatasetLoader::new(tmp.path(), spec()).load(&reg).unwrap();
        assert_eq!(loaded.samples.len(), 1);
        assert_eq!(loaded.skipped_sequences, 1);
    }

    #[test]
    fn test_malformed_file_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let reg = registry(&["Đau"]);

        let dir = tmp.path().join("Đau");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("broken.json"), "{ not json").unwrap();
        write_record(&dir, "p1_seq001.json", &SampleRecord {
            gesture:   "Đau".into(),
            person_id: "person1".into(),
            sequences: vec![sequence_with_frames(T)],
        });

        let loaded = DatasetLoader::new(tmp.path(), spec()).load(&reg).unwrap();
        assert_eq!(loaded.samples.len(), 1);
        assert_eq!(loaded.skipped_files, 1);
    }

    #[test]
    fn test_missing_gesture_directory_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let reg = registry(&["Đau", "Không_có"]);

        write_record(&tmp.path().join("Đau"), "p1_seq001.json", &SampleRecord {
            gesture:   "Đau".into(),
            person_id: "person1".into(),
            sequences: vec![sequence_with_frames(T)],
        });

        let loaded = DatasetLoader::new(tmp.path(), spec()).load(&reg).unwrap();
        assert_eq!(loaded.per_gesture, vec![1, 0]);
    }

    #[test]
    fn test_empty_dataset_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let reg = registry(&["Đau"]);

        let err = DatasetLoader::new(tmp.path(), spec()).load(&reg).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::EmptyDataset)
        ));
    }
}
