// ============================================================
// Layer 3 — Sample Types
// ============================================================
// Types describing one recorded gesture performance, from the
// on-disk JSON record down to the flattened training sample.
//
// The on-disk record format (one file per performance):
//
//   {
//     "gesture": "Đau",
//     "person_id": "person1",
//     "sequences": [
//       {
//         "frames": [
//           { "landmarks": [ {"x": 0.5, "y": 0.3, "z": -0.02}, ... ] },
//           ...
//         ]
//       }
//     ]
//   }
//
// A frame carries exactly L landmarks (21 for single-hand mode,
// 42 for dual-hand), and a valid sequence carries exactly T
// frames. Each frame is flattened to a D = L*3 feature vector,
// so one sample is a [T, D] matrix stored row-major.
//
// Reference: Rust Book §5 (Structs), serde documentation
//            MediaPipe Hands (21 landmarks per hand)

use serde::{Deserialize, Serialize};

/// One tracked keypoint with normalised coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One frame of a recording: an ordered list of landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub landmarks: Vec<LandmarkPoint>,
}

/// One embedded sequence: an ordered list of frames.
/// Extra fields such as `duration_ms` are ignored on parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub frames: Vec<FrameRecord>,
}

/// One sample record file, as produced by the upstream capture
/// tooling. A single file may embed several sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub gesture:   String,
    pub person_id: String,
    pub sequences: Vec<SequenceRecord>,
}

/// Whether recordings track one hand or both.
/// Fixed for an entire dataset — mixing modes would change the
/// feature width mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandMode {
    Single,
    Dual,
}

impl HandMode {
    /// Landmarks per frame `L`.
    pub fn landmarks_per_frame(&self) -> usize {
        match self {
            HandMode::Single => 21,
            HandMode::Dual   => 42,
        }
    }
}

/// Shape constants fixed for a whole run: `T` frames per
/// sequence and the hand mode that determines `L` and `D`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SequenceSpec {
    pub frames_per_sequence: usize,
    pub hand_mode:           HandMode,
}

impl SequenceSpec {
    /// Flattened feature width `D = L * 3` (x, y, z per landmark).
    pub fn feature_width(&self) -> usize {
        self.hand_mode.landmarks_per_frame() * 3
    }

    /// Total values in one flattened sample: `T * D`.
    pub fn values_per_sample(&self) -> usize {
        self.frames_per_sequence * self.feature_width()
    }
}

impl Default for SequenceSpec {
    fn default() -> Self {
        Self {
            frames_per_sequence: 30,
            hand_mode:           HandMode::Single,
        }
    }
}

/// One accepted, flattened training sample.
///
/// `features` holds the `[T, D]` matrix row-major (frame 0 first).
/// `derived` marks samples synthesised by augmentation — this is
/// provenance only and has no effect on training treatment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureSample {
    pub features:  Vec<f32>,
    pub label:     usize,
    pub person_id: String,
    pub derived:   bool,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_mode_widths() {
        assert_eq!(HandMode::Single.landmarks_per_frame(), 21);
        assert_eq!(HandMode::Dual.landmarks_per_frame(), 42);

        let spec = SequenceSpec::default();
        assert_eq!(spec.feature_width(), 63);
        assert_eq!(spec.values_per_sample(), 30 * 63);
    }

    #[test]
    fn test_sample_record_parses_capture_schema() {
        // Mirrors the upstream capture format, including the
        // duration_ms field we do not model.
        let json = r#"{
            "gesture": "Đau",
            "person_id": "person1",
            "sequences": [
                {
                    "frames": [
                        { "landmarks": [ {"x": 0.5, "y": 0.3, "z": -0.02} ] }
                    ],
                    "duration_ms": 1000
                }
            ]
        }"#;

        let record: SampleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.gesture, "Đau");
        assert_eq!(record.sequences.len(), 1);
        assert_eq!(record.sequences[0].frames[0].landmarks.len(), 1);
        assert!((record.sequences[0].frames[0].landmarks[0].x - 0.5).abs() < 1e-6);
    }
}
