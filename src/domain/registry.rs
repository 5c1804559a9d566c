// ============================================================
// Layer 3 — Gesture Registry
// ============================================================
// An immutable, ordered list of gesture names. This is the
// single source of truth for label indices across the whole
// pipeline:
//   - the DatasetLoader scans gesture directories in this order
//   - the classifier's output width equals registry.len()
//   - the exported labels.json map is built from this order
//
// Why immutable?
//   Previously trained artifacts encode labels as indices into
//   this list. If an index ever changed meaning, an old model
//   would silently predict the wrong gesture. Appending a new
//   gesture therefore produces a NEW registry value and never
//   touches the existing entries.
//
// Reference: Rust Book §5 (Structs), §8 (Collections)

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;

/// The ordered set of gesture names known to the pipeline.
/// Label index `i` always means `names[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureRegistry {
    names: Vec<String>,
}

impl GestureRegistry {
    /// Build a registry from an ordered list of names.
    /// Empty lists and duplicate names are rejected — a duplicate
    /// would break the index↔name bijection.
    pub fn new(names: Vec<String>) -> Result<Self, PipelineError> {
        if names.is_empty() {
            return Err(PipelineError::EmptyRegistry);
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(PipelineError::DuplicateGesture(name.clone()));
            }
        }
        Ok(Self { names })
    }

    /// Load a registry from a JSON file containing an ordered
    /// array of gesture names, e.g. `["Đau", "Bác_sĩ", "Thuốc"]`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read gesture registry '{}'", path.display()))?;
        let names: Vec<String> = serde_json::from_str(&json)
            .with_context(|| format!("Registry '{}' is not a JSON array of strings", path.display()))?;
        Ok(Self::new(names)?)
    }

    /// Number of gesture classes `C`.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All names in label-index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The label index for a gesture name, if registered.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// The gesture name for a label index, if in range.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Pure append: returns a NEW registry with `name` assigned
    /// the next free index. Every existing index is unchanged,
    /// which keeps previously trained artifacts valid.
    pub fn with_appended(&self, name: impl Into<String>) -> Result<Self, PipelineError> {
        let name = name.into();
        let mut names = self.names.clone();
        names.push(name);
        Self::new(names)
    }

    /// The exported label-index map (index → name), a bijection
    /// over `0..C-1`. Persisted as labels.json and consumed by
    /// the inference boundary.
    pub fn label_map(&self) -> BTreeMap<usize, String> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (i, n.clone()))
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> GestureRegistry {
        GestureRegistry::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_rejects_empty_registry() {
        let err = GestureRegistry::new(Vec::new()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyRegistry));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = GestureRegistry::new(vec!["Thuốc".into(), "Thuốc".into()]).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateGesture(_)));
    }

    #[test]
    fn test_label_map_is_a_bijection() {
        let reg = registry(&["Đau", "Bác_sĩ", "Cần_giúp", "Thuốc", "Cảm_ơn"]);
        let map = reg.label_map();

        // Contiguous indices 0..C-1, each mapping back to its name
        assert_eq!(map.len(), reg.len());
        for i in 0..reg.len() {
            assert_eq!(map[&i], reg.names()[i]);
            assert_eq!(reg.index_of(&map[&i]), Some(i));
        }
    }

    #[test]
    fn test_append_preserves_existing_indices() {
        let reg = registry(&["Đau", "Bác_sĩ", "Thuốc"]);
        let extended = reg.with_appended("Tạm_biệt").unwrap();

        for (i, name) in reg.names().iter().enumerate() {
            assert_eq!(extended.index_of(name), Some(i));
        }
        assert_eq!(extended.index_of("Tạm_biệt"), Some(3));
        // The original registry value is untouched
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_append_rejects_existing_name() {
        let reg = registry(&["Đau", "Thuốc"]);
        assert!(reg.with_appended("Thuốc").is_err());
    }
}
