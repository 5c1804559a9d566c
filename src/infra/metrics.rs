// ============================================================
// Layer 6 — Training History Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average cross-entropy loss on the train split
//   - train_acc:  fraction of train samples classified correctly
//   - val_loss:   average cross-entropy loss on the val split
//   - val_acc:    fraction of val samples classified correctly
//   - lr:         the learning rate after this epoch's decision
//
// Output file: <artifacts>/history.csv
//
// How to read the history:
//   - Loss should decrease each epoch (model is learning)
//   - If val_loss rises while train_loss falls → overfitting
//   - A step down in lr marks a detected validation plateau
//
// The CSV is the raw data behind the training-curve rendering,
// which is an external collaborator.
//
// Reference: Rust Book §9 (Error Handling), §12 (I/O)

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One row of metrics for a single training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:      usize,
    pub train_loss: f64,
    pub train_acc:  f64,
    pub val_loss:   f64,
    pub val_acc:    f64,
    pub lr:         f64,
}

impl EpochMetrics {
    /// Returns true if this epoch improved over the previous best val_loss.
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Appends epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("history.csv");

        // Write the header only if the file is new, so repeated
        // runs append to one continuous log
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,train_acc,val_loss,val_acc,lr")?;
            tracing::debug!("Created history CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:e}",
            m.epoch, m.train_loss, m.train_acc, m.val_loss, m.val_acc, m.lr,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics {
            epoch: 2,
            train_loss: 2.5,
            train_acc: 0.4,
            val_loss: 2.3,
            val_acc: 0.35,
            lr: 1e-3,
        };
        // 2.3 < 3.0 → this is an improvement
        assert!(m.is_improvement(3.0));
        // 2.3 is NOT less than 2.0 → not an improvement
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_appends_rows_under_header() {
        let tmp = TempDir::new().unwrap();
        let logger = MetricsLogger::new(tmp.path()).unwrap();

        for epoch in 1..=2 {
            logger
                .log(&EpochMetrics {
                    epoch,
                    train_loss: 1.0 / epoch as f64,
                    train_acc: 0.5,
                    val_loss: 1.1 / epoch as f64,
                    val_acc: 0.45,
                    lr: 1e-3,
                })
                .unwrap();
        }

        let contents = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,train_acc,val_loss,val_acc,lr");
        assert!(lines[1].starts_with("1,"));
        assert!(lines[2].starts_with("2,"));
    }
}
