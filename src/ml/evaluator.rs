// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Computes held-out metrics for a trained model: aggregate loss
// and accuracy, per-class precision/recall/F1, and the C×C
// confusion matrix (rows = true class, columns = predicted).
//
// The metric math is deliberately separated from the tensor
// code: ClassificationReport::from_predictions is a pure
// function over two label slices, so it is unit-testable with
// hand-checked numbers and reusable by any model.
//
// Deterministic by construction: the test loader does not
// shuffle and dropout is inactive outside training.
//
// Rendering (training curves, confusion heatmaps) is an external
// collaborator — this module only produces the metrics record it
// consumes.

use anyhow::Result;
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::SequenceBatcher, dataset::SequenceDataset};
use crate::domain::registry::GestureRegistry;
use crate::domain::sample::SequenceSpec;
use crate::ml::model::SequenceClassifier;

// ─── Pure metric computation ──────────────────────────────────────────────────

/// Per-class precision / recall / F1, plus the number of true
/// samples of that class in the evaluated set (support).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

/// Confusion-matrix-derived metrics over C classes.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    pub accuracy:  f64,
    pub per_class: Vec<ClassMetrics>,
    /// confusion[true_class][predicted_class] = count
    pub confusion: Vec<Vec<usize>>,
}

impl ClassificationReport {
    /// Build the report from parallel prediction / label slices.
    pub fn from_predictions(predictions: &[usize], labels: &[usize], num_classes: usize) -> Self {
        assert_eq!(
            predictions.len(),
            labels.len(),
            "predictions and labels must have same length"
        );

        let mut confusion = vec![vec![0usize; num_classes]; num_classes];
        for (&pred, &label) in predictions.iter().zip(labels.iter()) {
            confusion[label][pred] += 1;
        }

        let total = labels.len();
        let correct: usize = (0..num_classes).map(|c| confusion[c][c]).sum();
        let accuracy = if total > 0 { correct as f64 / total as f64 } else { 0.0 };

        let per_class = (0..num_classes)
            .map(|c| {
                let tp = confusion[c][c];
                // Column sum = everything predicted as class c
                let predicted: usize = (0..num_classes).map(|r| confusion[r][c]).sum();
                // Row sum = everything truly of class c
                let support: usize = confusion[c].iter().sum();

                let precision = if predicted > 0 { tp as f64 / predicted as f64 } else { 0.0 };
                let recall = if support > 0 { tp as f64 / support as f64 } else { 0.0 };
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics { precision, recall, f1, support }
            })
            .collect();

        Self { accuracy, per_class, confusion }
    }
}

// ─── Evaluation record (persisted artifact) ───────────────────────────────────

/// One gesture's row in the evaluation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureReport {
    pub gesture:   String,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

/// The full held-out evaluation, written to evaluation.json and
/// consumed by the external rendering collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub loss:             f64,
    pub accuracy:         f64,
    pub gestures:         Vec<String>,
    pub per_class:        Vec<GestureReport>,
    pub confusion_matrix: Vec<Vec<usize>>,
}

// ─── Model evaluation ─────────────────────────────────────────────────────────

/// Run the trained model over the test split and assemble the
/// evaluation record. Deterministic for fixed weights and a
/// fixed, ordered split.
pub fn evaluate_model<B: Backend>(
    model:        &SequenceClassifier<B>,
    test_dataset: SequenceDataset,
    spec:         SequenceSpec,
    registry:     &GestureRegistry,
    batch_size:   usize,
    device:       &B::Device,
) -> Result<EvaluationRecord> {
    let batcher = SequenceBatcher::<B>::new(device.clone(), spec);
    // No shuffle: sample order, and therefore the aggregate loss,
    // is reproducible
    let loader = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .num_workers(1)
        .build(test_dataset);

    let mut predictions: Vec<usize> = Vec::new();
    let mut truths: Vec<usize> = Vec::new();
    let mut loss_sum = 0.0f64;
    let mut batches = 0usize;

    for batch in loader.iter() {
        let logits = model.forward(batch.sequences);

        let ce = burn::nn::loss::CrossEntropyLossConfig::new().init(&logits.device());
        loss_sum += ce
            .forward(logits.clone(), batch.labels.clone())
            .into_scalar()
            .elem::<f64>();
        batches += 1;

        // Predicted class = argmax over the output distribution.
        // Softmax is monotonic, so argmax over logits is identical.
        // iter::<i64>() converts from the backend's IntElem.
        let preds_data = logits
            .argmax(1)
            .flatten::<1>(0, 1)
            .into_data();
        let preds = preds_data.iter::<i64>();
        let labels_data = batch.labels.into_data();
        let labels = labels_data.iter::<i64>();

        predictions.extend(preds.map(|p| p as usize));
        truths.extend(labels.map(|l| l as usize));
    }

    let loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
    let report = ClassificationReport::from_predictions(&predictions, &truths, registry.len());

    tracing::info!(
        "Test evaluation: loss={:.4}, accuracy={:.2}% over {} samples",
        loss,
        report.accuracy * 100.0,
        truths.len(),
    );

    let per_class = report
        .per_class
        .iter()
        .enumerate()
        .map(|(i, m)| GestureReport {
            gesture:   registry.name_of(i).unwrap_or("?").to_string(),
            precision: m.precision,
            recall:    m.recall,
            f1:        m.f1,
            support:   m.support,
        })
        .collect();

    Ok(EvaluationRecord {
        loss,
        accuracy: report.accuracy,
        gestures: registry.names().to_vec(),
        per_class,
        confusion_matrix: report.confusion,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let labels = vec![0, 1, 2, 0, 1, 2];
        let report = ClassificationReport::from_predictions(&labels, &labels, 3);

        assert!((report.accuracy - 1.0).abs() < 1e-9);
        for m in &report.per_class {
            assert!((m.precision - 1.0).abs() < 1e-9);
            assert!((m.recall - 1.0).abs() < 1e-9);
            assert!((m.f1 - 1.0).abs() < 1e-9);
            assert_eq!(m.support, 2);
        }
        // Only the diagonal is populated
        for (r, row) in report.confusion.iter().enumerate() {
            for (c, &count) in row.iter().enumerate() {
                assert_eq!(count, if r == c { 2 } else { 0 });
            }
        }
    }

    #[test]
    fn test_confusion_matrix_counts() {
        // true:      0  0  1  1  2  2
        // predicted: 0  1  1  1  0  2
        let truths = vec![0, 0, 1, 1, 2, 2];
        let preds = vec![0, 1, 1, 1, 0, 2];
        let report = ClassificationReport::from_predictions(&preds, &truths, 3);

        assert_eq!(report.confusion[0], vec![1, 1, 0]);
        assert_eq!(report.confusion[1], vec![0, 2, 0]);
        assert_eq!(report.confusion[2], vec![1, 0, 1]);
        assert!((report.accuracy - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_per_class_precision_and_recall() {
        let truths = vec![0, 0, 1, 1, 2, 2];
        let preds = vec![0, 1, 1, 1, 0, 2];
        let report = ClassificationReport::from_predictions(&preds, &truths, 3);

        // Class 0: predicted twice, one correct; two true samples
        assert!((report.per_class[0].precision - 0.5).abs() < 1e-9);
        assert!((report.per_class[0].recall - 0.5).abs() < 1e-9);

        // Class 1: predicted three times, two correct; recall perfect
        assert!((report.per_class[1].precision - 2.0 / 3.0).abs() < 1e-9);
        assert!((report.per_class[1].recall - 1.0).abs() < 1e-9);
        assert!((report.per_class[1].f1 - 0.8).abs() < 1e-9);

        // Class 2: predicted once, correct; one of two trues found
        assert!((report.per_class[2].precision - 1.0).abs() < 1e-9);
        assert!((report.per_class[2].recall - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_class_never_predicted_gets_zero_precision() {
        let truths = vec![0, 1];
        let preds = vec![0, 0];
        let report = ClassificationReport::from_predictions(&preds, &truths, 2);

        assert!((report.per_class[1].precision).abs() < 1e-9);
        assert!((report.per_class[1].recall).abs() < 1e-9);
        assert!((report.per_class[1].f1).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_for_fixed_inputs() {
        let truths = vec![0, 1, 2, 1, 0, 2, 1];
        let preds = vec![0, 1, 1, 1, 2, 2, 0];
        let a = ClassificationReport::from_predictions(&preds, &truths, 3);
        let b = ClassificationReport::from_predictions(&preds, &truths, 3);
        assert_eq!(a.confusion, b.confusion);
        assert!((a.accuracy - b.accuracy).abs() < 1e-12);
    }
}
