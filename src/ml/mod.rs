// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly except the thin
// Dataset/Batcher plumbing in Layer 4.
//
// What's in this layer:
//
//   model.rs     — The recurrent classifier architecture
//                  LSTM(128, full sequence) → LayerNorm → Dropout(0.3)
//                  LSTM(64, last step)      → LayerNorm → Dropout(0.3)
//                  Linear(64) + ReLU        → Dropout(0.2)
//                  Linear(C) logits, cross-entropy vs integer labels
//
//   trainer.rs   — The epoch-driven training loop
//                  Mini-batches of 32 with Adam, plus a pure
//                  TrainController state machine handling early
//                  stopping (patience 20), learning-rate halving
//                  (patience 7, floor 1e-7), the 100-epoch cap,
//                  and best-snapshot tracking by val accuracy
//
//   evaluator.rs — Held-out evaluation
//                  Aggregate loss/accuracy, per-class
//                  precision/recall/F1, C×C confusion matrix
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Hochreiter & Schmidhuber (1997) LSTM
//            Kingma & Ba (2015) Adam

/// Recurrent sequence classifier architecture
pub mod model;

/// Epoch training loop with adaptive control
pub mod trainer;

/// Held-out metrics and confusion statistics
pub mod evaluator;
