// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// This is the heart of the application — pure Rust structs
// and enums that define the core concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO ML-specific code
//   - Only plain Rust structs, enums, and errors
//
// Why keep this layer pure?
//   - Easy to unit test (no GPU needed)
//   - Easy to understand (no framework noise)
//   - The same types flow through every other layer
//
// Think of this layer as the "dictionary" of the system —
// it defines what things ARE, not how they work.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The ordered gesture registry — single source of truth for label indices
pub mod registry;

// Landmark, frame, sequence and sample types
pub mod sample;

// The pipeline error taxonomy
pub mod error;
