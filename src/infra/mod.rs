// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by the application layer:
//
//   checkpoint.rs  - model weights (CompactRecorder) plus the
//                    TrainConfig as JSON
//
//   vocab_store.rs - the id-ordered vocabulary as JSON, checked
//                    against the corpus at evaluation time
//
//   metrics.rs     - per-epoch loss / perplexity CSV
//
// Reference: Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary persistence
pub mod vocab_store;

/// Training metrics CSV logger
pub mod metrics;
