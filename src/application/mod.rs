// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Each use case coordinates the other layers for one command.
// No model math and no printing happens here.

// The training workflow
pub mod train_use_case;

// Score a saved checkpoint
pub mod evaluate_use_case;

// Corpus and batching statistics
pub mod inspect_use_case;
