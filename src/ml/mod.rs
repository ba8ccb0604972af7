// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn model and optimiser code lives here. Burn supplies the
// recurrent kernels, autodiff, loss and Adam; this layer only
// wires them together.
//
//   model.rs     - embedding → one recurrent layer (RNN relu/tanh,
//                  LSTM or GRU) → tanh dense projection to
//                  vocabulary logits
//
//   trainer.rs   - epoch loop over BPTT windows, validation,
//                  checkpoints, final test score
//
//   evaluator.rs - reloads a checkpoint and scores a split
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Recurrent language model architecture
pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Checkpoint evaluation
pub mod evaluator;
