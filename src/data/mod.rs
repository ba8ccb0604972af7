// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything from plain-text split files to tensor batches.
//
//   ptb.train.txt / ptb.valid.txt / ptb.test.txt
//       │
//       ▼
//   CorpusLoader   → whitespace tokens + <eos>, shared vocabulary
//       │
//       ▼
//   batchify       → (rows, 1, batch_size) lanes, tail dropped
//       │
//       ▼
//   LmDataset      → BPTT windows, one sample per lane
//       │
//       ▼
//   LmBatcher      → [lanes, seq_len] input / target tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads split files and builds token id sequences
pub mod loader;

/// batchify plus Burn's Batcher trait for LM windows
pub mod batcher;

/// BPTT window dataset
pub mod dataset;
