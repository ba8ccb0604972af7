// ============================================================
// Layer 4 - Batcher
// ============================================================
// Two steps turn a flat split into tensors:
//
// 1. batchify: TokenSequence -> BatchedSequence (pure)
//
//      rows = len / batch_size          (floor)
//      keep the first rows * batch_size ids, DROP the rest
//      lane l = ids[l*rows .. (l+1)*rows]
//      shape  = (rows, 1, batch_size)
//
//    Example, len = 10, batch_size = 3:
//      rows = 3, id 9 is dropped
//      lane 0 = 0 1 2, lane 1 = 3 4 5, lane 2 = 6 7 8
//      row 0 = [0 3 6], row 1 = [1 4 7], row 2 = [2 5 8]
//
//    The truncation is lossy on purpose: downstream windows expect
//    exactly rows * batch_size ids. The dropped count is kept on
//    the result and logged.
//
// 2. LmBatcher: Vec<LmSample> -> LmBatch<B> (burn Batcher trait),
//    stacking equal-length lane windows into [n, seq_len] tensors.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::LmSample;
use crate::domain::sequence::{BatchedSequence, TokenSequence};

/// Arrange `sequence` into `batch_size` lockstep lanes.
///
/// `batch_size == 0` or `batch_size > sequence.len()` gives an empty
/// result (`is_empty()`), never an out-of-bounds read.
pub fn batchify(sequence: &TokenSequence, batch_size: usize) -> BatchedSequence {
    let ids = sequence.ids();
    let rows = if batch_size == 0 { 0 } else { ids.len() / batch_size };

    if rows == 0 {
        tracing::debug!(
            "batchify: {} tokens cannot fill one row of {} lanes",
            ids.len(),
            batch_size
        );
        return BatchedSequence::empty(batch_size, ids.len());
    }

    let kept    = rows * batch_size;
    let dropped = ids.len() - kept;

    // Transpose lane-major [batch_size, rows] into time-major [rows, batch_size]
    let mut data = Vec::with_capacity(kept);
    for t in 0..rows {
        for lane in 0..batch_size {
            data.push(ids[lane * rows + t]);
        }
    }

    if dropped > 0 {
        tracing::debug!("batchify: dropped {} trailing tokens", dropped);
    }
    BatchedSequence::from_time_major(data, rows, batch_size, dropped)
}

// ─── LmBatch ──────────────────────────────────────────────────────────────────
/// One BPTT window across lanes, ready for the forward pass.
#[derive(Debug, Clone)]
pub struct LmBatch<B: Backend> {
    /// Token ids - shape: [lanes, seq_len]
    pub inputs: Tensor<B, 2, Int>,

    /// Next-token ids - shape: [lanes, seq_len]
    pub targets: Tensor<B, 2, Int>,
}

// ─── LmBatcher ────────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created where the model lives.
#[derive(Clone, Debug)]
pub struct LmBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> LmBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<LmSample, LmBatch<B>> for LmBatcher<B> {
    /// Flatten every sample's ids, build a 1D tensor, then reshape to
    /// [n, seq_len]. Samples in one loader batch come from the same
    /// window so they share a length.
    fn batch(&self, items: Vec<LmSample>) -> LmBatch<B> {
        let n       = items.len();
        let seq_len = items.first().map(|s| s.input_ids.len()).unwrap_or(0);

        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i32))
            .collect();

        let target_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.target_ids.iter().map(|&x| x as i32))
            .collect();

        let inputs = Tensor::<B, 1, Int>::from_ints(input_flat.as_slice(), &self.device)
            .reshape([n, seq_len]);

        let targets = Tensor::<B, 1, Int>::from_ints(target_flat.as_slice(), &self.device)
            .reshape([n, seq_len]);

        LmBatch { inputs, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn seq(n: u32) -> TokenSequence {
        TokenSequence::new((0..n).collect())
    }

    #[test]
    fn test_hundred_tokens_thirty_two_lanes() {
        let b = batchify(&seq(100), 32);
        assert_eq!(b.rows(), 3);
        assert_eq!(b.shape(), [3, 1, 32]);
        assert_eq!(b.as_slice().len(), 96);
        assert_eq!(b.dropped(), 4);

        // ids 96..100 are the discarded tail
        for gone in 96..100 {
            assert!(!b.as_slice().contains(&gone));
        }
        // every kept id appears exactly once
        let mut all = b.as_slice().to_vec();
        all.sort();
        assert_eq!(all, (0..96).collect::<Vec<u32>>());
    }

    #[test]
    fn test_lanes_are_contiguous_slices() {
        let b = batchify(&seq(10), 3);
        assert_eq!(b.row(0), Some(&[0, 3, 6][..]));
        assert_eq!(b.row(2), Some(&[2, 5, 8][..]));
        assert_eq!(b.lane_slice(1, 0, 3), Some(vec![3, 4, 5]));
        assert_eq!(b.dropped(), 1);
    }

    #[test]
    fn test_zero_batch_size_is_empty() {
        let b = batchify(&seq(10), 0);
        assert!(b.is_empty());
        assert_eq!(b.dropped(), 10);
    }

    #[test]
    fn test_batch_larger_than_sequence_is_empty() {
        let b = batchify(&seq(5), 6);
        assert!(b.is_empty());
        assert_eq!(b.shape(), [0, 1, 6]);
    }

    #[test]
    fn test_exact_fit_drops_nothing() {
        let b = batchify(&seq(12), 4);
        assert_eq!(b.shape(), [3, 1, 4]);
        assert_eq!(b.dropped(), 0);
    }

    #[test]
    fn test_lm_batcher_shapes() {
        let device = Default::default();
        let batcher = LmBatcher::<NdArray>::new(device);
        let items = vec![
            LmSample { input_ids: vec![1, 2, 3], target_ids: vec![2, 3, 4] },
            LmSample { input_ids: vec![5, 6, 7], target_ids: vec![6, 7, 8] },
        ];
        let batch = batcher.batch(items);
        assert_eq!(batch.inputs.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2, 3]);

        let targets: Vec<i64> = batch
            .targets
            .into_data()
            .iter::<i64>()
            .collect();
        assert_eq!(targets, vec![2, 3, 4, 6, 7, 8]);
    }
}
