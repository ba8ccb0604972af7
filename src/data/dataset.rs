// ============================================================
// Layer 4 - BPTT Dataset
// ============================================================
// Cuts a BatchedSequence along the time axis into truncated
// backpropagation-through-time windows:
//
//   rows:     r0 r1 r2 r3 r4 r5          bptt = 2
//   inputs:  [r0 r1] [r2 r3] [r4]
//   targets: [r1 r2] [r3 r4] [r5]
//
// Each lane of a window is one LmSample. Samples are stored
// window-major, so Burn's DataLoader with batch_size = lanes and
// no shuffle hands out whole windows in time order.

use burn::data::dataset::Dataset;

use crate::domain::{sequence::BatchedSequence, vocabulary::TokenId};

/// One lane of one BPTT window. `target_ids[k]` is the token that
/// follows `input_ids[k]` in the same lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LmSample {
    pub input_ids:  Vec<TokenId>,
    pub target_ids: Vec<TokenId>,
}

/// BPTT windows over a BatchedSequence, stored window-major then
/// lane-major. A DataLoader with `batch_size == lanes` and no
/// shuffling therefore yields one whole window per batch, in time
/// order.
pub struct LmDataset {
    samples: Vec<LmSample>,
    lanes:   usize,
}

impl LmDataset {
    /// Cut `batched` into windows of at most `bptt` time steps.
    ///
    /// The window starting at row `t` covers `n = min(bptt, rows - 1 - t)`
    /// steps: inputs are rows `[t, t+n)`, targets rows `[t+1, t+1+n)`.
    /// The last row is never an input since it has no successor.
    pub fn from_batched(batched: &BatchedSequence, bptt: usize) -> Self {
        let lanes = batched.batch_size();
        let rows  = batched.rows();
        let mut samples = Vec::new();

        if bptt > 0 && rows >= 2 {
            for start in (0..rows - 1).step_by(bptt) {
                let n = bptt.min(rows - 1 - start);
                for lane in 0..lanes {
                    // start + 1 + n <= rows, so both slices are in range
                    if let (Some(input_ids), Some(target_ids)) = (
                        batched.lane_slice(lane, start, start + n),
                        batched.lane_slice(lane, start + 1, start + 1 + n),
                    ) {
                        samples.push(LmSample { input_ids, target_ids });
                    }
                }
            }
        }

        Self { samples, lanes }
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Number of BPTT windows
    pub fn window_count(&self) -> usize {
        if self.lanes == 0 { 0 } else { self.samples.len() / self.lanes }
    }

    /// All lane samples of window `index`, in lane order
    pub fn window(&self, index: usize) -> Vec<LmSample> {
        let start = (index * self.lanes).min(self.samples.len());
        let end   = (start + self.lanes).min(self.samples.len());
        self.samples[start..end].to_vec()
    }
}

impl Dataset<LmSample> for LmDataset {
    fn get(&self, index: usize) -> Option<LmSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
