// ============================================================
// Layer 3 - Token Sequences
// ============================================================
// TokenSequence   - the flat ids of one corpus split, in file order
// BatchedSequence - the same ids laid out as (rows, 1, batch_size)
//
// A BatchedSequence is built by `data::batcher::batchify`. It is
// stored time-major so one row (one time step across every lane)
// is a contiguous slice:
//
//   flat:   [a0 a1 a2 | b0 b1 b2]      batch_size = 2, rows = 3
//   lanes:  lane 0 = a0 a1 a2, lane 1 = b0 b1 b2
//   rows:   [a0 b0] [a1 b1] [a2 b2]

use crate::domain::vocabulary::TokenId;

/// Ordered token ids for one corpus split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSequence {
    ids: Vec<TokenId>,
}

impl TokenSequence {
    pub fn new(ids: Vec<TokenId>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[TokenId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A TokenSequence arranged as `batch_size` lanes advancing in
/// lockstep. Shape is `(rows, 1, batch_size)`; the middle axis is a
/// single feature channel holding the token id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchedSequence {
    /// Time-major: `data[t * batch_size + lane]`
    data:       Vec<TokenId>,
    rows:       usize,
    batch_size: usize,
    /// Tail elements of the source that did not fill a full row
    dropped:    usize,
}

impl BatchedSequence {
    /// Assemble from time-major data. `data.len()` must equal
    /// `rows * batch_size`.
    pub(crate) fn from_time_major(
        data:       Vec<TokenId>,
        rows:       usize,
        batch_size: usize,
        dropped:    usize,
    ) -> Self {
        debug_assert_eq!(data.len(), rows * batch_size);
        Self { data, rows, batch_size, dropped }
    }

    /// An empty result for degenerate batch parameters.
    /// Every element of the source counts as dropped.
    pub(crate) fn empty(batch_size: usize, dropped: usize) -> Self {
        Self { data: Vec::new(), rows: 0, batch_size, dropped }
    }

    /// `(rows, 1, batch_size)`
    pub fn shape(&self) -> [usize; 3] {
        [self.rows, 1, self.batch_size]
    }

    /// Number of time steps
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of lanes
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// How many trailing source elements were discarded
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// True when there is no full row. Callers must check this
    /// before handing the batch to training.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Token id at time step `row` in lane `lane`
    pub fn get(&self, row: usize, lane: usize) -> Option<TokenId> {
        if row >= self.rows || lane >= self.batch_size {
            return None;
        }
        Some(self.data[row * self.batch_size + lane])
    }

    /// One time step across every lane, `None` past the last row
    pub fn row(&self, row: usize) -> Option<&[TokenId]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.batch_size;
        Some(&self.data[start..start + self.batch_size])
    }

    /// Ids of one lane between time steps `[start, end)`.
    /// `None` unless `lane` exists and `start <= end <= rows`.
    pub fn lane_slice(&self, lane: usize, start: usize, end: usize) -> Option<Vec<TokenId>> {
        if lane >= self.batch_size || start > end || end > self.rows {
            return None;
        }
        Some(
            (start..end)
                .map(|t| self.data[t * self.batch_size + lane])
                .collect(),
        )
    }

    /// Flat time-major view
    pub fn as_slice(&self) -> &[TokenId] {
        &self.data
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn two_lanes() -> BatchedSequence {
        // lanes: [0 1 2] and [3 4 5]
        BatchedSequence::from_time_major(vec![0, 3, 1, 4, 2, 5], 3, 2, 1)
    }

    #[test]
    fn test_shape_has_singleton_channel() {
        assert_eq!(two_lanes().shape(), [3, 1, 2]);
    }

    #[test]
    fn test_row_and_lane_access() {
        let b = two_lanes();
        assert_eq!(b.row(1), Some(&[1, 4][..]));
        assert_eq!(b.lane_slice(1, 0, 3), Some(vec![3, 4, 5]));
        assert_eq!(b.get(2, 0), Some(2));
        assert_eq!(b.get(3, 0), None);
        assert_eq!(b.get(0, 2), None);
    }

    #[test]
    fn test_out_of_range_access_is_none() {
        let b = two_lanes();
        assert_eq!(b.row(3), None);
        assert_eq!(b.lane_slice(2, 0, 1), None);
        assert_eq!(b.lane_slice(0, 0, 4), None);
        assert_eq!(b.lane_slice(0, 2, 1), None);
        assert_eq!(b.lane_slice(0, 3, 3), Some(vec![]));

        let empty = BatchedSequence::empty(8, 5);
        assert_eq!(empty.row(0), None);
        assert_eq!(empty.lane_slice(0, 0, 1), None);
    }

    #[test]
    fn test_empty_batch() {
        let b = BatchedSequence::empty(8, 5);
        assert!(b.is_empty());
        assert_eq!(b.shape(), [0, 1, 8]);
        assert_eq!(b.dropped(), 5);
        assert_eq!(b.get(0, 0), None);
    }
}
