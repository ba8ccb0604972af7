// ============================================================
// Layer 2 - Inspect Use Case
// ============================================================
// Loads and batches the corpus without building a model, so the
// vocabulary size and how much each split loses to batchify can
// be checked before a long training run.

use std::path::PathBuf;

use anyhow::Result;

use crate::data::{batcher::batchify, loader::CorpusLoader};
use crate::domain::{corpus::Split, traits::CorpusSource};

/// Per-split numbers for one batch size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitStats {
    pub split:   Split,
    pub tokens:  usize,
    pub shape:   [usize; 3],
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusStats {
    pub vocab_size: usize,
    pub splits:     Vec<SplitStats>,
}

pub struct InspectUseCase {
    loader:     CorpusLoader,
    batch_size: usize,
}

impl InspectUseCase {
    pub fn new(data_dir: impl Into<PathBuf>, prefix: &str, eos: &str, batch_size: usize) -> Self {
        Self {
            loader: CorpusLoader::new(data_dir, prefix).with_eos(eos),
            batch_size,
        }
    }

    pub fn execute(&self) -> Result<CorpusStats> {
        let corpus = self.loader.load_corpus()?;

        let splits = Split::ALL
            .iter()
            .map(|&split| {
                let seq = corpus.split(split);
                let batched = batchify(seq, self.batch_size);
                if batched.is_empty() {
                    tracing::warn!(
                        "{} split ({} tokens) is empty at batch_size {}",
                        split,
                        seq.len(),
                        self.batch_size
                    );
                }
                SplitStats {
                    split,
                    tokens:  seq.len(),
                    shape:   batched.shape(),
                    dropped: batched.dropped(),
                }
            })
            .collect();

        Ok(CorpusStats { vocab_size: corpus.ntokens(), splits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_for_small_corpus() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ptb.train.txt"), "a b\nc\n\n").unwrap();
        std::fs::write(dir.path().join("ptb.valid.txt"), "a d\n").unwrap();
        std::fs::write(dir.path().join("ptb.test.txt"), "\n").unwrap();

        let stats = InspectUseCase::new(dir.path(), "ptb.", "<eos>", 4)
            .execute()
            .unwrap();

        // a b <eos> c d
        assert_eq!(stats.vocab_size, 5);
        assert_eq!(
            stats.splits[0],
            SplitStats { split: Split::Train, tokens: 6, shape: [1, 1, 4], dropped: 2 }
        );
        assert_eq!(stats.splits[1].shape, [0, 1, 4]);
        assert_eq!(stats.splits[2].tokens, 1);
    }
}
