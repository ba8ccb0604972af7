// ============================================================
// Layer 2 - Evaluate Use Case
// ============================================================
// Scores the latest checkpoint on the valid and test splits:
//   1. Read train_config.json for corpus layout and architecture
//   2. Reload the corpus and check its vocabulary against vocab.json
//   3. Rebuild the model, load weights, report loss / perplexity

use anyhow::Result;
use burn::prelude::Backend;

use crate::application::train_use_case::BatchedCorpus;
use crate::domain::traits::CorpusSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::perplexity, vocab_store::VocabStore};
use crate::ml::evaluator::{Evaluator, InferBackend};

/// Loss and perplexity of one split
#[derive(Debug, Clone, Copy)]
pub struct SplitScore {
    pub loss: f64,
    pub ppl:  f64,
}

impl SplitScore {
    fn from_loss(loss: f64) -> Self {
        Self { loss, ppl: perplexity(loss) }
    }
}

pub struct EvaluateUseCase {
    checkpoint_dir: String,
    /// Overrides the data directory stored in the config
    data_dir:       Option<String>,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: String, data_dir: Option<String>) -> Self {
        Self { checkpoint_dir, data_dir }
    }

    /// Score valid and test on the GPU
    pub fn execute(&self) -> Result<(SplitScore, SplitScore)> {
        self.execute_on::<InferBackend>(burn::backend::wgpu::WgpuDevice::default())
    }

    pub fn execute_on<B: Backend>(&self, device: B::Device) -> Result<(SplitScore, SplitScore)> {
        let ckpt = CheckpointManager::new(&self.checkpoint_dir);
        let mut cfg = ckpt.load_config()?;
        if let Some(dir) = &self.data_dir {
            cfg.data_dir = dir.clone();
        }

        let corpus = cfg.loader().load_corpus()?;
        VocabStore::new(&self.checkpoint_dir).verify(&corpus.vocab)?;

        let windows = BatchedCorpus::new(&corpus, cfg.batch_size, cfg.eval_batch_size)
            .windows(cfg.bptt);

        let evaluator = Evaluator::<B>::from_checkpoint(&ckpt, &cfg, corpus.ntokens(), device)?;
        let valid = SplitScore::from_loss(evaluator.loss(&windows.valid));
        let test  = SplitScore::from_loss(evaluator.loss(&windows.test));

        tracing::info!(
            "valid loss {:.4} (ppl {:.2}), test loss {:.4} (ppl {:.2})",
            valid.loss,
            valid.ppl,
            test.loss,
            test.ppl
        );
        Ok((valid, test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};
    use crate::domain::rnn_mode::RnnMode;
    use burn::backend::{Autodiff, NdArray};
    use std::path::Path;

    fn write_corpus(dir: &Path, valid: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join("ptb.train.txt"),
            "the cat sat on the mat\nthe dog sat on the log\n",
        )
        .unwrap();
        std::fs::write(dir.join("ptb.valid.txt"), valid).unwrap();
        std::fs::write(dir.join("ptb.test.txt"), "the dog sat on the mat\n").unwrap();
    }

    fn train(root: &Path) -> (String, f64) {
        let data = root.join("data");
        write_corpus(&data, "the cat sat on the log\n");
        let cfg = TrainConfig {
            data_dir:        data.to_string_lossy().to_string(),
            checkpoint_dir:  root.join("ckpt").to_string_lossy().to_string(),
            mode:            RnnMode::RnnTanh,
            batch_size:      2,
            eval_batch_size: 2,
            bptt:            3,
            epochs:          1,
            lr:              0.01,
            emsize:          8,
            nhid:            8,
            dropout:         0.0,
            log_interval:    0,
            ..TrainConfig::default()
        };
        let ckpt_dir = cfg.checkpoint_dir.clone();
        let report = TrainUseCase::new(cfg)
            .execute_on::<Autodiff<NdArray>>(Default::default())
            .unwrap();
        (ckpt_dir, report.test_loss)
    }

    #[test]
    fn test_scores_saved_checkpoint() {
        let root = tempfile::tempdir().unwrap();
        let (ckpt_dir, trained_test_loss) = train(root.path());

        let (valid, test) = EvaluateUseCase::new(ckpt_dir, None)
            .execute_on::<NdArray>(Default::default())
            .unwrap();

        assert!(valid.loss.is_finite());
        assert!((valid.ppl - valid.loss.exp()).abs() < 1e-9);
        // Checkpoints hold half-precision weights
        assert!(
            (test.loss - trained_test_loss).abs() < 1e-2,
            "evaluated {} vs trained {}",
            test.loss,
            trained_test_loss
        );
    }

    #[test]
    fn test_changed_corpus_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let (ckpt_dir, _) = train(root.path());

        // Same layout elsewhere, but valid introduces a new word
        let other = root.path().join("other");
        write_corpus(&other, "the bird sat on the log\n");

        let err = EvaluateUseCase::new(ckpt_dir, Some(other.to_string_lossy().to_string()))
            .execute_on::<NdArray>(Default::default())
            .unwrap_err();
        assert!(err.to_string().contains("vocabulary size changed"));
    }

    #[test]
    fn test_missing_config_fails() {
        let root = tempfile::tempdir().unwrap();
        let ckpt_dir = root.path().join("ckpt").to_string_lossy().to_string();
        let err = EvaluateUseCase::new(ckpt_dir, None)
            .execute_on::<NdArray>(Default::default())
            .unwrap_err();
        assert!(err.to_string().contains("train_config.json"));
    }
}
