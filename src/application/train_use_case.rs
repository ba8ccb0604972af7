// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load train/valid/test, one shared vocabulary (Layer 4)
//   Step 2: batchify each split                             (Layer 4)
//   Step 3: Cut batched splits into BPTT windows            (Layer 4)
//   Step 4: Save config + vocabulary                        (Layer 6)
//   Step 5: Fit, validate, checkpoint, score test           (Layer 5)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::data::{batcher::batchify, dataset::LmDataset, loader::CorpusLoader};
use crate::domain::{
    corpus::{Corpus, Split, DEFAULT_EOS},
    rnn_mode::RnnMode,
    sequence::BatchedSequence,
    traits::CorpusSource,
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger, vocab_store::VocabStore};
use crate::ml::trainer::{train_loop, LmSplits, TrainBackend, TrainReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// Serialisable so `evaluate` can rebuild the same corpus layout and
// model architecture from train_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:        String,
    /// Split file prefix, e.g. "ptb." for ptb.train.txt
    pub prefix:          String,
    pub checkpoint_dir:  String,
    pub mode:            RnnMode,
    /// Lanes for the train split
    pub batch_size:      usize,
    /// Lanes for the valid and test splits
    pub eval_batch_size: usize,
    /// Time steps per BPTT window
    pub bptt:            usize,
    pub epochs:          usize,
    pub lr:              f64,
    /// Gradient norm clipping threshold
    pub clip:            f64,
    pub emsize:          usize,
    pub nhid:            usize,
    pub dropout:         f64,
    pub eos:             String,
    /// Log running train loss every N windows, 0 disables
    pub log_interval:    usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:        "data".to_string(),
            prefix:          "ptb.".to_string(),
            checkpoint_dir:  "checkpoints".to_string(),
            mode:            RnnMode::RnnRelu,
            batch_size:      32,
            eval_batch_size: 10,
            bptt:            5,
            epochs:          1,
            lr:              1e-3,
            clip:            0.2,
            emsize:          100,
            nhid:            100,
            dropout:         0.2,
            eos:             DEFAULT_EOS.to_string(),
            log_interval:    500,
        }
    }
}

impl TrainConfig {
    pub fn loader(&self) -> CorpusLoader {
        CorpusLoader::new(&self.data_dir, self.prefix.clone()).with_eos(self.eos.clone())
    }
}

// ─── Batched corpus ───────────────────────────────────────────────────────────
/// The three splits after batchify. Train uses `batch_size` lanes,
/// valid and test use `eval_batch_size`.
#[derive(Debug, Clone)]
pub struct BatchedCorpus {
    pub train: BatchedSequence,
    pub valid: BatchedSequence,
    pub test:  BatchedSequence,
}

impl BatchedCorpus {
    pub fn new(corpus: &Corpus, batch_size: usize, eval_batch_size: usize) -> Self {
        let batched = Self {
            train: batchify(&corpus.train, batch_size),
            valid: batchify(&corpus.valid, eval_batch_size),
            test:  batchify(&corpus.test, eval_batch_size),
        };
        for split in Split::ALL {
            let b = batched.split(split);
            let [rows, channels, lanes] = b.shape();
            tracing::info!(
                "{} batched to ({}, {}, {}), {} trailing tokens dropped",
                split,
                rows,
                channels,
                lanes,
                b.dropped()
            );
        }
        batched
    }

    pub fn split(&self, split: Split) -> &BatchedSequence {
        match split {
            Split::Train => &self.train,
            Split::Valid => &self.valid,
            Split::Test  => &self.test,
        }
    }

    /// BPTT windows for each split
    pub fn windows(&self, bptt: usize) -> LmSplits {
        LmSplits {
            train: LmDataset::from_batched(&self.train, bptt),
            valid: LmDataset::from_batched(&self.valid, bptt),
            test:  LmDataset::from_batched(&self.test, bptt),
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end on the GPU
    pub fn execute(&self) -> Result<TrainReport> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.execute_on::<TrainBackend>(device)
    }

    /// The same pipeline on any autodiff backend
    pub fn execute_on<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Load corpus ───────────────────────────────────────────────
        tracing::info!("Loading corpus from '{}' ({}*.txt)", cfg.data_dir, cfg.prefix);
        let corpus = cfg.loader().load_corpus()?;
        tracing::info!("Vocabulary size: {}", corpus.ntokens());

        // ── Step 2: batchify ──────────────────────────────────────────────────
        let batched = BatchedCorpus::new(&corpus, cfg.batch_size, cfg.eval_batch_size);
        if batched.train.is_empty() {
            bail!(
                "train split has {} tokens, too few for batch_size {}",
                corpus.train.len(),
                cfg.batch_size
            );
        }

        // ── Step 3: BPTT windows ──────────────────────────────────────────────
        let splits = batched.windows(cfg.bptt);
        tracing::info!(
            "Windows: {} train, {} valid, {} test",
            splits.train.window_count(),
            splits.valid.window_count(),
            splits.test.window_count()
        );

        // ── Step 4: Persist config and vocabulary ─────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        VocabStore::new(&cfg.checkpoint_dir).save(&corpus.vocab)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 5: Fit (Layer 5) ─────────────────────────────────────────────
        train_loop::<B>(cfg, corpus.ntokens(), splits, &ckpt_manager, &metrics, device)
    }
}
