// ============================================================
// Layer 5 - Evaluator
// ============================================================
// Rebuilds the model from a saved checkpoint and scores a split.
use anyhow::Result;
use burn::prelude::*;

use crate::application::train_use_case::TrainConfig;
use crate::data::dataset::LmDataset;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    model::{RnnLm, RnnLmConfig},
    trainer::evaluate,
};

/// Backend used by the `evaluate` command
pub type InferBackend = burn::backend::Wgpu;

pub struct Evaluator<B: Backend> {
    model:  RnnLm<B>,
    device: B::Device,
}

impl<B: Backend> Evaluator<B> {
    /// `ntokens` must be the vocabulary size the checkpoint was
    /// trained with; `EvaluateUseCase` checks it against vocab.json.
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        cfg:          &TrainConfig,
        ntokens:      usize,
        device:       B::Device,
    ) -> Result<Self> {
        // Dropout is irrelevant at evaluation time
        let model_cfg = RnnLmConfig::new(ntokens, cfg.emsize, cfg.nhid, cfg.mode, 0.0);
        let model: RnnLm<B> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint ({} mode)", cfg.mode);
        Ok(Self { model, device })
    }

    /// Mean cross-entropy loss over every window of `dataset`
    pub fn loss(&self, dataset: &LmDataset) -> f64 {
        evaluate(&self.model, dataset, self.device.clone())
    }
}
