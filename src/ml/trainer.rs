// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
// Per epoch:
//   1. one pass over every train BPTT window (forward, loss,
//      backward, clipped Adam step)
//   2. mean loss on the valid split with the inner backend
//   3. checkpoint + metrics CSV row
// After the last epoch the test split is scored once.
//
// Loaders use batch_size = number of lanes and no shuffling, so
// each batch is one window across all lanes, in time order.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::dataloader::{batcher::Batcher, DataLoaderBuilder},
    grad_clipping::GradientClippingConfig,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::LmBatcher, dataset::LmDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::{RnnLm, RnnLmConfig};

/// Backend used by the `train` command
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Train / valid / test windows handed to the loop
pub struct LmSplits {
    pub train: LmDataset,
    pub valid: LmDataset,
    pub test:  LmDataset,
}

/// Final numbers of a training run
#[derive(Debug, Clone, Copy)]
pub struct TrainReport {
    pub last_train_loss: f64,
    pub best_val_loss:   f64,
    pub test_loss:       f64,
}

/// Fit a fresh model on `splits.train` for `cfg.epochs` epochs, then
/// score `splits.test`.
pub fn train_loop<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    ntokens:      usize,
    splits:       LmSplits,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
    device:       B::Device,
) -> Result<TrainReport> {
    let LmSplits { train, valid, test } = splits;

    if train.window_count() == 0 {
        bail!(
            "train split yields no BPTT windows (batch_size={}, bptt={}); \
             the split needs at least 2 full rows",
            cfg.batch_size,
            cfg.bptt
        );
    }

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = RnnLmConfig::new(ntokens, cfg.emsize, cfg.nhid, cfg.mode, cfg.dropout);
    let mut model: RnnLm<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: mode={}, ntokens={}, emsize={}, nhid={}, params={}",
        cfg.mode,
        ntokens,
        cfg.emsize,
        cfg.nhid,
        model.num_params()
    );

    // ── Adam with gradient norm clipping ──────────────────────────────────────
    let optim_cfg = AdamConfig::new()
        .with_epsilon(1e-8)
        .with_grad_clipping(Some(GradientClippingConfig::Norm(cfg.clip as f32)));
    let mut optim = optim_cfg.init();

    let train_lanes = train.lanes();
    let train_windows = train.window_count();
    let train_loader = DataLoaderBuilder::new(LmBatcher::<B>::new(device.clone()))
        .batch_size(train_lanes)
        .num_workers(1)
        .build(train);

    let mut best_val_loss   = f64::INFINITY;
    let mut last_train_loss = f64::NAN;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut tokens   = 0usize;

        for (window, batch) in train_loader.iter().enumerate() {
            let [lanes, seq_len] = batch.inputs.dims();
            let loss = model.forward_loss(batch.inputs, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            loss_sum += loss_val * (lanes * seq_len) as f64;
            tokens   += lanes * seq_len;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);

            if cfg.log_interval > 0 && (window + 1) % cfg.log_interval == 0 {
                let cur = loss_sum / tokens as f64;
                tracing::info!(
                    "epoch {} | window {}/{} | loss {:.4} | ppl {:.2}",
                    epoch,
                    window + 1,
                    train_windows,
                    cur,
                    cur.exp()
                );
            }
        }

        let train_loss = if tokens > 0 { loss_sum / tokens as f64 } else { f64::NAN };

        // model.valid() → RnnLm<B::InnerBackend>, dropout off
        let val_loss = evaluate(&model.valid(), &valid, device.clone());

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | train_ppl={:.2} | val_loss={:.4} | val_ppl={:.2}",
            epoch,
            cfg.epochs,
            train_loss,
            train_loss.exp(),
            val_loss,
            val_loss.exp(),
        );

        ckpt_manager.save_model(&model, epoch)?;
        let row = EpochMetrics::new(epoch, train_loss, val_loss);
        metrics.log(&row)?;

        if row.is_improvement(best_val_loss) {
            tracing::info!("New best val_loss {:.4} at epoch {}", val_loss, epoch);
            best_val_loss = val_loss;
        }
        last_train_loss = train_loss;
    }

    let test_loss = evaluate(&model.valid(), &test, device);
    println!(
        "End of training | test_loss={:.4} | test_ppl={:.2}",
        test_loss,
        test_loss.exp()
    );

    tracing::info!("Training complete!");
    Ok(TrainReport { last_train_loss, best_val_loss, test_loss })
}

/// Token-weighted mean cross-entropy over every window of `dataset`.
/// Returns NaN for an empty dataset.
pub fn evaluate<B: Backend>(model: &RnnLm<B>, dataset: &LmDataset, device: B::Device) -> f64 {
    if dataset.window_count() == 0 {
        tracing::warn!("Evaluation split has no BPTT windows; reporting NaN loss");
        return f64::NAN;
    }

    let batcher = LmBatcher::<B>::new(device);
    let mut loss_sum = 0.0f64;
    let mut tokens   = 0usize;

    for window in 0..dataset.window_count() {
        let items = dataset.window(window);
        let batch = batcher.batch(items);
        let [lanes, seq_len] = batch.inputs.dims();

        let loss: f64 = model
            .forward_loss(batch.inputs, batch.targets)
            .into_scalar()
            .elem::<f64>();
        loss_sum += loss * (lanes * seq_len) as f64;
        tokens   += lanes * seq_len;
    }

    loss_sum / tokens as f64
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::batchify;
    use crate::domain::{rnn_mode::RnnMode, sequence::TokenSequence};
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn windows(n: u32, vocab: u32, lanes: usize, bptt: usize) -> LmDataset {
        let ids: Vec<u32> = (0..n).map(|i| i % vocab).collect();
        LmDataset::from_batched(&batchify(&TokenSequence::new(ids), lanes), bptt)
    }

    fn tiny_config(dir: &std::path::Path, mode: RnnMode) -> TrainConfig {
        TrainConfig {
            checkpoint_dir: dir.to_string_lossy().to_string(),
            mode,
            batch_size: 2,
            eval_batch_size: 2,
            bptt: 3,
            epochs: 2,
            lr: 0.01,
            emsize: 8,
            nhid: 8,
            dropout: 0.0,
            log_interval: 0,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_train_loop_runs_and_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path(), RnnMode::RnnTanh);
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir);
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();
        let splits = LmSplits {
            train: windows(40, 5, 2, 3),
            valid: windows(20, 5, 2, 3),
            test:  windows(20, 5, 2, 3),
        };

        let report = train_loop::<TestBackend>(&cfg, 5, splits, &ckpt, &metrics, Default::default())
            .unwrap();

        assert!(report.last_train_loss.is_finite());
        assert!(report.best_val_loss.is_finite());
        assert!(report.test_loss.is_finite());
        assert!(dir.path().join("latest_epoch.json").exists());

        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3); // header + 2 epochs
    }

    #[test]
    fn test_train_loop_rejects_empty_train_split() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path(), RnnMode::Gru);
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir);
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();
        let splits = LmSplits {
            train: windows(3, 5, 2, 3), // one row only
            valid: windows(20, 5, 2, 3),
            test:  windows(20, 5, 2, 3),
        };

        let err = train_loop::<TestBackend>(&cfg, 5, splits, &ckpt, &metrics, Default::default())
            .unwrap_err();
        assert!(err.to_string().contains("no BPTT windows"));
    }

    #[test]
    fn test_evaluate_empty_is_nan() {
        let device = Default::default();
        let model: RnnLm<NdArray> = RnnLmConfig::new(5, 4, 4, RnnMode::Lstm, 0.0).init(&device);
        let empty = windows(1, 5, 2, 3);
        assert!(evaluate(&model, &empty, device).is_nan());
    }
}
