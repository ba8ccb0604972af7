// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Three subcommands:
//   train    - fit a model and score it on the test split
//   evaluate - score the latest checkpoint
//   inspect  - vocabulary and batching statistics only
//
// Defaults follow the classic word-level PTB setup: 32 lanes,
// 5-step BPTT windows, 100-wide embedding and hidden state.

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::{corpus::DEFAULT_EOS, rnn_mode::{InvalidModeError, RnnMode}};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a language model on <data-dir>/<prefix>{train,valid,test}.txt
    Train(TrainArgs),

    /// Evaluate the latest checkpoint on the valid and test splits
    Evaluate(EvaluateArgs),

    /// Print vocabulary size and batched split shapes
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing the split files
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Split file name prefix (ptb. → ptb.train.txt)
    #[arg(long, default_value = "ptb.")]
    pub prefix: String,

    /// Directory for checkpoints, config, vocabulary and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Recurrent layer: rnn_relu, rnn_tanh, lstm or gru
    #[arg(long, default_value = "rnn_relu")]
    pub mode: String,

    /// Lanes for the train split
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Lanes for the valid and test splits
    #[arg(long, default_value_t = 10)]
    pub eval_batch_size: usize,

    /// Time steps per BPTT window
    #[arg(long, default_value_t = 5)]
    pub bptt: usize,

    #[arg(long, default_value_t = 1)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Gradient norm clipping threshold
    #[arg(long, default_value_t = 0.2)]
    pub clip: f64,

    /// Word embedding size
    #[arg(long, default_value_t = 100)]
    pub emsize: usize,

    /// Hidden units of the recurrent layer
    #[arg(long, default_value_t = 100)]
    pub nhid: usize,

    #[arg(long, default_value_t = 0.2)]
    pub dropout: f64,

    /// End-of-sequence marker appended to every line
    #[arg(long, default_value = DEFAULT_EOS)]
    pub eos: String,

    /// Log running train loss every N windows (0 = off)
    #[arg(long, default_value_t = 500)]
    pub log_interval: usize,
}

/// Parses the mode here so an unknown name is rejected before any
/// device or model exists.
impl TryFrom<TrainArgs> for TrainConfig {
    type Error = InvalidModeError;

    fn try_from(a: TrainArgs) -> Result<Self, Self::Error> {
        let mode: RnnMode = a.mode.parse()?;
        Ok(TrainConfig {
            data_dir:        a.data_dir,
            prefix:          a.prefix,
            checkpoint_dir:  a.checkpoint_dir,
            mode,
            batch_size:      a.batch_size,
            eval_batch_size: a.eval_batch_size,
            bptt:            a.bptt,
            epochs:          a.epochs,
            lr:              a.lr,
            clip:            a.clip,
            emsize:          a.emsize,
            nhid:            a.nhid,
            dropout:         a.dropout,
            eos:             a.eos,
            log_interval:    a.log_interval,
        })
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory where `train` saved its checkpoints
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Use this data directory instead of the one saved at training time
    #[arg(long)]
    pub data_dir: Option<String>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    #[arg(long, default_value = "ptb.")]
    pub prefix: String,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value = DEFAULT_EOS)]
    pub eos: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn train_args(extra: &[&str]) -> TrainArgs {
        let mut argv = vec!["word-rnn-lm", "train"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Train(args) => args,
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_convert() {
        let cfg = TrainConfig::try_from(train_args(&[])).unwrap();
        assert_eq!(cfg.mode, RnnMode::RnnRelu);
        assert_eq!(cfg.batch_size, 32);
        assert_eq!(cfg.bptt, 5);
        assert_eq!(cfg.lr, 1e-3);
        assert_eq!(cfg.lr, TrainConfig::default().lr);
        assert_eq!(cfg.eos, "<eos>");
    }

    #[test]
    fn test_each_mode_converts() {
        for (name, mode) in [
            ("gru", RnnMode::Gru),
            ("lstm", RnnMode::Lstm),
            ("rnn_relu", RnnMode::RnnRelu),
            ("rnn_tanh", RnnMode::RnnTanh),
        ] {
            let cfg = TrainConfig::try_from(train_args(&["--mode", name])).unwrap();
            assert_eq!(cfg.mode, mode);
        }
    }

    #[test]
    fn test_bad_mode_fails_conversion() {
        let err = TrainConfig::try_from(train_args(&["--mode", "cnn"])).unwrap_err();
        assert_eq!(err.given, "cnn");
        assert!(err.to_string().contains("rnn_relu, rnn_tanh, lstm, gru"));
    }
}
