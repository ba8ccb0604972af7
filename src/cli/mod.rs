// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
// The only printing in the program happens here and in the
// per-epoch progress lines of the trainer.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, InspectArgs, TrainArgs};

use crate::application::train_use_case::TrainConfig;

#[derive(Parser, Debug)]
#[command(
    name = "word-rnn-lm",
    version = "0.1.0",
    about = "Train a word-level RNN / LSTM / GRU language model on a text corpus."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Inspect(args)  => run_inspect(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    // Mode is validated here, before anything is loaded or allocated
    let cfg = TrainConfig::try_from(args)?;
    tracing::info!("Starting {} training on corpus in: {}", cfg.mode, cfg.data_dir);

    let report = TrainUseCase::new(cfg).execute()?;

    println!(
        "Training complete. Best val_loss={:.4}, test_loss={:.4} (ppl {:.2}).",
        report.best_val_loss,
        report.test_loss,
        report.test_loss.exp()
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let (valid, test) = EvaluateUseCase::new(args.checkpoint_dir, args.data_dir).execute()?;

    println!("valid: loss={:.4} ppl={:.2}", valid.loss, valid.ppl);
    println!("test:  loss={:.4} ppl={:.2}", test.loss, test.ppl);
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let stats = InspectUseCase::new(&args.data_dir, &args.prefix, &args.eos, args.batch_size)
        .execute()?;

    println!("vocabulary: {} tokens", stats.vocab_size);
    for s in &stats.splits {
        let [rows, channels, lanes] = s.shape;
        println!(
            "{:<5} {:>10} tokens -> ({}, {}, {}), {} dropped",
            s.split.as_str(),
            s.tokens,
            rows,
            channels,
            lanes,
            s.dropped
        );
    }
    Ok(())
}
