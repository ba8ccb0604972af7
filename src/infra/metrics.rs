// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Records per-epoch loss and perplexity to a CSV file.
//
// Perplexity = exp(mean cross-entropy). A model guessing uniformly
// over V words has perplexity V, so it reads as "effective number
// of choices per word".
//
// Output file: checkpoints/metrics.csv
//
//   epoch,train_loss,train_ppl,val_loss,val_ppl
//   1,5.912300,369.630000,5.701200,299.240000
//   2,5.501000,244.900000,5.420100,225.890000

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone)]
pub struct EpochMetrics {
    /// Starts at 1
    pub epoch: usize,

    /// Token-weighted mean loss over all training windows
    pub train_loss: f64,

    /// Mean loss on the valid split, NaN if it has no windows
    pub val_loss: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64) -> Self {
        Self { epoch, train_loss, val_loss }
    }

    pub fn train_ppl(&self) -> f64 {
        perplexity(self.train_loss)
    }

    pub fn val_ppl(&self) -> f64 {
        perplexity(self.val_loss)
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// exp of a mean negative log-likelihood
pub fn perplexity(loss: f64) -> f64 {
    loss.exp()
}

/// Appends epoch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet, so
    /// repeated runs append to the same log.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "epoch,train_loss,train_ppl,val_loss,val_ppl")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.train_ppl(),
            m.val_loss,
            m.val_ppl(),
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 2.5, 2.3);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_perplexity_of_uniform_guess() {
        // uniform over 100 words: loss = ln(100), ppl = 100
        let ppl = perplexity(100f64.ln());
        assert!((ppl - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_header_written_once_rows_appended() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().to_string_lossy().to_string();

        let logger = MetricsLogger::new(d.clone()).unwrap();
        logger.log(&EpochMetrics::new(1, 1.0, 1.5)).unwrap();

        // a second logger on the same dir must not rewrite the header
        let again = MetricsLogger::new(d).unwrap();
        again.log(&EpochMetrics::new(2, 0.5, 1.25)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,train_ppl,val_loss,val_ppl");
        assert!(lines[1].starts_with("1,1.000000,2.718282,1.500000,"));
        assert!(lines[2].starts_with("2,0.500000,"));
    }
}
