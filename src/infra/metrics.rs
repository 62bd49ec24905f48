// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per training epoch.
//
// Metrics recorded per epoch:
//   - epoch:     the epoch number (1, 2, 3, ...)
//   - mean_cost: mean pre-update cost over non-empty batches
//   - batches:   batches that took a gradient step
//   - skipped:   empty batches (RNAs with no known labels)
//   - examples:  labeled pairs seen this epoch
//
// Output file: <checkpoint_dir>/metrics.csv
//
//   epoch,mean_cost,batches,skipped,examples
//   1,0.251204,812,3,40211
//   2,0.243377,812,3,40211

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::traits::EpochSummary;

/// Appends epoch summaries to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Start the log for a new run. An existing metrics.csv in
    /// `dir` belongs to an earlier run and is replaced.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "epoch,mean_cost,batches,skipped,examples")?;
        tracing::debug!("Started metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch as a new row.
    pub fn log(&self, m: &EpochSummary) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{},{},{}",
            m.epoch, m.mean_cost, m.batches, m.skipped, m.examples,
        )?;

        tracing::debug!("Logged epoch {} metrics: mean_cost={:.4}", m.epoch, m.mean_cost);
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn summary(epoch: usize, mean_cost: f64) -> EpochSummary {
        EpochSummary { epoch, epochs: 2, mean_cost, batches: 4, skipped: 1, examples: 10 }
    }

    #[test]
    fn test_header_then_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&summary(1, 0.25)).unwrap();
        logger.log(&summary(2, 0.125)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(
            csv,
            "epoch,mean_cost,batches,skipped,examples\n\
             1,0.250000,4,1,10\n\
             2,0.125000,4,1,10\n"
        );
    }

    #[test]
    fn test_new_run_replaces_old_log() {
        let dir = tempfile::tempdir().unwrap();
        let first = MetricsLogger::new(dir.path()).unwrap();
        first.log(&summary(1, 0.5)).unwrap();
        first.log(&summary(2, 0.4)).unwrap();
        MetricsLogger::new(dir.path()).unwrap().log(&summary(1, 0.3)).unwrap();

        let csv = fs::read_to_string(dir.path().join("metrics.csv")).unwrap();
        assert_eq!(csv, "epoch,mean_cost,batches,skipped,examples\n1,0.300000,4,1,10\n");
    }
}
