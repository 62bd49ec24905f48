// ============================================================
// Layer 6 — Tracing Observer
// ============================================================
// Forwards the core's progress events to `tracing`, which is
// how a CLI run shows what it is doing. Silence it with
// RUST_LOG=rbp_factor=warn.

use crate::domain::traits::{EpochSummary, TrainingObserver, TrainingSetStats};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TrainingObserver for TracingObserver {
    fn load_started(&self, what: &str) {
        tracing::info!("Loading {}...", what);
    }

    fn load_finished(&self, what: &str, rows: usize, cols: usize) {
        tracing::info!("{} of shape ({}, {})", what, rows, cols);
    }

    fn batch_progress(&self, percent: usize, done: usize, total: usize) {
        tracing::debug!("Making training set: {}% ({}/{} RNAs)", percent, done, total);
    }

    fn training_set_built(&self, stats: &TrainingSetStats) {
        tracing::info!(
            "Training set created with {} examples ({} positives, {} negatives) in {} batches",
            stats.num_examples(),
            stats.num_positives,
            stats.num_negatives,
            stats.num_batches,
        );
        if stats.num_empty > 0 {
            tracing::warn!("{} RNAs have no known interaction and will be skipped", stats.num_empty);
        }
    }

    fn prediction_set_built(&self, proteins: usize, rnas: usize) {
        tracing::info!(
            "Prepared {} pairs ({} proteins x {} RNAs)",
            proteins * rnas,
            proteins,
            rnas
        );
    }

    fn epoch_finished(&self, s: &EpochSummary) {
        tracing::info!(
            "Epoch {:>3}/{} | cost={:.6} | batches={} | examples={}",
            s.epoch, s.epochs, s.mean_cost, s.batches, s.examples,
        );
    }
}
