// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams the core is built around:
//
//   FeatureStore      where feature and interaction tables come
//                     from (JSON files today, anything tomorrow)
//
//   TrainingObserver  who hears about progress. The core never
//                     prints; it reports lifecycle events to an
//                     observer, which may log them, record them
//                     in a test, or ignore them.
//
// Implementations:
//   - JsonFeatureStore  (data::loader)
//   - TracingObserver   (infra::observer)
//   - SilentObserver    (below)

use anyhow::Result;

use crate::domain::matrix::{FeatureMatrix, InteractionMatrix};

// ─── FeatureStore ─────────────────────────────────────────────────────────────
/// Supplies the three tables the system works from.
pub trait FeatureStore {
    /// Protein features: attributes × proteins.
    fn protein_features(&self) -> Result<FeatureMatrix>;

    /// RNA features: attributes × RNAs.
    fn rna_features(&self) -> Result<FeatureMatrix>;

    /// Labels: RNAs × proteins, unknown cells marked missing.
    fn interactions(&self) -> Result<InteractionMatrix>;
}

// ─── Progress reports ─────────────────────────────────────────────────────────
/// Counts accumulated while building a training set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingSetStats {
    pub num_positives: usize,
    pub num_negatives: usize,
    pub num_batches:   usize,
    /// Batches built for RNAs without a single known label
    pub num_empty:     usize,
}

impl TrainingSetStats {
    pub fn num_examples(&self) -> usize {
        self.num_positives + self.num_negatives
    }
}

/// What one pass over the training set looked like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochSummary {
    /// 1-based epoch number
    pub epoch:     usize,
    pub epochs:    usize,
    /// Mean pre-update cost over the non-empty batches
    pub mean_cost: f64,
    pub batches:   usize,
    pub skipped:   usize,
    pub examples:  usize,
}

// ─── TrainingObserver ─────────────────────────────────────────────────────────
/// Receives progress events. Every method defaults to doing nothing,
/// so implementations only override what they care about.
pub trait TrainingObserver {
    /// A table (`what`) is about to be loaded.
    fn load_started(&self, _what: &str) {}

    /// A table finished loading with the given shape.
    fn load_finished(&self, _what: &str, _rows: usize, _cols: usize) {}

    /// `percent` of the RNAs have been turned into batches.
    fn batch_progress(&self, _percent: usize, _done: usize, _total: usize) {}

    /// The training set is complete.
    fn training_set_built(&self, _stats: &TrainingSetStats) {}

    /// The prediction cross join is complete.
    fn prediction_set_built(&self, _proteins: usize, _rnas: usize) {}

    /// One epoch of training finished.
    fn epoch_finished(&self, _summary: &EpochSummary) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl TrainingObserver for SilentObserver {}
