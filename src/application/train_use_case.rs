// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load protein and RNA features   (Layer 4 - data)
//   Step 2: Standardize if requested        (Layer 4 - data)
//   Step 3: Load the interaction matrix     (Layer 4 - data)
//   Step 4: Check the tables line up        (Layer 4 - data)
//   Step 5: Build the per-RNA batches       (Layer 4 - data)
//   Step 6: Initialise the model            (Layer 5 - ml)
//   Step 7: Save config, open metrics log   (Layer 6 - infra)
//   Step 8: Run the epoch loop              (Layer 5 - ml)
//           checkpointing after every epoch (Layer 6 - infra)

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::BatchBuilder,
    dataset::TrainingData,
    loader::JsonFeatureStore,
    preprocessor::standardize,
};
use crate::domain::{
    matrix::FeatureMatrix,
    traits::{EpochSummary, FeatureStore, TrainingObserver},
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger, observer::TracingObserver};
use crate::ml::{model::FactorizationConfig, trainer::run_training, DefaultBackend};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a training run needs. Saved next to the checkpoints
// so `predict` can rebuild the same model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub protein_features:     String,
    pub rna_features:         String,
    pub interactions:         String,
    pub checkpoint_dir:       String,
    pub standardize_proteins: bool,
    pub standardize_rnas:     bool,
    pub epochs:               usize,
    pub model:                FactorizationConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            protein_features:     "data/protein_features.json".to_string(),
            rna_features:         "data/rna_features.json".to_string(),
            interactions:         "data/interactions.json".to_string(),
            checkpoint_dir:       "checkpoints".to_string(),
            standardize_proteins: false,
            standardize_rnas:     false,
            epochs:               15,
            model:                FactorizationConfig::new(32, 32),
        }
    }
}

/// Load one feature table, reporting to the observer, and standardize
/// it if asked to.
pub(crate) fn load_features(
    what:         &str,
    load:         impl FnOnce() -> Result<FeatureMatrix>,
    standardized: bool,
    observer:     &dyn TrainingObserver,
) -> Result<FeatureMatrix> {
    observer.load_started(what);
    let mut matrix = load()?;
    observer.load_finished(what, matrix.num_attributes(), matrix.num_entities());

    if standardized {
        tracing::info!("Standardizing {}", what);
        standardize(&mut matrix);
    }
    Ok(matrix)
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config:   TrainConfig,
    observer: Box<dyn TrainingObserver>,
}

impl TrainUseCase {
    /// Create a new TrainUseCase that reports progress through tracing
    pub fn new(config: TrainConfig) -> Self {
        Self { config, observer: Box::new(TracingObserver) }
    }

    pub fn with_observer(mut self, observer: Box<dyn TrainingObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Train from the JSON files named in the config
    pub fn execute(&self) -> Result<Vec<EpochSummary>> {
        let cfg   = &self.config;
        let store = JsonFeatureStore::new(&cfg.protein_features, &cfg.rna_features)
            .with_interactions(&cfg.interactions);
        self.run(&store)
    }

    /// Train from any feature store
    pub fn run(&self, store: &dyn FeatureStore) -> Result<Vec<EpochSummary>> {
        let cfg      = &self.config;
        let observer = self.observer.as_ref();

        // ── Steps 1-2: Features ───────────────────────────────────────────────
        let proteins = load_features(
            "protein features",
            || store.protein_features(),
            cfg.standardize_proteins,
            observer,
        )?;
        let rnas = load_features(
            "RNA features",
            || store.rna_features(),
            cfg.standardize_rnas,
            observer,
        )?;

        // ── Step 3: Labels ────────────────────────────────────────────────────
        observer.load_started("interaction matrix");
        let interactions = store.interactions()?;
        observer.load_finished(
            "interaction matrix",
            interactions.num_rnas(),
            interactions.num_proteins(),
        );
        tracing::info!("{} known protein-RNA labels", interactions.num_known());

        // ── Step 4: Consistency ───────────────────────────────────────────────
        let data = TrainingData::new(proteins, rnas, interactions)
            .context("Feature tables and interaction matrix disagree")?;

        // ── Step 5: Batches ───────────────────────────────────────────────────
        tracing::info!(
            "Making training set ({} proteins and {} RNAs)",
            data.interactions.num_proteins(),
            data.interactions.num_rnas(),
        );
        let mut rng      = StdRng::seed_from_u64(cfg.model.seed);
        let training_set = BatchBuilder::new(cfg.model.seed)
            .build_training_set(&data, &mut rng, observer);

        // ── Step 6: Model ─────────────────────────────────────────────────────
        let device    = Default::default();
        let mut model = cfg
            .model
            .init::<DefaultBackend>(data.protein_dim(), data.rna_dim(), &device)?;
        tracing::info!(
            "Model ready: n={}, m={}, sp={}, sr={}",
            data.protein_dim(),
            data.rna_dim(),
            cfg.model.protein_latent,
            cfg.model.rna_latent,
        );

        // ── Step 7: Outputs ───────────────────────────────────────────────────
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt.clear_params()?;
        ckpt.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 8: Epoch loop ────────────────────────────────────────────────
        let history = run_training(
            &mut model,
            &training_set,
            cfg.epochs,
            observer,
            |summary, model| {
                metrics.log(summary)?;
                ckpt.save_params(&model.get_params(), summary.epoch)
            },
        )?;

        tracing::info!("Training complete!");
        Ok(history)
    }
}
