// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Scores every (protein, RNA) pair with a trained checkpoint:
//
//   Step 1: Load the run config and parameters   (Layer 6 - infra)
//   Step 2: Rebuild the model from the snapshot   (Layer 5 - ml)
//   Step 3: Load and standardize features         (Layer 4 - data)
//           exactly as the training run did
//   Step 4: Build the protein-major cross join    (Layer 4 - data)
//   Step 5: Score and rank per protein            (Layer 5 - ml)
//   Step 6: Write the TSV if an output is given   (Layer 6 - infra)

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::train_use_case::load_features;
use crate::data::{batcher::BatchBuilder, loader::JsonFeatureStore};
use crate::domain::{
    error::FactorError,
    traits::{FeatureStore, TrainingObserver},
};
use crate::infra::{checkpoint::CheckpointManager, observer::TracingObserver, predictions::save_tsv};
use crate::ml::{
    inferencer::{rank_by_protein, score, ScoredPair},
    model::FactorizationModel,
    DefaultBackend,
};

pub struct PredictUseCase {
    checkpoint_dir:   String,
    protein_features: String,
    rna_features:     String,
    proteins:         Option<Vec<String>>,
    epoch:            Option<usize>,
    output:           Option<PathBuf>,
    observer:         Box<dyn TrainingObserver>,
}

impl PredictUseCase {
    pub fn new(
        checkpoint_dir:   impl Into<String>,
        protein_features: impl Into<String>,
        rna_features:     impl Into<String>,
    ) -> Self {
        Self {
            checkpoint_dir:   checkpoint_dir.into(),
            protein_features: protein_features.into(),
            rna_features:     rna_features.into(),
            proteins:         None,
            epoch:            None,
            output:           None,
            observer:         Box::new(TracingObserver),
        }
    }

    /// Only score these proteins, in this order
    pub fn with_proteins(mut self, proteins: Vec<String>) -> Self {
        self.proteins = Some(proteins);
        self
    }

    /// Use a specific epoch's parameters instead of the latest
    pub fn with_epoch(mut self, epoch: usize) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn TrainingObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Predict from the JSON feature files given at construction
    pub fn execute(&self) -> Result<Vec<ScoredPair>> {
        let store = JsonFeatureStore::new(&self.protein_features, &self.rna_features);
        self.run(&store)
    }

    /// Predict from any feature store. Interactions are never read.
    pub fn run(&self, store: &dyn FeatureStore) -> Result<Vec<ScoredPair>> {
        let observer = self.observer.as_ref();

        // ── Step 1: Checkpoint ────────────────────────────────────────────────
        let ckpt   = CheckpointManager::new(&self.checkpoint_dir);
        let cfg    = ckpt.load_config()?;
        let params = match self.epoch {
            Some(epoch) => ckpt.load_params_at(epoch)?,
            None        => ckpt.load_params()?,
        };

        // ── Step 2: Model ─────────────────────────────────────────────────────
        let device = Default::default();
        let model  = FactorizationModel::<DefaultBackend>::from_params(cfg.model.clone(), &params, &device)
            .context("Checkpoint does not match its saved configuration")?;
        tracing::info!(
            "Loaded model from '{}': n={}, m={}",
            self.checkpoint_dir,
            model.protein_dim(),
            model.rna_dim(),
        );

        // ── Step 3: Features ──────────────────────────────────────────────────
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

        if proteins.num_attributes() != model.protein_dim() {
            return Err(FactorError::shape(
                "protein features vs model",
                model.protein_dim(),
                proteins.num_attributes(),
            )
            .into());
        }
        if rnas.num_attributes() != model.rna_dim() {
            return Err(FactorError::shape(
                "RNA features vs model",
                model.rna_dim(),
                rnas.num_attributes(),
            )
            .into());
        }

        // ── Step 4: Cross join ────────────────────────────────────────────────
        let set = BatchBuilder::new(cfg.model.seed).build_prediction_set(
            &proteins,
            &rnas,
            self.proteins.as_deref(),
            observer,
        )?;

        // ── Steps 5-6: Score, rank, write ─────────────────────────────────────
        let ranked = rank_by_protein(score(&model, &set)?);
        if let Some(path) = &self.output {
            save_tsv(path, &ranked)?;
        }
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::application::train_use_case::{
        tests::{config, write_tables},
        TrainUseCase,
    };
    use crate::domain::traits::SilentObserver;

    fn trained(dir: &std::path::Path) -> crate::application::train_use_case::TrainConfig {
        write_tables(dir);
        let cfg = config(dir);
        TrainUseCase::new(cfg.clone())
            .with_observer(Box::new(SilentObserver))
            .execute()
            .unwrap();
        cfg
    }

    fn use_case(cfg: &crate::application::train_use_case::TrainConfig) -> PredictUseCase {
        PredictUseCase::new(&cfg.checkpoint_dir, &cfg.protein_features, &cfg.rna_features)
            .with_observer(Box::new(SilentObserver))
    }

    #[test]
    fn test_scores_full_cross_join() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = trained(dir.path());

        let pairs = use_case(&cfg).execute().unwrap();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|p| p.score > 0.0 && p.score < 1.0));
        assert!(pairs[..3].iter().all(|p| p.protein == "P1"));
        assert!(pairs[3..].iter().all(|p| p.protein == "P2"));

        let ranks: Vec<usize> = pairs.iter().map(|p| p.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 1, 2, 3]);
        assert!(pairs[0].score >= pairs[1].score && pairs[1].score >= pairs[2].score);
    }

    #[test]
    fn test_restricted_proteins_and_tsv_output() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = trained(dir.path());
        let out = dir.path().join("ranks.tsv");

        let pairs = use_case(&cfg)
            .with_proteins(vec!["P2".into()])
            .with_epoch(2)
            .with_output(&out)
            .execute()
            .unwrap();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|p| p.protein == "P2"));

        let tsv = fs::read_to_string(out).unwrap();
        assert_eq!(tsv.lines().count(), 4);
        assert!(tsv.starts_with("protein\trna\tscore\trank\nP2\t"));
    }

    #[test]
    fn test_same_checkpoint_gives_same_scores() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = trained(dir.path());

        let a = use_case(&cfg).execute().unwrap();
        let b = use_case(&cfg).execute().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_protein_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = trained(dir.path());

        let err = use_case(&cfg)
            .with_proteins(vec!["P9".into()])
            .execute()
            .unwrap_err();
        assert!(format!("{err:#}").contains("P9"));
    }

    #[test]
    fn test_feature_width_must_match_model() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = trained(dir.path());
        fs::write(
            &cfg.rna_features,
            r#"{"index":["x","y","z"],"columns":["R1"],"data":[[1],[2],[3]]}"#,
        )
        .unwrap();

        let err = use_case(&cfg).execute().unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("RNA features vs model"), "{msg}");
    }
}
