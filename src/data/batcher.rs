// ============================================================
// Layer 4 — Batch Builder
// ============================================================
// Turns the sparse interaction matrix into training batches,
// or the feature tables into a full prediction cross join.
//
// Train mode — one batch per RNA:
//
//   interaction row of RNA r:   [ 1  ?  0  ?  1 ]
//                                 │     │     │
//   batch for r:                (p0,r,1) (p2,r,0) (p4,r,1)
//
//   Unknown cells (?) are skipped entirely — they are NOT
//   negatives. Rows inside a batch are permuted with the
//   caller's RNG; the whole batch is consumed by one gradient
//   step so that order carries no meaning.
//
//   Once every batch exists a fresh RNG, seeded with the
//   builder's seed, shuffles the LIST of batches. That order
//   is the visitation order for every epoch.
//
// Predict mode — protein-major cross join:
//
//   (p0,r0) (p0,r1) ... (p0,rR) (p1,r0) ... (pP,rR)
//
//   No shuffling; names stay aligned with feature rows.

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::data::dataset::{Batch, PredictionSet, TrainingData, TrainingSet};
use crate::domain::{
    error::FactorResult,
    matrix::{is_positive, FeatureMatrix},
    traits::{TrainingObserver, TrainingSetStats},
};

/// Builds training batches and prediction sets.
#[derive(Debug, Clone, Copy)]
pub struct BatchBuilder {
    /// Seed for the batch-order shuffle
    seed: u64,
}

impl BatchBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Build one batch per RNA, then shuffle the batch list.
    ///
    /// `rng` permutes the rows inside each batch. The list shuffle uses
    /// its own generator seeded from `self.seed`, so the visitation order
    /// does not depend on how much of `rng` was consumed.
    pub fn build_training_set<R: Rng + ?Sized>(
        &self,
        data:     &TrainingData,
        rng:      &mut R,
        observer: &dyn TrainingObserver,
    ) -> TrainingSet {
        let y     = &data.interactions;
        let total = y.num_rnas();

        let mut stats        = TrainingSetStats::default();
        let mut batches      = Vec::with_capacity(total);
        let mut next_decile  = 0usize;

        for (i, rna) in y.rna_ids().iter().enumerate() {
            // Percentages from the running count, not total / 10,
            // so tiny matrices report progress too
            let percent = i * 100 / total;
            if percent >= next_decile {
                let decile = percent / 10 * 10;
                observer.batch_progress(decile, i, total);
                next_decile = decile + 10;
            }

            let mut cells: Vec<(usize, f32)> = y.known_in_row(i).collect();
            cells.shuffle(rng);

            let k          = cells.len();
            let rna_row    = data.rna_features(i);
            let mut batch  = Batch {
                rna:              rna.clone(),
                proteins:         Vec::with_capacity(k),
                protein_features: Vec::with_capacity(k * data.protein_dim()),
                rna_features:     Vec::with_capacity(k * data.rna_dim()),
                labels:           Vec::with_capacity(k),
                protein_dim:      data.protein_dim(),
                rna_dim:          data.rna_dim(),
            };

            for (j, label) in cells {
                batch.proteins.push(y.protein_ids()[j].clone());
                batch.protein_features.extend_from_slice(data.protein_features(j));
                batch.rna_features.extend_from_slice(rna_row);
                batch.labels.push(label);

                if is_positive(label) {
                    stats.num_positives += 1;
                } else {
                    stats.num_negatives += 1;
                }
            }

            if batch.is_empty() {
                stats.num_empty += 1;
            }
            batches.push(batch);
        }
        if total > 0 {
            observer.batch_progress(100, total, total);
        }

        let mut order_rng = StdRng::seed_from_u64(self.seed);
        batches.shuffle(&mut order_rng);

        stats.num_batches = batches.len();
        observer.training_set_built(&stats);

        TrainingSet { batches, stats }
    }

    /// Every (protein, RNA) pair, protein-major.
    ///
    /// `restrict` keeps only the listed proteins, in the listed order.
    pub fn build_prediction_set(
        &self,
        proteins: &FeatureMatrix,
        rnas:     &FeatureMatrix,
        restrict: Option<&[String]>,
        observer: &dyn TrainingObserver,
    ) -> FactorResult<PredictionSet> {
        let selected;
        let proteins = match restrict {
            Some(ids) => {
                selected = proteins.select(ids, "protein")?;
                &selected
            }
            None => proteins,
        };

        let n = proteins.num_attributes();
        let m = rnas.num_attributes();
        let k = proteins.num_entities() * rnas.num_entities();

        let mut set = PredictionSet {
            protein_features: Vec::with_capacity(k * n),
            protein_names:    Vec::with_capacity(k),
            rna_features:     Vec::with_capacity(k * m),
            rna_names:        Vec::with_capacity(k),
            protein_dim:      n,
            rna_dim:          m,
        };

        for (p, protein) in proteins.ids().iter().enumerate() {
            for (r, rna) in rnas.ids().iter().enumerate() {
                set.protein_features.extend_from_slice(proteins.column(p));
                set.protein_names.push(protein.clone());
                set.rna_features.extend_from_slice(rnas.column(r));
                set.rna_names.push(rna.clone());
            }
        }

        observer.prediction_set_built(proteins.num_entities(), rnas.num_entities());
        Ok(set)
    }
}
