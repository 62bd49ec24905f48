// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Plain epoch loop over the batches BatchBuilder produced:
//
//   for epoch in 1..=epochs
//       for batch in training_set (fixed order, never re-shuffled)
//           skip if empty  — contributes nothing
//           model.train(batch)
//       report the epoch, hand the model to `on_epoch`
//
// `on_epoch` is where the application layer checkpoints and
// logs metrics; the loop itself does no I/O.

use anyhow::{Context, Result};
use burn::prelude::*;

use crate::data::dataset::{Batch, TrainingSet};
use crate::domain::traits::{EpochSummary, TrainingObserver};
use crate::ml::model::{BatchOutput, FactorizationModel};
use crate::domain::error::FactorResult;

/// One SGD step on a prepared batch.
pub fn train_batch<B: Backend>(
    model: &mut FactorizationModel<B>,
    batch: &Batch,
) -> FactorResult<BatchOutput> {
    model.train(&batch.protein_features, &batch.rna_features, &batch.labels)
}

/// Cost of a prepared batch under the current parameters.
pub fn evaluate_batch<B: Backend>(
    model: &FactorizationModel<B>,
    batch: &Batch,
) -> FactorResult<BatchOutput> {
    model.evaluate(&batch.protein_features, &batch.rna_features, &batch.labels)
}

pub fn run_training<B: Backend>(
    model:        &mut FactorizationModel<B>,
    training_set: &TrainingSet,
    epochs:       usize,
    observer:     &dyn TrainingObserver,
    mut on_epoch: impl FnMut(&EpochSummary, &FactorizationModel<B>) -> Result<()>,
) -> Result<Vec<EpochSummary>> {
    let mut history = Vec::with_capacity(epochs);

    for epoch in 1..=epochs {
        let mut cost_sum = 0.0f64;
        let mut batches  = 0usize;
        let mut skipped  = 0usize;
        let mut examples = 0usize;

        for batch in &training_set.batches {
            if batch.is_empty() {
                skipped += 1;
                continue;
            }

            let out = train_batch(model, batch)
                .with_context(|| format!("Training step failed on RNA '{}'", batch.rna))?;
            cost_sum += out.cost;
            batches  += 1;
            examples += batch.len();
        }

        let mean_cost = if batches > 0 { cost_sum / batches as f64 } else { 0.0 };
        let summary = EpochSummary {
            epoch,
            epochs,
            mean_cost,
            batches,
            skipped,
            examples,
        };

        observer.epoch_finished(&summary);
        on_epoch(&summary, model)?;
        history.push(summary);
    }

    Ok(history)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use burn::backend::ndarray::NdArrayDevice;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::data::{batcher::BatchBuilder, dataset::TrainingData};
    use crate::domain::matrix::{FeatureMatrix, InteractionMatrix};
    use crate::domain::traits::SilentObserver;
    use crate::ml::model::FactorizationConfig;

    type TestBackend = burn::backend::NdArray;

    fn training_set() -> TrainingSet {
        let ids = |p: &str, c: usize| (0..c).map(|i| format!("{p}{i}")).collect::<Vec<_>>();
        let proteins = FeatureMatrix::from_columns(
            ids("a", 3),
            ids("p", 3),
            vec![vec![1.0, 0.0, 0.5], vec![0.0, 1.0, -0.5], vec![-1.0, 0.5, 0.0]],
        )
        .unwrap();
        let rnas = FeatureMatrix::from_columns(
            ids("b", 2),
            ids("r", 3),
            vec![vec![0.2, -0.4], vec![0.9, 0.1], vec![0.0, 0.0]],
        )
        .unwrap();
        let labels = InteractionMatrix::new(
            ids("r", 3),
            ids("p", 3),
            vec![
                vec![Some(1.0), Some(0.0), None],
                vec![None, Some(1.0), Some(0.0)],
                vec![None, None, None],
            ],
        )
        .unwrap();
        let data = TrainingData::new(proteins, rnas, labels).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        BatchBuilder::new(1).build_training_set(&data, &mut rng, &SilentObserver)
    }

    fn model() -> FactorizationModel<TestBackend> {
        FactorizationConfig::new(2, 2)
            .with_irange(1.0)
            .with_learning_rate(0.1)
            .init::<TestBackend>(3, 2, &NdArrayDevice::default())
            .unwrap()
    }

    #[derive(Default)]
    struct Epochs(RefCell<Vec<EpochSummary>>);

    impl TrainingObserver for Epochs {
        fn epoch_finished(&self, summary: &EpochSummary) {
            self.0.borrow_mut().push(*summary);
        }
    }

    #[test]
    fn test_empty_batches_are_skipped() {
        let set      = training_set();
        let mut m    = model();
        let observer = Epochs::default();
        let mut seen = 0;

        let history = run_training(&mut m, &set, 3, &observer, |summary, _| {
            seen += 1;
            assert_eq!(summary.epoch, seen);
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, 3);
        assert_eq!(history.len(), 3);
        assert_eq!(*observer.0.borrow(), history);
        for summary in &history {
            assert_eq!(summary.batches, 2);
            assert_eq!(summary.skipped, 1);
            assert_eq!(summary.examples, 4);
            assert!(summary.mean_cost.is_finite());
        }
    }

    #[test]
    fn test_training_lowers_mean_cost() {
        let set   = training_set();
        let mut m = model();
        let history = run_training(&mut m, &set, 50, &SilentObserver, |_, _| Ok(())).unwrap();
        assert!(history[49].mean_cost < history[0].mean_cost);
    }

    #[test]
    fn test_callback_error_stops_training() {
        let set   = training_set();
        let mut m = model();
        let err = run_training(&mut m, &set, 5, &SilentObserver, |summary, _| {
            if summary.epoch == 2 {
                anyhow::bail!("disk full");
            }
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_evaluate_batch_matches_train_cost() {
        let set   = training_set();
        let mut m = model();
        let batch = set.batches.iter().find(|b| !b.is_empty()).unwrap();
        let before = evaluate_batch(&m, batch).unwrap();
        let step   = train_batch(&mut m, batch).unwrap();
        assert_eq!(before.cost, step.cost);
    }
}
