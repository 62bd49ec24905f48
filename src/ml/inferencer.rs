// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Scores a prediction cross join and ranks the RNAs of each
// protein by descending score.

use burn::prelude::*;
use std::{cmp::Ordering, collections::HashMap};

use crate::data::dataset::PredictionSet;
use crate::domain::error::FactorResult;
use crate::ml::model::FactorizationModel;

/// Score of one (protein, RNA) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPair {
    pub protein: String,
    pub rna:     String,
    pub score:   f32,
    /// 1-based rank of this RNA among the protein's RNAs
    pub rank:    usize,
}

/// Score every row of `set`, in row order. Ranks are left at 0.
pub fn score<B: Backend>(
    model: &FactorizationModel<B>,
    set:   &PredictionSet,
) -> FactorResult<Vec<ScoredPair>> {
    let scores = model.predict(&set.protein_features, &set.rna_features)?;
    Ok(set
        .protein_names
        .iter()
        .zip(&set.rna_names)
        .zip(scores)
        .map(|((protein, rna), score)| ScoredPair {
            protein: protein.clone(),
            rna:     rna.clone(),
            score,
            rank:    0,
        })
        .collect())
}

/// Group by protein (first-seen order), sort each group by score
/// descending and number the ranks. Ties keep their row order.
pub fn rank_by_protein(pairs: Vec<ScoredPair>) -> Vec<ScoredPair> {
    let mut groups: Vec<Vec<ScoredPair>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for pair in pairs {
        match index.get(&pair.protein) {
            Some(&g) => groups[g].push(pair),
            None => {
                index.insert(pair.protein.clone(), groups.len());
                groups.push(vec![pair]);
            }
        }
    }

    groups
        .into_iter()
        .flat_map(|mut group| {
            group.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
            group.into_iter().enumerate().map(|(i, mut pair)| {
                pair.rank = i + 1;
                pair
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use burn::backend::ndarray::NdArrayDevice;

    use super::*;
    use crate::data::batcher::BatchBuilder;
    use crate::domain::{matrix::FeatureMatrix, traits::SilentObserver};
    use crate::ml::model::FactorizationConfig;

    type TestBackend = burn::backend::NdArray;

    fn pair(protein: &str, rna: &str, score: f32) -> ScoredPair {
        ScoredPair { protein: protein.into(), rna: rna.into(), score, rank: 0 }
    }

    #[test]
    fn test_ranks_within_each_protein() {
        let ranked = rank_by_protein(vec![
            pair("p0", "r0", 0.2),
            pair("p0", "r1", 0.9),
            pair("p1", "r0", 0.5),
            pair("p0", "r2", 0.4),
            pair("p1", "r1", 0.5),
        ]);
        let view: Vec<(&str, &str, usize)> = ranked
            .iter()
            .map(|p| (p.protein.as_str(), p.rna.as_str(), p.rank))
            .collect();
        assert_eq!(
            view,
            vec![
                ("p0", "r1", 1),
                ("p0", "r2", 2),
                ("p0", "r0", 3),
                ("p1", "r0", 1),
                ("p1", "r1", 2),
            ]
        );
    }

    #[test]
    fn test_many_proteins_keep_first_seen_order() {
        let proteins = 5000;
        let pairs: Vec<ScoredPair> = (0..proteins)
            .flat_map(|p| {
                (0..3).map(move |r| pair(&format!("p{p}"), &format!("r{r}"), r as f32 / 10.0))
            })
            .collect();

        let ranked = rank_by_protein(pairs);
        assert_eq!(ranked.len(), proteins * 3);
        for (p, group) in ranked.chunks(3).enumerate() {
            assert!(group.iter().all(|x| x.protein == format!("p{p}")));
            let view: Vec<(&str, usize)> = group.iter().map(|x| (x.rna.as_str(), x.rank)).collect();
            assert_eq!(view, vec![("r2", 1), ("r1", 2), ("r0", 3)]);
        }
    }

    #[test]
    fn test_scores_align_with_rows() {
        let proteins = FeatureMatrix::from_columns(
            vec!["a".into(), "b".into()],
            vec!["p0".into(), "p1".into()],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap();
        let rnas = FeatureMatrix::from_columns(
            vec!["c".into()],
            vec!["r0".into(), "r1".into(), "r2".into()],
            vec![vec![-1.0], vec![0.0], vec![1.0]],
        )
        .unwrap();
        let set = BatchBuilder::new(0)
            .build_prediction_set(&proteins, &rnas, None, &SilentObserver)
            .unwrap();
        let model = FactorizationConfig::new(2, 2)
            .with_irange(1.0)
            .init::<TestBackend>(2, 1, &NdArrayDevice::default())
            .unwrap();

        let scored = score(&model, &set).unwrap();
        assert_eq!(scored.len(), 6);
        for (i, pair) in scored.iter().enumerate() {
            assert_eq!(pair.protein, set.protein_names[i]);
            assert_eq!(pair.rna, set.rna_names[i]);
            let alone = model.predict(set.protein_row(i), set.rna_row(i)).unwrap();
            assert!((alone[0] - pair.score).abs() < 1e-6);
        }
    }
}
