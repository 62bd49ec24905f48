use crate::domain::{
    error::{FactorError, FactorResult},
    matrix::{FeatureMatrix, InteractionMatrix},
    traits::TrainingSetStats,
};

/// Feature tables plus the labels that connect them, checked for
/// consistency once so batch construction can trust every lookup.
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub proteins:     FeatureMatrix,
    pub rnas:         FeatureMatrix,
    pub interactions: InteractionMatrix,
    /// protein feature column of each interaction column
    protein_columns:  Vec<usize>,
    /// RNA feature column of each interaction row
    rna_columns:      Vec<usize>,
}

impl TrainingData {
    pub fn new(
        proteins:     FeatureMatrix,
        rnas:         FeatureMatrix,
        interactions: InteractionMatrix,
    ) -> FactorResult<Self> {
        if proteins.num_entities() != interactions.num_proteins() {
            return Err(FactorError::shape(
                "protein columns vs interaction columns",
                interactions.num_proteins(),
                proteins.num_entities(),
            ));
        }
        if rnas.num_entities() != interactions.num_rnas() {
            return Err(FactorError::shape(
                "RNA columns vs interaction rows",
                interactions.num_rnas(),
                rnas.num_entities(),
            ));
        }

        let protein_columns = resolve(&proteins, interactions.protein_ids(), "protein")?;
        let rna_columns     = resolve(&rnas, interactions.rna_ids(), "RNA")?;

        Ok(Self { proteins, rnas, interactions, protein_columns, rna_columns })
    }

    pub fn protein_dim(&self) -> usize {
        self.proteins.num_attributes()
    }

    pub fn rna_dim(&self) -> usize {
        self.rnas.num_attributes()
    }

    /// Features of the protein in interaction column `j`.
    pub(crate) fn protein_features(&self, j: usize) -> &[f32] {
        self.proteins.column(self.protein_columns[j])
    }

    /// Features of the RNA in interaction row `i`.
    pub(crate) fn rna_features(&self, i: usize) -> &[f32] {
        self.rnas.column(self.rna_columns[i])
    }
}

fn resolve(matrix: &FeatureMatrix, ids: &[String], kind: &str) -> FactorResult<Vec<usize>> {
    ids.iter()
        .map(|id| {
            matrix
                .position(id)
                .ok_or_else(|| FactorError::missing(kind, id.as_str()))
        })
        .collect()
}

/// Every labeled (protein, RNA) pair of one RNA, consumed by one
/// gradient step. Feature rows are row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub rna:              String,
    pub proteins:         Vec<String>,
    /// k × protein_dim
    pub protein_features: Vec<f32>,
    /// k × rna_dim
    pub rna_features:     Vec<f32>,
    pub labels:           Vec<f32>,
    pub protein_dim:      usize,
    pub rna_dim:          usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn protein_row(&self, i: usize) -> &[f32] {
        &self.protein_features[i * self.protein_dim..(i + 1) * self.protein_dim]
    }

    pub fn rna_row(&self, i: usize) -> &[f32] {
        &self.rna_features[i * self.rna_dim..(i + 1) * self.rna_dim]
    }
}

/// Batches in their fixed visitation order.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub batches: Vec<Batch>,
    pub stats:   TrainingSetStats,
}

impl TrainingSet {
    pub fn num_examples(&self) -> usize {
        self.stats.num_examples()
    }
}

/// Cross join of proteins and RNAs, names aligned with feature rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSet {
    /// k × protein_dim
    pub protein_features: Vec<f32>,
    pub protein_names:    Vec<String>,
    /// k × rna_dim
    pub rna_features:     Vec<f32>,
    pub rna_names:        Vec<String>,
    pub protein_dim:      usize,
    pub rna_dim:          usize,
}

impl PredictionSet {
    pub fn len(&self) -> usize {
        self.protein_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protein_names.is_empty()
    }

    pub fn protein_row(&self, i: usize) -> &[f32] {
        &self.protein_features[i * self.protein_dim..(i + 1) * self.protein_dim]
    }

    pub fn rna_row(&self, i: usize) -> &[f32] {
        &self.rna_features[i * self.rna_dim..(i + 1) * self.rna_dim]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(prefix: &str, count: usize) -> FeatureMatrix {
        FeatureMatrix::from_columns(
            vec!["f".into()],
            (0..count).map(|i| format!("{prefix}{i}")).collect(),
            (0..count).map(|i| vec![i as f32]).collect(),
        )
        .unwrap()
    }

    fn labels(rnas: &[&str], proteins: &[&str]) -> InteractionMatrix {
        InteractionMatrix::new(
            rnas.iter().map(|s| s.to_string()).collect(),
            proteins.iter().map(|s| s.to_string()).collect(),
            vec![vec![Some(1.0); proteins.len()]; rnas.len()],
        )
        .unwrap()
    }

    #[test]
    fn test_consistent_tables_are_accepted() {
        let data = TrainingData::new(
            matrix("p", 2),
            matrix("r", 1),
            labels(&["r0"], &["p1", "p0"]),
        )
        .unwrap();
        // interaction column 0 is p1, whose single feature is 1.0
        assert_eq!(data.protein_features(0), &[1.0]);
        assert_eq!(data.rna_features(0), &[0.0]);
    }

    #[test]
    fn test_column_count_mismatch() {
        let err = TrainingData::new(matrix("p", 3), matrix("r", 1), labels(&["r0"], &["p0", "p1"]))
            .unwrap_err();
        assert!(matches!(err, FactorError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_unknown_rna_id() {
        let err = TrainingData::new(matrix("p", 1), matrix("r", 1), labels(&["rX"], &["p0"]))
            .unwrap_err();
        assert_eq!(err, FactorError::missing("RNA", "rX"));
    }
}
