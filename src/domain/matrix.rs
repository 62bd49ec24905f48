// ============================================================
// Layer 3 — Feature and Interaction Matrices
// ============================================================
// Two shapes of data flow into the core:
//
//   FeatureMatrix      attributes × entities
//                      (one column per protein or per RNA)
//
//   InteractionMatrix  RNAs × proteins
//                      (one known label or a missing cell)
//
// Feature matrices are stored column-contiguous so that the
// feature vector of one entity is a plain slice — that is the
// access pattern of batch construction.
//
// The interaction matrix uses NaN as its in-memory missing
// sentinel. A missing cell means "unknown", never "negative".

use std::collections::HashMap;

use crate::domain::error::{FactorError, FactorResult};

/// In-memory sentinel for an unknown interaction.
pub const MISSING: f32 = f32::NAN;

/// Labels are read tolerantly: anything above zero is a positive.
pub fn is_positive(label: f32) -> bool {
    label > 0.0
}

// ─── FeatureMatrix ────────────────────────────────────────────────────────────
/// Explicit features of one entity kind, columns keyed by entity id.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    attributes: Vec<String>,
    ids:        Vec<String>,
    /// values[column * num_attributes + attribute]
    values:     Vec<f32>,
    positions:  HashMap<String, usize>,
}

impl FeatureMatrix {
    /// Build from one feature vector per entity.
    pub fn from_columns(
        attributes: Vec<String>,
        ids:        Vec<String>,
        columns:    Vec<Vec<f32>>,
    ) -> FactorResult<Self> {
        if columns.len() != ids.len() {
            return Err(FactorError::shape("feature columns", ids.len(), columns.len()));
        }
        let n = attributes.len();
        let mut values = Vec::with_capacity(n * ids.len());
        for (id, column) in ids.iter().zip(&columns) {
            if column.len() != n {
                return Err(FactorError::shape(
                    format!("feature column '{id}'"),
                    n,
                    column.len(),
                ));
            }
            values.extend_from_slice(column);
        }
        Self::assemble(attributes, ids, values)
    }

    /// Build from one row per attribute, the layout feature files use
    /// on disk.
    pub fn from_rows(
        attributes: Vec<String>,
        ids:        Vec<String>,
        rows:       Vec<Vec<f32>>,
    ) -> FactorResult<Self> {
        if rows.len() != attributes.len() {
            return Err(FactorError::shape("feature rows", attributes.len(), rows.len()));
        }
        let n = attributes.len();
        let p = ids.len();
        let mut values = vec![0.0f32; n * p];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != p {
                return Err(FactorError::shape(
                    format!("feature row '{}'", attributes[i]),
                    p,
                    row.len(),
                ));
            }
            for (j, &v) in row.iter().enumerate() {
                values[j * n + i] = v;
            }
        }
        Self::assemble(attributes, ids, values)
    }

    fn assemble(
        attributes: Vec<String>,
        ids:        Vec<String>,
        values:     Vec<f32>,
    ) -> FactorResult<Self> {
        let mut positions = HashMap::with_capacity(ids.len());
        for (j, id) in ids.iter().enumerate() {
            if positions.insert(id.clone(), j).is_some() {
                return Err(FactorError::Format(format!("duplicate column id '{id}'")));
            }
        }
        Ok(Self { attributes, ids, values, positions })
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn num_entities(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Feature vector of the entity at column `j`.
    pub fn column(&self, j: usize) -> &[f32] {
        let n = self.num_attributes();
        &self.values[j * n..(j + 1) * n]
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Feature vector of the entity with the given id.
    pub fn column_of(&self, id: &str) -> Option<&[f32]> {
        self.position(id).map(|j| self.column(j))
    }

    /// A new matrix holding only the given entities, in the given order.
    pub fn select(&self, ids: &[String], kind: &str) -> FactorResult<Self> {
        let columns = ids
            .iter()
            .map(|id| {
                self.column_of(id)
                    .map(<[f32]>::to_vec)
                    .ok_or_else(|| FactorError::missing(kind, id.as_str()))
            })
            .collect::<FactorResult<Vec<_>>>()?;
        Self::from_columns(self.attributes.clone(), ids.to_vec(), columns)
    }

    /// Values of attribute `i` across every entity.
    pub fn attribute_row(&self, i: usize) -> impl Iterator<Item = f32> + '_ {
        let n = self.num_attributes();
        self.values.iter().skip(i).step_by(n.max(1)).copied()
    }

    /// Apply `f(attribute, value)` to every stored value.
    pub(crate) fn map_values(&mut self, mut f: impl FnMut(usize, f32) -> f32) {
        let n = self.num_attributes();
        if n == 0 {
            return;
        }
        for (k, v) in self.values.iter_mut().enumerate() {
            *v = f(k % n, *v);
        }
    }
}

// ─── InteractionMatrix ────────────────────────────────────────────────────────
/// Known protein–RNA labels: RNAs as rows, proteins as columns.
#[derive(Debug, Clone)]
pub struct InteractionMatrix {
    rna_ids:     Vec<String>,
    protein_ids: Vec<String>,
    /// Row-major, NaN where the interaction is unknown
    values:      Vec<f32>,
}

impl InteractionMatrix {
    /// Build from one row per RNA; `None` marks an unknown cell.
    pub fn new(
        rna_ids:     Vec<String>,
        protein_ids: Vec<String>,
        rows:        Vec<Vec<Option<f32>>>,
    ) -> FactorResult<Self> {
        if rows.len() != rna_ids.len() {
            return Err(FactorError::shape("interaction rows", rna_ids.len(), rows.len()));
        }
        let p = protein_ids.len();
        let mut values = Vec::with_capacity(rna_ids.len() * p);
        for (rna, row) in rna_ids.iter().zip(&rows) {
            if row.len() != p {
                return Err(FactorError::shape(
                    format!("interaction row '{rna}'"),
                    p,
                    row.len(),
                ));
            }
            // A NaN written as a number is just as unknown as a null
            values.extend(row.iter().map(|cell| cell.unwrap_or(MISSING)));
        }
        Ok(Self { rna_ids, protein_ids, values })
    }

    pub fn num_rnas(&self) -> usize {
        self.rna_ids.len()
    }

    pub fn num_proteins(&self) -> usize {
        self.protein_ids.len()
    }

    pub fn rna_ids(&self) -> &[String] {
        &self.rna_ids
    }

    pub fn protein_ids(&self) -> &[String] {
        &self.protein_ids
    }

    /// The label at (rna, protein), or None when unknown.
    pub fn label(&self, rna: usize, protein: usize) -> Option<f32> {
        let v = self.values[rna * self.num_proteins() + protein];
        (!v.is_nan()).then_some(v)
    }

    /// Known cells of one RNA row as (protein column, label).
    pub fn known_in_row(&self, rna: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let p = self.num_proteins();
        self.values[rna * p..(rna + 1) * p]
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(j, &v)| (j, v))
    }

    /// Total number of known cells.
    pub fn num_known(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_rows_and_columns_agree() {
        let by_rows = FeatureMatrix::from_rows(
            names("a", 2),
            names("p", 3),
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
        )
        .unwrap();
        let by_cols = FeatureMatrix::from_columns(
            names("a", 2),
            names("p", 3),
            vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]],
        )
        .unwrap();
        assert_eq!(by_rows, by_cols);
        assert_eq!(by_rows.column_of("p1"), Some(&[2.0, 5.0][..]));
        assert_eq!(by_rows.attribute_row(1).collect::<Vec<_>>(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_ragged_column_is_a_shape_mismatch() {
        let err = FeatureMatrix::from_columns(
            names("a", 2),
            names("p", 2),
            vec![vec![1.0, 2.0], vec![3.0]],
        )
        .unwrap_err();
        assert!(matches!(err, FactorError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = FeatureMatrix::from_columns(
            names("a", 1),
            vec!["p".into(), "p".into()],
            vec![vec![1.0], vec![2.0]],
        )
        .unwrap_err();
        assert!(matches!(err, FactorError::Format(_)));
    }

    #[test]
    fn test_select_keeps_requested_order() {
        let m = FeatureMatrix::from_columns(
            names("a", 1),
            names("p", 3),
            vec![vec![0.0], vec![1.0], vec![2.0]],
        )
        .unwrap();
        let picked = m.select(&["p2".to_string(), "p0".to_string()], "protein").unwrap();
        assert_eq!(picked.ids(), &["p2".to_string(), "p0".to_string()]);
        assert_eq!(picked.column(0), &[2.0]);

        let err = m.select(&["nope".to_string()], "protein").unwrap_err();
        assert_eq!(err, FactorError::missing("protein", "nope"));
    }

    #[test]
    fn test_missing_cells_are_skipped() {
        let y = InteractionMatrix::new(
            names("r", 2),
            names("p", 3),
            vec![
                vec![Some(1.0), None, Some(0.0)],
                vec![None, None, Some(f32::NAN)],
            ],
        )
        .unwrap();
        assert_eq!(y.known_in_row(0).collect::<Vec<_>>(), vec![(0, 1.0), (2, 0.0)]);
        assert_eq!(y.known_in_row(1).count(), 0);
        assert_eq!(y.label(0, 1), None);
        assert_eq!(y.num_known(), 2);
    }

    #[test]
    fn test_tolerant_labels() {
        assert!(is_positive(1.0));
        assert!(is_positive(0.3));
        assert!(!is_positive(0.0));
        assert!(!is_positive(-1.0));
    }
}
