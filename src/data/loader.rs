// ============================================================
// Layer 4 — Feature Store Loader
// ============================================================
// Reads the three tables from JSON documents in the "split"
// layout that pandas writes with `to_json(orient="split")`:
//
//   {
//     "index":   ["attr0", "attr1", ...],      ← row labels
//     "columns": ["P00001", "P00002", ...],    ← column labels
//     "data":    [[0.1, 0.7, ...], ...]        ← one list per row
//   }
//
// Feature files:     rows = attributes, columns = entity ids
// Interaction file:  rows = RNA ids,    columns = protein ids
//                    null = unknown interaction
//
// Feature files may not contain nulls — an unknown feature
// has no meaning for the model.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::{Path, PathBuf}};

use crate::domain::{
    error::FactorError,
    matrix::{FeatureMatrix, InteractionMatrix},
    traits::FeatureStore,
};

/// On-disk shape of one table.
#[derive(Debug, Deserialize)]
struct SplitTable {
    index:   Vec<String>,
    columns: Vec<String>,
    data:    Vec<Vec<Option<f32>>>,
}

fn read_table(path: &Path) -> Result<SplitTable> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Cannot parse '{}' as a split-orient table", path.display()))
}

/// Load a feature matrix (attributes × entities).
pub fn load_feature_matrix(path: &Path) -> Result<FeatureMatrix> {
    let table = read_table(path)?;
    if table.data.len() != table.index.len() {
        return Err(FactorError::shape("feature rows", table.index.len(), table.data.len()))
            .with_context(|| format!("In '{}'", path.display()));
    }

    let mut rows = Vec::with_capacity(table.data.len());
    for (attribute, row) in table.index.iter().zip(&table.data) {
        let values = row
            .iter()
            .map(|v| v.ok_or_else(|| FactorError::Format(
                format!("missing value for attribute '{attribute}'")
            )))
            .collect::<Result<Vec<f32>, _>>()
            .with_context(|| format!("In '{}'", path.display()))?;
        rows.push(values);
    }
    FeatureMatrix::from_rows(table.index, table.columns, rows)
        .with_context(|| format!("In '{}'", path.display()))
}

/// Load the interaction matrix (RNAs × proteins).
pub fn load_interaction_matrix(path: &Path) -> Result<InteractionMatrix> {
    let table = read_table(path)?;
    InteractionMatrix::new(table.index, table.columns, table.data)
        .with_context(|| format!("In '{}'", path.display()))
}

// ─── JsonFeatureStore ─────────────────────────────────────────────────────────
/// FeatureStore backed by three JSON files.
///
/// The interaction file is optional: prediction only needs features.
#[derive(Debug, Clone)]
pub struct JsonFeatureStore {
    proteins:     PathBuf,
    rnas:         PathBuf,
    interactions: Option<PathBuf>,
}

impl JsonFeatureStore {
    pub fn new(proteins: impl Into<PathBuf>, rnas: impl Into<PathBuf>) -> Self {
        Self {
            proteins:     proteins.into(),
            rnas:         rnas.into(),
            interactions: None,
        }
    }

    pub fn with_interactions(mut self, path: impl Into<PathBuf>) -> Self {
        self.interactions = Some(path.into());
        self
    }
}

impl FeatureStore for JsonFeatureStore {
    fn protein_features(&self) -> Result<FeatureMatrix> {
        load_feature_matrix(&self.proteins)
    }

    fn rna_features(&self) -> Result<FeatureMatrix> {
        load_feature_matrix(&self.rnas)
    }

    fn interactions(&self) -> Result<InteractionMatrix> {
        let path = self
            .interactions
            .as_ref()
            .context("No interaction matrix configured for this feature store")?;
        load_interaction_matrix(path)
    }
}
