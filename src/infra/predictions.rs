// ============================================================
// Layer 6 — Prediction Writer
// ============================================================
// Writes ranked predictions as tab-separated text:
//
//   protein   rna      score      rank
//   P00001    ENSG01   0.913201   1
//   P00001    ENSG07   0.877345   2

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use crate::ml::inferencer::ScoredPair;

/// Write `pairs` to any sink, header first.
pub fn write_tsv<W: Write>(mut out: W, pairs: &[ScoredPair]) -> Result<()> {
    writeln!(out, "protein\trna\tscore\trank")?;
    for p in pairs {
        writeln!(out, "{}\t{}\t{:.6}\t{}", p.protein, p.rna, p.score, p.rank)?;
    }
    out.flush()?;
    Ok(())
}

/// Write `pairs` to a file, creating parent directories.
pub fn save_tsv(path: &Path, pairs: &[ScoredPair]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Cannot write predictions to '{}'", path.display()))?;
    write_tsv(BufWriter::new(file), pairs)?;
    tracing::info!("Wrote {} predictions to '{}'", pairs.len(), path.display());
    Ok(())
}
