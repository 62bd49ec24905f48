// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model parameters as plain JSON.
//
// What gets saved:
//   1. params_epoch_{n}.json — the five named arrays after epoch n
//   2. latest_epoch.json     — which epoch was last saved
//   3. train_config.json     — the run configuration
//
// A params file is a mapping of the five names to their shape
// and row-major values:
//
//   {
//     "Ap": { "shape": [sp, n], "values": [...] },
//     "bp": { "shape": [sp],    "values": [...] },
//     "Ar": { "shape": [sr, m], "values": [...] },
//     "br": { "shape": [sr],    "values": [...] },
//     "B":  { "shape": [sp, sr], "values": [...] }
//   }
//
// The config is needed to rebuild the model (latent sizes,
// standardization flags) before the params are loaded into it.
//
// File layout:
//   checkpoints/
//     params_epoch_1.json
//     params_epoch_2.json
//     ...
//     latest_epoch.json
//     train_config.json

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::params::ModelParams;

const LATEST: &str = "latest_epoch.json";
const CONFIG: &str = "train_config.json";

/// Reads and writes the JSON files of one checkpoint directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// The directory is created eagerly; if that fails, the first
    /// write reports it with the path attached.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let _ = fs::create_dir_all(&dir);
        Self { dir }
    }

    /// Save the parameters reached after `epoch` and point
    /// latest_epoch.json at them.
    pub fn save_params(&self, params: &ModelParams, epoch: usize) -> Result<()> {
        self.write(&params_file(epoch), params, false)?;
        self.write(LATEST, &epoch, false)?;
        tracing::debug!("Saved parameters for epoch {} in '{}'", epoch, self.dir.display());
        Ok(())
    }

    /// Remove the parameter files and latest_epoch.json left by an
    /// earlier run, so a new run never mixes with stale epochs.
    pub fn clear_params(&self) -> Result<()> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Ok(());
        };
        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let stale = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n == LATEST || (n.starts_with("params_epoch_") && n.ends_with(".json")));
            if stale {
                fs::remove_file(&path)
                    .with_context(|| format!("Cannot remove '{}'", path.display()))?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!("Removed {} files of an earlier run from '{}'", removed, self.dir.display());
        }
        Ok(())
    }

    /// Parameters of the most recent epoch.
    pub fn load_params(&self) -> Result<ModelParams> {
        let epoch = self.latest_epoch()?;
        tracing::info!("Restoring parameters from epoch {}", epoch);
        self.load_params_at(epoch)
    }

    pub fn load_params_at(&self, epoch: usize) -> Result<ModelParams> {
        self.read(&params_file(epoch), "no parameters were saved for that epoch")
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write(CONFIG, cfg, true)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read(CONFIG, "run 'train' before 'predict'")
    }

    /// Epoch number stored in latest_epoch.json.
    pub fn latest_epoch(&self) -> Result<usize> {
        self.read(LATEST, "no epoch has finished in this directory")
    }

    // ── internals ─────────────────────────────────────────────────────────────

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T, pretty: bool) -> Result<()> {
        let path = self.dir.join(name);
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        fs::write(&path, json).with_context(|| format!("Cannot write '{}'", path.display()))
    }

    fn read<T: DeserializeOwned>(&self, name: &str, hint: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}' ({hint})", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a valid checkpoint file", path.display()))
    }
}

fn params_file(epoch: usize) -> String {
    format!("params_epoch_{epoch}.json")
}
