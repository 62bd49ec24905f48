// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `predict`, and
// all their configurable flags.

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::FactorizationConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit the factorization model on labeled protein–RNA pairs
    Train(TrainArgs),

    /// Score protein–RNA pairs with a trained checkpoint
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Protein feature table (split-orient JSON, attributes × proteins)
    #[arg(long, default_value = "data/protein_features.json")]
    pub protein_features: String,

    /// RNA feature table (split-orient JSON, attributes × RNAs)
    #[arg(long, default_value = "data/rna_features.json")]
    pub rna_features: String,

    /// Interaction matrix (RNAs × proteins, null = unknown)
    #[arg(long, default_value = "data/interactions.json")]
    pub interactions: String,

    /// Where parameters, config and metrics are written
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value_t = 15)]
    pub epochs: usize,

    /// Protein latent dimension (sp)
    #[arg(long, default_value_t = 32)]
    pub sp: usize,

    /// RNA latent dimension (sr)
    #[arg(long, default_value_t = 32)]
    pub sr: usize,

    /// Full width of the uniform initialisation interval,
    /// centred on zero: weights start in [-irange/2, irange/2]
    #[arg(long, default_value_t = 0.01)]
    pub irange: f64,

    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// Weight of the norm penalty
    #[arg(long, default_value_t = 0.01)]
    pub lambda_reg: f64,

    /// Seeds initialisation and shuffling
    #[arg(long, default_value_t = 1234)]
    pub seed: u64,

    /// Z-score protein features per attribute
    #[arg(long)]
    pub standardize_proteins: bool,

    /// Z-score RNA features per attribute
    #[arg(long)]
    pub standardize_rnas: bool,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            protein_features:     a.protein_features,
            rna_features:         a.rna_features,
            interactions:         a.interactions,
            checkpoint_dir:       a.checkpoint_dir,
            standardize_proteins: a.standardize_proteins,
            standardize_rnas:     a.standardize_rnas,
            epochs:               a.epochs,
            model: FactorizationConfig::new(a.sp, a.sr)
                .with_irange(a.irange)
                .with_learning_rate(a.lr)
                .with_lambda_reg(a.lambda_reg)
                .with_seed(a.seed),
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long, default_value = "data/protein_features.json")]
    pub protein_features: String,

    #[arg(long, default_value = "data/rna_features.json")]
    pub rna_features: String,

    /// Directory written by `train`
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Epoch to load (default: the latest)
    #[arg(long)]
    pub epoch: Option<usize>,

    /// Only score these proteins (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub proteins: Vec<String>,

    /// Write ranked predictions here instead of stdout
    #[arg(long)]
    pub output: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(subcommand)]
        command: Commands,
    }

    #[test]
    fn test_train_args_become_config() {
        let cli = Harness::parse_from([
            "rbp-factor", "train", "--sp", "4", "--sr", "3", "--lr", "0.5", "--seed", "7",
            "--standardize-rnas",
        ]);
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.model.protein_latent, 4);
        assert_eq!(cfg.model.rna_latent, 3);
        assert_eq!(cfg.model.learning_rate, 0.5);
        assert_eq!(cfg.model.seed, 7);
        assert_eq!(cfg.epochs, 15);
        assert!(cfg.standardize_rnas && !cfg.standardize_proteins);
    }

    #[test]
    fn test_irange_is_full_interval_width() {
        let cli = Harness::parse_from(["rbp-factor", "train", "--sp", "2", "--sr", "2", "--irange", "0.5"]);
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.model.irange, 0.5);

        let device = burn::backend::ndarray::NdArrayDevice::default();
        let params = cfg
            .model
            .init::<burn::backend::NdArray>(3, 2, &device)
            .unwrap()
            .get_params();
        let widest = params
            .iter()
            .flat_map(|(_, a)| a.values.iter().map(|v| v.abs()))
            .fold(0.0f32, f32::max);
        assert!(widest <= 0.25 && widest > 0.0);
    }

    #[test]
    fn test_predict_protein_list() {
        let cli = Harness::parse_from(["rbp-factor", "predict", "--proteins", "P1,P7"]);
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };
        assert_eq!(args.proteins, vec!["P1", "P7"]);
        assert!(args.output.is_none() && args.epoch.is_none());
    }
}
