// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
//   1. `train`   — fits the model and checkpoints every epoch
//   2. `predict` — loads a checkpoint and ranks RNAs per protein

pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::io;

use commands::{Commands, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "rbp-factor",
    version,
    about = "Bilinear latent-factor model of protein–RNA interactions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training on interactions in: {}", args.interactions);
    let checkpoint_dir = args.checkpoint_dir.clone();
    let history = TrainUseCase::new(args.into()).execute()?;

    match history.last() {
        Some(last) => println!(
            "Trained {} epochs, final mean cost {:.6}. Checkpoints in '{}'.",
            last.epoch, last.mean_cost, checkpoint_dir
        ),
        None => println!("No epochs run. Config saved in '{}'.", checkpoint_dir),
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;
    use crate::infra::predictions::write_tsv;

    let mut use_case = PredictUseCase::new(
        args.checkpoint_dir,
        args.protein_features,
        args.rna_features,
    );
    if !args.proteins.is_empty() {
        use_case = use_case.with_proteins(args.proteins);
    }
    if let Some(epoch) = args.epoch {
        use_case = use_case.with_epoch(epoch);
    }
    if let Some(path) = &args.output {
        use_case = use_case.with_output(path);
    }

    let ranked = use_case.execute()?;
    if args.output.is_none() {
        write_tsv(io::stdout().lock(), &ranked)?;
    }
    Ok(())
}
