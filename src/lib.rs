//! Protein–RNA interaction scoring with a bilinear latent-factor model.
//!
//! Layers, from the outside in:
//!   cli → application → data / ml → domain, with infra shared by all.

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;

pub use domain::error::FactorError;
