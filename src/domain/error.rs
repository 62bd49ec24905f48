// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Contract violations raised by the core. Each is fatal for
// the call that detects it; nothing here is retried.
//
// An RNA with zero labeled proteins is NOT an error: it becomes
// an empty batch that contributes nothing to training.

use thiserror::Error;

/// Errors raised by batch construction and the factorization model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactorError {
    /// Feature/label dimensionality inconsistent with the configured shapes
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context:  String,
        expected: String,
        actual:   String,
    },

    /// An id referenced by the interaction matrix (or a restriction list)
    /// has no column in the corresponding feature matrix
    #[error("{kind} '{id}' has no feature column")]
    MissingData { kind: String, id: String },

    /// Zero-sized latent spaces, non-finite hyperparameters, ...
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A feature-store document that cannot be turned into a matrix
    #[error("malformed feature store document: {0}")]
    Format(String),
}

impl FactorError {
    /// Creates a shape mismatch error.
    pub fn shape(
        context:  impl Into<String>,
        expected: impl ToString,
        actual:   impl ToString,
    ) -> Self {
        FactorError::ShapeMismatch {
            context:  context.into(),
            expected: expected.to_string(),
            actual:   actual.to_string(),
        }
    }

    /// Creates a missing-data error for an entity of the given kind.
    pub fn missing(kind: impl Into<String>, id: impl Into<String>) -> Self {
        FactorError::MissingData {
            kind: kind.into(),
            id:   id.into(),
        }
    }
}

pub type FactorResult<T> = Result<T, FactorError>;
