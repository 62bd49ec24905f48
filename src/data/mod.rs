// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the files on disk and the rows the model
// consumes:
//
//   JSON tables
//       │
//       ▼
//   JsonFeatureStore  → FeatureMatrix ×2 + InteractionMatrix
//       │
//       ▼
//   Standardizer      → optional per-attribute z-scoring
//       │
//       ▼
//   TrainingData      → checks ids and counts line up
//       │
//       ▼
//   BatchBuilder      → one batch per RNA (train)
//                       or a full cross join (predict)
//
// Nothing in this layer touches burn.

/// Reads feature and interaction tables from JSON
pub mod loader;

/// Per-attribute feature standardization
pub mod preprocessor;

/// Validated training data, batches, prediction sets
pub mod dataset;

/// Builds per-RNA batches and prediction cross joins
pub mod batcher;
