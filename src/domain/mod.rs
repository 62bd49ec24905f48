// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that define what the system
// works with: labeled feature matrices, the sparse interaction
// matrix, the error taxonomy, and the collaborator traits.
//
// Rules for this layer:
//   - NO burn types
//   - NO file I/O
//   - Only structs, enums and traits
//
// Everything above this layer (data, ml, infra, application)
// speaks in these types.

// The error taxonomy shared by every layer
pub mod error;

// Feature matrices and the interaction matrix
pub mod matrix;

// Collaborator traits (feature store, progress observer)
pub mod traits;
