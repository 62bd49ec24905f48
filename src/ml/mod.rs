// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All tensor math lives here. Other layers hand over flat
// row buffers and get plain Vecs back.
//
//   params.rs     — named snapshots of the five parameters
//                   (Ap, bp, Ar, br, B) with explicit shapes
//
//   model.rs      — the bilinear factorization model:
//                   forward pass, regularized cost, the
//                   closed-form gradient and the SGD update
//
//   trainer.rs    — the epoch loop over prepared batches
//
//   inferencer.rs — scores a cross join and ranks RNAs per
//                   protein
//
// The model is generic over the burn Backend. Everything in
// this crate runs it on the NdArray CPU backend: the tensors
// are small and the computation is strictly sequential.

/// Named parameter snapshots
pub mod params;

/// Bilinear latent-factor model with hand-written gradients
pub mod model;

/// Epoch loop over the fixed batch order
pub mod trainer;

/// Scoring and per-protein ranking
pub mod inferencer;

/// Backend used by the application layer.
pub type DefaultBackend = burn::backend::NdArray;
