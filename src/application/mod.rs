// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal:
// training a model, or scoring pairs with a trained one.
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No argument parsing or printing (that's Layer 1)
//   - File formats live in Layers 4 and 6
//   - Only workflow coordination

// Load → batch → train → checkpoint
pub mod train_use_case;

// Checkpoint → cross join → score → rank
pub mod predict_use_case;
