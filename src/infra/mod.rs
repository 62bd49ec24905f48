// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the application layer:
//
//   checkpoint.rs  — Parameter dumps and run configuration
//                    as JSON, one params file per epoch.
//
//   metrics.rs     — Epoch summaries appended to a CSV file
//                    for later plotting.
//
//   observer.rs    — TrainingObserver that forwards progress
//                    events to `tracing`.
//
//   predictions.rs — Ranked predictions as TSV.

/// Parameter checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Progress events → tracing
pub mod observer;

/// Ranked prediction output
pub mod predictions;
