// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the training loops:
//
//   checkpoint.rs — Saving and loading model weights
//                   Uses Burn's CompactRecorder for weights and
//                   optimizer state, JSON for configs and the
//                   epoch marker.
//
//   tracking.rs   — Experiment tracking
//                   Writes run config and per-epoch metrics to a
//                   local run directory (JSON lines).
//
//   progress.rs   — Epoch progress bar (indicatif)
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// File-backed experiment tracker
pub mod tracking;

/// Terminal progress bar for the epoch loop
pub mod progress;
