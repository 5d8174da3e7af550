// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams the training loops are written against:
//
//   ImageSource        — where labelled images come from
//                        (Cifar10Loader reads the binary batches)
//   ExperimentTracker  — where run config and metrics go
//                        (FileTracker writes a local run directory)
//
// The trainers never name a concrete loader or tracker, so tests
// can hand them in-memory images and a recording tracker.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Trait Objects)

use anyhow::Result;
use serde_json::Value;

use crate::domain::image::{ImageSample, Split};

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can load one split of a labelled image dataset.
pub trait ImageSource {
    /// Load every sample of the given split, in file order.
    fn load_split(&self, split: Split) -> Result<Vec<ImageSample>>;
}

// ─── ExperimentTracker ────────────────────────────────────────────────────────
/// Records a run's configuration and its metric history.
///
/// Every call to `log` is one step; implementations number steps
/// from 0 in call order.
pub trait ExperimentTracker {
    /// Store the hyper-parameters of the run. Called once, before training.
    fn log_config(&mut self, config: &Value) -> Result<()>;

    /// Append one step of named scalar metrics.
    fn log(&mut self, metrics: &[(&str, f64)]) -> Result<()>;
}
