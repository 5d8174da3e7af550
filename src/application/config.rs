// ============================================================
// Layer 2 — Training Configuration
// ============================================================
// Hyperparameters shared by both training loops.
// Serialisable so each run's settings are saved next to its
// checkpoints (<model>_train_config.json).
//
// The two loops differ only in their epoch default:
//   autoencoder 1000, classifier 100.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::domain::traits::ExperimentTracker;
use crate::infra::tracking::{FileTracker, PROJECT};

pub const AUTOENCODER_EPOCHS: usize = 1000;
pub const CLASSIFIER_EPOCHS:  usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub data_dir:         String,
    pub epochs:           usize,
    pub lr:               f64,
    pub train_batch_size: usize,
    pub test_batch_size:  usize,
    pub to_evaluate:      bool,
    /// Tracking entity; tracking is off when None.
    pub tracking:         Option<String>,
    pub tracking_dir:     String,
    pub save_path:        Option<String>,
    pub seed:             u64,
}

impl TrainingConfig {
    pub fn autoencoder_defaults() -> Self {
        Self {
            data_dir:         "data/cifar-10-batches-bin".to_string(),
            epochs:           AUTOENCODER_EPOCHS,
            lr:               3e-4,
            train_batch_size: 16,
            test_batch_size:  16,
            to_evaluate:      true,
            tracking:         None,
            tracking_dir:     "runs".to_string(),
            save_path:        None,
            seed:             0,
        }
    }

    pub fn classifier_defaults() -> Self {
        Self { epochs: CLASSIFIER_EPOCHS, ..Self::autoencoder_defaults() }
    }

    /// Reject settings the loops cannot run with.
    /// Zero epochs is allowed: nothing is trained, evaluation still runs.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.train_batch_size > 0, "train batch size must be positive");
        ensure!(self.test_batch_size > 0, "test batch size must be positive");
        ensure!(
            self.lr.is_finite() && self.lr > 0.0,
            "learning rate must be a positive number, got {}",
            self.lr
        );
        Ok(())
    }

    /// Open a tracking run and store `run_config` in it, if tracking is on.
    pub fn open_tracker(&self, run_config: &Value) -> Result<Option<FileTracker>> {
        let Some(entity) = &self.tracking else {
            return Ok(None);
        };
        let mut tracker = FileTracker::create(Path::new(&self.tracking_dir), entity, PROJECT)?;
        tracker.log_config(run_config)?;
        Ok(Some(tracker))
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::autoencoder_defaults()
    }
}
