// ============================================================
// Layer 2 — TrainAutoencoderUseCase
// ============================================================
// Orchestrates an autoencoder run:
//
//   Step 1: Validate config
//   Step 2: Load train (and, if evaluating, test) split
//   Step 3: Prepare checkpoint directory      (if --save-path)
//   Step 4: Open tracking run                 (if --tracking)
//   Step 5: Run the epoch loop                (Layer 5 - ml)
//   Step 6: Evaluate on the test split        (if to_evaluate)

use anyhow::Result;
use burn::{module::AutodiffModule, tensor::backend::AutodiffBackend};
use serde_json::json;

use crate::application::config::TrainingConfig;
use crate::data::{dataset::ImageDataset, loader::Cifar10Loader};
use crate::domain::image::Split;
use crate::domain::traits::{ExperimentTracker, ImageSource};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::autoencoder::AutoEncoderConfig;
use crate::ml::evaluator::{evaluate_autoencoder, AutoencoderEvaluation};
use crate::ml::trainer::train_autoencoder;

/// What an autoencoder run produced.
#[derive(Debug, Clone)]
pub struct AutoencoderReport {
    pub epoch_losses: Vec<f64>,
    pub evaluation:   Option<AutoencoderEvaluation>,
}

pub struct TrainAutoencoderUseCase {
    config: TrainingConfig,
}

impl TrainAutoencoderUseCase {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: AutodiffBackend>(&self, device: &B::Device) -> Result<AutoencoderReport> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Data ──────────────────────────────────────────────────────────────
        let source = Cifar10Loader::new(&cfg.data_dir);
        let train  = ImageDataset::new(source.load_split(Split::Train)?);
        let test   = if cfg.to_evaluate {
            Some(ImageDataset::new(source.load_split(Split::Test)?))
        } else {
            None
        };

        // ── Checkpoints ───────────────────────────────────────────────────────
        let model_cfg = AutoEncoderConfig::default();
        let checkpoints = match &cfg.save_path {
            Some(path) => {
                let ckpt = CheckpointManager::new(path)?;
                ckpt.save_autoencoder_train_config(cfg)?;
                ckpt.save_autoencoder_config(&model_cfg)?;
                Some(ckpt)
            }
            None => None,
        };

        // ── Tracking ──────────────────────────────────────────────────────────
        let mut tracker = cfg.open_tracker(&json!({
            "lr":               cfg.lr,
            "epochs":           cfg.epochs,
            "train_batch_size": cfg.train_batch_size,
            "test_batch_size":  cfg.test_batch_size,
        }))?;

        // ── Train ─────────────────────────────────────────────────────────────
        let run = train_autoencoder::<B>(
            cfg,
            &model_cfg,
            train,
            device,
            checkpoints.as_ref(),
            tracker.as_mut().map(|t| t as &mut dyn ExperimentTracker),
        )?;

        // ── Evaluate ──────────────────────────────────────────────────────────
        let evaluation = match test {
            Some(test) => {
                let eval = evaluate_autoencoder(&run.model.valid(), test, cfg.test_batch_size, device)?;
                if let Some(t) = tracker.as_mut() {
                    t.log(&[("autoencoder_test_loss", eval.mse)])?;
                }
                Some(eval)
            }
            None => None,
        };

        Ok(AutoencoderReport { epoch_losses: run.epoch_losses, evaluation })
    }
}
