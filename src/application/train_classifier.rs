// ============================================================
// Layer 2 — TrainClassifierUseCase
// ============================================================
// Orchestrates a classifier run on top of a pretrained encoder:
//
//   Step 1: Load the autoencoder checkpoint, keep its encoder
//   Step 2: Check the classifier's input channels match it
//   Step 3: Load train (and, if evaluating, test) split
//   Step 4: Prepare checkpoint directory      (if --save-path)
//   Step 5: Open tracking run                 (if --tracking)
//   Step 6: Run the epoch loop                (Layer 5 - ml)
//   Step 7: Evaluate encoder + classifier     (if to_evaluate)

use anyhow::{ensure, Result};
use burn::{module::AutodiffModule, tensor::backend::AutodiffBackend};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;

use crate::application::config::TrainingConfig;
use crate::data::{dataset::ImageDataset, loader::Cifar10Loader};
use crate::domain::image::Split;
use crate::domain::traits::{ExperimentTracker, ImageSource};
use crate::infra::checkpoint::{load_autoencoder, CheckpointManager};
use crate::ml::autoencoder::Encoder;
use crate::ml::classifier::ClassifierConfig;
use crate::ml::evaluator::{evaluate_classifier, ClassifierEvaluation};
use crate::ml::trainer::train_classifier;

/// Default channel count of the encoder output.
pub const DEFAULT_CHANNELS: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierTrainConfig {
    #[serde(flatten)]
    pub training:               TrainingConfig,
    pub channels:               usize,
    pub autoencoder_model_path: String,
}

/// What a classifier run produced.
#[derive(Debug, Clone)]
pub struct ClassifierReport {
    pub epoch_losses: Vec<f64>,
    pub evaluation:   Option<ClassifierEvaluation>,
}

pub struct TrainClassifierUseCase {
    config: ClassifierTrainConfig,
}

impl TrainClassifierUseCase {
    pub fn new(config: ClassifierTrainConfig) -> Self {
        Self { config }
    }

    /// Load the encoder from `autoencoder_model_path`, then train on it.
    pub fn execute<B: AutodiffBackend>(&self, device: &B::Device) -> Result<ClassifierReport> {
        self.config.training.validate()?;

        let path = Path::new(&self.config.autoencoder_model_path);
        let (autoencoder, _) = load_autoencoder::<B::InnerBackend>(path, device)?;
        self.train_with_encoder::<B>(autoencoder.into_encoder(), device)
    }

    /// Train a classifier on a frozen `encoder` and optionally evaluate it.
    pub fn train_with_encoder<B: AutodiffBackend>(
        &self,
        encoder: Encoder<B::InnerBackend>,
        device:  &B::Device,
    ) -> Result<ClassifierReport> {
        let cfg = &self.config.training;
        cfg.validate()?;
        ensure!(
            encoder.out_channels() == self.config.channels,
            "encoder produces {} channels but the classifier expects {}",
            encoder.out_channels(),
            self.config.channels
        );

        // ── Data ──────────────────────────────────────────────────────────────
        let source = Cifar10Loader::new(&cfg.data_dir);
        let train  = ImageDataset::new(source.load_split(Split::Train)?);
        let test   = if cfg.to_evaluate {
            Some(ImageDataset::new(source.load_split(Split::Test)?))
        } else {
            None
        };

        // ── Checkpoints ───────────────────────────────────────────────────────
        let classifier_cfg = ClassifierConfig::cifar(self.config.channels);
        let checkpoints = match &cfg.save_path {
            Some(path) => {
                let ckpt = CheckpointManager::new(path)?;
                ckpt.save_classifier_train_config(&self.config)?;
                ckpt.save_classifier_config(&classifier_cfg)?;
                Some(ckpt)
            }
            None => None,
        };

        // ── Tracking ──────────────────────────────────────────────────────────
        let mut tracker = cfg.open_tracker(&json!({
            "epochs":           cfg.epochs,
            "lr":               cfg.lr,
            "train_batch_size": cfg.train_batch_size,
            "test_batch_size":  cfg.test_batch_size,
            "save_path":        cfg.save_path,
        }))?;

        // ── Train ─────────────────────────────────────────────────────────────
        let run = train_classifier::<B>(
            cfg,
            &classifier_cfg,
            &encoder,
            train,
            device,
            checkpoints.as_ref(),
            tracker.as_mut().map(|t| t as &mut dyn ExperimentTracker),
        )?;

        // ── Evaluate ──────────────────────────────────────────────────────────
        let evaluation = match test {
            Some(test) => {
                let eval = evaluate_classifier(
                    &run.model.valid(),
                    &encoder,
                    test,
                    cfg.test_batch_size,
                    device,
                )?;
                if let Some(t) = tracker.as_mut() {
                    t.log(&[
                        ("classifier_test_loss", eval.loss),
                        ("classifier_accuracy",  eval.accuracy),
                    ])?;
                }
                Some(eval)
            }
            None => None,
        };

        Ok(ClassifierReport { epoch_losses: run.epoch_losses, evaluation })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::write_fixture;
    use crate::infra::checkpoint::{AUTOENCODER_TRAIN_CONFIG, CLASSIFIER_CONFIG, CLASSIFIER_TRAIN_CONFIG};
    use serde_json::Value;
    use std::fs;
    use crate::ml::autoencoder::{AutoEncoder, AutoEncoderConfig};
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::AdamConfig;

    type TestBackend = Autodiff<NdArray>;

    fn config(data: &Path, out: &Path, ae_path: &Path) -> ClassifierTrainConfig {
        ClassifierTrainConfig {
            training: TrainingConfig {
                data_dir:         data.to_string_lossy().into_owned(),
                epochs:           2,
                train_batch_size: 4,
                test_batch_size:  4,
                save_path:        Some(out.join("cls").to_string_lossy().into_owned()),
                ..TrainingConfig::classifier_defaults()
            },
            channels:               DEFAULT_CHANNELS,
            autoencoder_model_path: ae_path.to_string_lossy().into_owned(),
        }
    }

    /// Save an untrained default autoencoder as if a run had finished.
    fn saved_autoencoder(dir: &Path) {
        let device = Default::default();
        let ckpt   = CheckpointManager::new(dir).unwrap();
        let model: AutoEncoder<TestBackend> = AutoEncoderConfig::default().init(&device);
        let optim  = AdamConfig::new().init::<TestBackend, AutoEncoder<TestBackend>>();
        ckpt.save_autoencoder_config(&AutoEncoderConfig::default()).unwrap();
        ckpt.save_autoencoder(&model, &optim, 0).unwrap();
    }

    #[test]
    fn test_end_to_end_from_autoencoder_checkpoint() {
        let data = tempfile::tempdir().unwrap();
        let out  = tempfile::tempdir().unwrap();
        write_fixture(data.path(), 1, 4).unwrap();
        let ae_dir = out.path().join("ae");
        saved_autoencoder(&ae_dir);

        let report = TrainClassifierUseCase::new(config(data.path(), out.path(), &ae_dir))
            .execute::<TestBackend>(&Default::default())
            .unwrap();

        assert_eq!(report.epoch_losses.len(), 2);
        let eval = report.evaluation.unwrap();
        assert_eq!(eval.total, 4);
        assert_eq!(eval.per_class.iter().map(|t| t.total).sum::<usize>(), 4);

        let cls = out.path().join("cls");
        assert!(cls.join("classifier.mpk.gz").exists());
        assert!(cls.join(CLASSIFIER_CONFIG).exists());

        // The saved run config keeps the encoder path alongside the shared fields
        let saved: ClassifierTrainConfig = serde_json::from_str(
            &fs::read_to_string(cls.join(CLASSIFIER_TRAIN_CONFIG)).unwrap(),
        ).unwrap();
        assert_eq!(saved.channels, DEFAULT_CHANNELS);
        assert_eq!(saved.training.epochs, 2);
    }

    #[test]
    fn test_channel_mismatch_rejected() {
        let data = tempfile::tempdir().unwrap();
        let out  = tempfile::tempdir().unwrap();
        write_fixture(data.path(), 1, 1).unwrap();
        let ae_dir = out.path().join("ae");
        saved_autoencoder(&ae_dir);

        let cfg = ClassifierTrainConfig { channels: 128, ..config(data.path(), out.path(), &ae_dir) };
        let err = TrainClassifierUseCase::new(cfg)
            .execute::<TestBackend>(&Default::default())
            .unwrap_err();
        assert!(err.to_string().contains("channels"));
    }

    #[test]
    fn test_missing_autoencoder_rejected() {
        let data = tempfile::tempdir().unwrap();
        let out  = tempfile::tempdir().unwrap();
        write_fixture(data.path(), 1, 1).unwrap();

        let cfg = config(data.path(), out.path(), &out.path().join("missing"));
        assert!(TrainClassifierUseCase::new(cfg)
            .execute::<TestBackend>(&Default::default())
            .is_err());
    }

    #[test]
    fn test_train_with_given_encoder() {
        let data = tempfile::tempdir().unwrap();
        let out  = tempfile::tempdir().unwrap();
        write_fixture(data.path(), 1, 2).unwrap();

        let device  = Default::default();
        let ae_cfg  = AutoEncoderConfig::new().with_base_channels(2);
        let encoder = ae_cfg.init::<NdArray>(&device).into_encoder();

        let mut cfg = config(data.path(), out.path(), Path::new("unused"));
        cfg.channels = ae_cfg.latent_channels();
        cfg.training.save_path = None;
        cfg.training.to_evaluate = false;

        let report = TrainClassifierUseCase::new(cfg)
            .train_with_encoder::<TestBackend>(encoder, &device)
            .unwrap();
        assert_eq!(report.epoch_losses.len(), 2);
        assert!(report.evaluation.is_none());
    }

    #[test]
    fn test_given_encoder_with_wrong_channels_rejected() {
        let data = tempfile::tempdir().unwrap();
        let out  = tempfile::tempdir().unwrap();
        write_fixture(data.path(), 1, 1).unwrap();

        let device  = Default::default();
        let encoder = AutoEncoderConfig::new()
            .with_base_channels(2)
            .init::<NdArray>(&device)
            .into_encoder();

        // 8 latent channels against the default 256
        let cfg = config(data.path(), out.path(), Path::new("unused"));
        let result = TrainClassifierUseCase::new(cfg)
            .train_with_encoder::<TestBackend>(encoder, &device);
        let err = result.err().unwrap();
        assert!(err.to_string().contains("channels"));
        assert!(!out.path().join("cls").exists());
    }

    #[test]
    fn test_tracking_records_config_losses_and_evaluation() {
        let data = tempfile::tempdir().unwrap();
        let out  = tempfile::tempdir().unwrap();
        write_fixture(data.path(), 1, 3).unwrap();

        let device  = Default::default();
        let ae_cfg  = AutoEncoderConfig::new().with_base_channels(2);
        let encoder = ae_cfg.init::<NdArray>(&device).into_encoder();

        let mut cfg = config(data.path(), out.path(), Path::new("unused"));
        cfg.channels = ae_cfg.latent_channels();
        cfg.training.tracking     = Some("tester".into());
        cfg.training.tracking_dir = out.path().join("runs").to_string_lossy().into_owned();

        TrainClassifierUseCase::new(cfg.clone())
            .train_with_encoder::<TestBackend>(encoder, &device)
            .unwrap();

        let project = out.path().join("runs/tester/autoencoder");
        let run_dir = fs::read_dir(&project).unwrap().next().unwrap().unwrap().path();

        let run_cfg: Value = serde_json::from_str(
            &fs::read_to_string(run_dir.join("config.json")).unwrap(),
        ).unwrap();
        assert_eq!(run_cfg["epochs"], 2);
        assert_eq!(run_cfg["lr"], cfg.training.lr);
        assert_eq!(run_cfg["train_batch_size"], 4);
        assert_eq!(run_cfg["test_batch_size"], 4);
        assert_eq!(run_cfg["save_path"], Value::from(cfg.training.save_path.clone()));

        // Two epoch rows, then the evaluation row
        let rows: Vec<Value> = fs::read_to_string(run_dir.join("metrics.jsonl"))
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0]["classifier_loss"].is_number());
        assert!(rows[1]["classifier_loss"].is_number());
        assert_eq!(rows[1]["step"], 1);
        assert!(rows[2]["classifier_test_loss"].is_number());
        let acc = rows[2]["classifier_accuracy"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&acc));
    }

    #[test]
    fn test_shared_save_path_keeps_autoencoder_run_config() {
        let data = tempfile::tempdir().unwrap();
        let out  = tempfile::tempdir().unwrap();
        write_fixture(data.path(), 1, 1).unwrap();

        let device  = Default::default();
        let ae_cfg  = AutoEncoderConfig::new().with_base_channels(2);
        let encoder = ae_cfg.init::<NdArray>(&device).into_encoder();

        let shared = out.path().join("cls");
        let ckpt   = CheckpointManager::new(&shared).unwrap();
        ckpt.save_autoencoder_train_config(&TrainingConfig::autoencoder_defaults()).unwrap();

        let mut cfg = config(data.path(), out.path(), Path::new("unused"));
        cfg.channels = ae_cfg.latent_channels();
        cfg.training.to_evaluate = false;
        TrainClassifierUseCase::new(cfg)
            .train_with_encoder::<TestBackend>(encoder, &device)
            .unwrap();

        let ae_run: TrainingConfig = serde_json::from_str(
            &fs::read_to_string(shared.join(AUTOENCODER_TRAIN_CONFIG)).unwrap(),
        ).unwrap();
        assert_eq!(ae_run, TrainingConfig::autoencoder_defaults());
        assert!(shared.join(CLASSIFIER_TRAIN_CONFIG).exists());
    }
}
