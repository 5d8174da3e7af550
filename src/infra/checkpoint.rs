// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// One checkpoint directory (the --save-path of a run) holds:
//
//   autoencoder.mpk.gz            ← autoencoder weights
//   autoencoder_optimizer.mpk.gz  ← Adam moment estimates
//   autoencoder_checkpoint.json   ← {"epoch": N} of the last save
//   autoencoder_config.json       ← AutoEncoderConfig
//   classifier.mpk.gz             ← classifier weights
//   classifier_config.json        ← ClassifierConfig
//   autoencoder_train_config.json ← TrainingConfig of the autoencoder run
//   classifier_train_config.json  ← config of the classifier run
//
// Weights are overwritten after every epoch, so the directory
// always holds the most recent state and its epoch number.
//
// CompactRecorder:
//   - MessagePack + gzip, half precision
//   - Type-safe: loading fails if the architecture doesn't match
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::{
    optim::Optimizer,
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::autoencoder::{AutoEncoder, AutoEncoderConfig};
use crate::ml::classifier::{Classifier, ClassifierConfig};

pub const AUTOENCODER_RECORD:       &str = "autoencoder";
pub const OPTIMIZER_RECORD:         &str = "autoencoder_optimizer";
pub const AUTOENCODER_META:         &str = "autoencoder_checkpoint.json";
pub const AUTOENCODER_CONFIG:       &str = "autoencoder_config.json";
pub const CLASSIFIER_RECORD:        &str = "classifier";
pub const CLASSIFIER_CONFIG:        &str = "classifier_config.json";
pub const AUTOENCODER_TRAIN_CONFIG: &str = "autoencoder_train_config.json";
pub const CLASSIFIER_TRAIN_CONFIG:  &str = "classifier_train_config.json";

/// Extension CompactRecorder appends to record paths.
const RECORD_EXTENSION: &str = ".mpk.gz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct CheckpointMeta {
    epoch: usize,
}

/// Manages saving of model checkpoints into one directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating the directory (and parents) if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save autoencoder weights, optimizer state and the epoch just finished.
    pub fn save_autoencoder<B, O>(
        &self,
        model: &AutoEncoder<B>,
        optim: &O,
        epoch: usize,
    ) -> Result<()>
    where
        B: AutodiffBackend,
        O: Optimizer<AutoEncoder<B>, B>,
    {
        let model_path = self.dir.join(AUTOENCODER_RECORD);
        CompactRecorder::new()
            .record(model.clone().into_record(), model_path.clone())
            .with_context(|| {
                format!("Failed to save autoencoder to '{}'", model_path.display())
            })?;

        let optim_path = self.dir.join(OPTIMIZER_RECORD);
        CompactRecorder::new()
            .record(optim.to_record(), optim_path.clone())
            .with_context(|| {
                format!("Failed to save optimizer state to '{}'", optim_path.display())
            })?;

        write_json(&self.dir.join(AUTOENCODER_META), &CheckpointMeta { epoch })?;

        tracing::debug!("Saved autoencoder checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Save classifier weights, replacing any previous save.
    pub fn save_classifier<B: Backend>(&self, model: &Classifier<B>) -> Result<()> {
        let path = self.dir.join(CLASSIFIER_RECORD);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save classifier to '{}'", path.display())
            })?;

        tracing::debug!("Saved classifier to '{}'", path.display());
        Ok(())
    }

    pub fn save_autoencoder_config(&self, cfg: &AutoEncoderConfig) -> Result<()> {
        write_json(&self.dir.join(AUTOENCODER_CONFIG), cfg)
    }

    pub fn save_classifier_config(&self, cfg: &ClassifierConfig) -> Result<()> {
        write_json(&self.dir.join(CLASSIFIER_CONFIG), cfg)
    }

    /// Save an autoencoder run's configuration next to its weights.
    pub fn save_autoencoder_train_config<T: Serialize>(&self, cfg: &T) -> Result<()> {
        write_json(&self.dir.join(AUTOENCODER_TRAIN_CONFIG), cfg)
    }

    /// Save a classifier run's configuration. Kept apart from the
    /// autoencoder's so both runs can share one directory.
    pub fn save_classifier_train_config<T: Serialize>(&self, cfg: &T) -> Result<()> {
        write_json(&self.dir.join(CLASSIFIER_TRAIN_CONFIG), cfg)
    }

    /// Epoch number (0-based) of the last autoencoder checkpoint.
    pub fn last_saved_epoch(&self) -> Result<usize> {
        let path = self.dir.join(AUTOENCODER_META);
        let meta: CheckpointMeta = read_json(&path).with_context(|| {
            format!(
                "No autoencoder checkpoint in '{}'. Have you run 'train-autoencoder' with --save-path?",
                self.dir.display()
            )
        })?;
        Ok(meta.epoch)
    }
}

/// Load an autoencoder from a checkpoint directory or a record file.
///
/// A directory must contain `autoencoder.mpk.gz`; its architecture comes
/// from `autoencoder_config.json` when present. A file path may be given
/// with or without the `.mpk.gz` suffix and uses the default architecture.
pub fn load_autoencoder<B: Backend>(
    path:   &Path,
    device: &B::Device,
) -> Result<(AutoEncoder<B>, AutoEncoderConfig)> {
    let (record_path, config) = if path.is_dir() {
        let config_path = path.join(AUTOENCODER_CONFIG);
        let config = if config_path.exists() {
            read_json(&config_path)?
        } else {
            tracing::warn!(
                "No '{}' in '{}', assuming the default architecture",
                AUTOENCODER_CONFIG,
                path.display()
            );
            AutoEncoderConfig::default()
        };
        (path.join(AUTOENCODER_RECORD), config)
    } else {
        (record_stem(path), AutoEncoderConfig::default())
    };

    let record = CompactRecorder::new()
        .load(record_path.clone(), device)
        .with_context(|| {
            format!(
                "Cannot load autoencoder '{}{}'. Have you trained it first?",
                record_path.display(),
                RECORD_EXTENSION
            )
        })?;

    tracing::info!("Loaded autoencoder from '{}'", path.display());
    Ok((config.init::<B>(device).load_record(record), config))
}

/// Load a classifier from a checkpoint directory or a record file.
///
/// `in_channels` is used when the directory has no `classifier_config.json`
/// or a bare record file is given.
pub fn load_classifier<B: Backend>(
    path:        &Path,
    in_channels: usize,
    device:      &B::Device,
) -> Result<Classifier<B>> {
    let (record_path, config) = if path.is_dir() {
        let config_path = path.join(CLASSIFIER_CONFIG);
        let config = if config_path.exists() {
            read_json(&config_path)?
        } else {
            ClassifierConfig::cifar(in_channels)
        };
        (path.join(CLASSIFIER_RECORD), config)
    } else {
        (record_stem(path), ClassifierConfig::cifar(in_channels))
    };

    let record = CompactRecorder::new()
        .load(record_path.clone(), device)
        .with_context(|| {
            format!(
                "Cannot load classifier '{}{}'. Have you trained it first?",
                record_path.display(),
                RECORD_EXTENSION
            )
        })?;

    tracing::info!("Loaded classifier from '{}'", path.display());
    Ok(config.init::<B>(device).load_record(record))
}

/// Strip the recorder's extension so the path can be handed back to it.
fn record_stem(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    match s.strip_suffix(RECORD_EXTENSION) {
        Some(stem) => PathBuf::from(stem),
        None       => path.to_path_buf(),
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
        .with_context(|| format!("Cannot write '{}'", path.display()))?;
    tracing::debug!("Wrote '{}'", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Malformed JSON in '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::module::AutodiffModule;
    use burn::optim::AdamConfig;
    use burn::tensor::Distribution;

    type TestBackend     = NdArray;
    type TestAutodiff    = Autodiff<NdArray>;

    fn small_config() -> AutoEncoderConfig {
        AutoEncoderConfig::new().with_base_channels(2)
    }

    #[test]
    fn test_record_stem() {
        assert_eq!(record_stem(Path::new("a/b.mpk.gz")), PathBuf::from("a/b"));
        assert_eq!(record_stem(Path::new("a/b")), PathBuf::from("a/b"));
    }

    #[test]
    fn test_autoencoder_round_trip_through_directory() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let config = small_config();
        let ckpt   = CheckpointManager::new(dir.path().join("run")).unwrap();
        ckpt.save_autoencoder_config(&config).unwrap();

        let model: AutoEncoder<TestAutodiff> = config.init(&device);
        let optim = AdamConfig::new().init::<TestAutodiff, AutoEncoder<TestAutodiff>>();
        ckpt.save_autoencoder(&model, &optim, 4).unwrap();

        assert_eq!(ckpt.last_saved_epoch().unwrap(), 4);
        assert!(dir.path().join("run/autoencoder.mpk.gz").exists());
        assert!(dir.path().join("run/autoencoder_optimizer.mpk.gz").exists());

        let (loaded, loaded_cfg) =
            load_autoencoder::<TestBackend>(ckpt.dir(), &device).unwrap();
        assert_eq!(loaded_cfg.base_channels, 2);

        let images = Tensor::<TestBackend, 4>::random(
            [1, 3, 32, 32], Distribution::Uniform(0.0, 1.0), &device,
        );
        let expected = model.valid().forward(images.clone());
        let actual   = loaded.forward(images);
        // Half-precision storage: compare loosely
        let diff: f32 = (expected - actual).abs().max().into_scalar().elem();
        assert!(diff < 1e-2, "max diff {diff}");
    }

    #[test]
    fn test_load_from_record_file_path() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();

        let model: AutoEncoder<TestAutodiff> = AutoEncoderConfig::default().init(&device);
        let optim = AdamConfig::new().init::<TestAutodiff, AutoEncoder<TestAutodiff>>();
        ckpt.save_autoencoder(&model, &optim, 0).unwrap();

        let file = dir.path().join("autoencoder.mpk.gz");
        let (_, cfg) = load_autoencoder::<TestBackend>(&file, &device).unwrap();
        assert_eq!(cfg.latent_channels(), 256);
    }

    #[test]
    fn test_missing_checkpoint_errors() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();

        assert!(ckpt.last_saved_epoch().is_err());
        assert!(load_autoencoder::<TestBackend>(dir.path(), &device).is_err());
    }

    #[test]
    fn test_run_configs_share_a_directory() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();

        ckpt.save_autoencoder_train_config(&serde_json::json!({ "epochs": 1000 })).unwrap();
        ckpt.save_classifier_train_config(&serde_json::json!({ "epochs": 100 })).unwrap();

        let ae: serde_json::Value =
            read_json(&dir.path().join(AUTOENCODER_TRAIN_CONFIG)).unwrap();
        let cls: serde_json::Value =
            read_json(&dir.path().join(CLASSIFIER_TRAIN_CONFIG)).unwrap();
        assert_eq!(ae["epochs"], 1000);
        assert_eq!(cls["epochs"], 100);
    }

    #[test]
    fn test_classifier_round_trip() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();

        let config = ClassifierConfig::cifar(8).with_hidden_channels(4);
        ckpt.save_classifier_config(&config).unwrap();
        let model: Classifier<TestBackend> = config.init(&device);
        ckpt.save_classifier(&model).unwrap();

        let loaded = load_classifier::<TestBackend>(dir.path(), 8, &device).unwrap();
        let hidden = Tensor::<TestBackend, 4>::ones([2, 8, 4, 4], &device);
        assert_eq!(loaded.forward(hidden).dims(), [2, 10]);
    }
}
