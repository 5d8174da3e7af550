// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Four subcommands:
//
//   train-autoencoder                 reconstruct CIFAR-10 images
//   train-classifier <AE_PATH>        classify on a frozen encoder
//   eval-autoencoder <AE_PATH>        test MSE of a checkpoint
//   eval-classifier  <AE_PATH> <CLS>  test accuracy of a checkpoint
//
// Both training commands share TrainingArgs via #[command(flatten)].
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::config::{TrainingConfig, AUTOENCODER_EPOCHS, CLASSIFIER_EPOCHS};
use crate::application::evaluate::EvalConfig;
use crate::application::train_classifier::{ClassifierTrainConfig, DEFAULT_CHANNELS};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the convolutional autoencoder
    TrainAutoencoder(TrainingArgs),

    /// Train a classifier on the frozen encoder of a trained autoencoder
    TrainClassifier(ClassifierArgs),

    /// Evaluate a saved autoencoder on the test split
    EvalAutoencoder(EvalArgs),

    /// Evaluate a saved classifier (with its encoder) on the test split
    EvalClassifier(EvalClassifierArgs),
}

/// Flags shared by both training commands.
#[derive(Args, Debug, Clone)]
pub struct TrainingArgs {
    /// Directory holding the CIFAR-10 binary batch files
    #[arg(long, default_value = "data/cifar-10-batches-bin")]
    pub data_dir: String,

    /// Number of full passes over the training split
    /// [default: 1000 for the autoencoder, 100 for the classifier]
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Adam learning rate
    #[arg(long, default_value_t = 3e-4)]
    pub lr: f64,

    #[arg(long, default_value_t = 16)]
    pub train_batch_size: usize,

    #[arg(long, default_value_t = 16)]
    pub test_batch_size: usize,

    /// Skip the test-split evaluation after training
    #[arg(long)]
    pub no_evaluate: bool,

    /// Enable experiment tracking under this entity name
    #[arg(long, value_name = "ENTITY")]
    pub tracking: Option<String>,

    /// Root directory for tracking runs
    #[arg(long, default_value = "runs")]
    pub tracking_dir: String,

    /// Directory to write checkpoints into after every epoch
    #[arg(long)]
    pub save_path: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

impl TrainingArgs {
    /// Build the application config, using `default_epochs` when --epochs is absent.
    pub fn into_config(self, default_epochs: usize) -> TrainingConfig {
        TrainingConfig {
            data_dir:         self.data_dir,
            epochs:           self.epochs.unwrap_or(default_epochs),
            lr:               self.lr,
            train_batch_size: self.train_batch_size,
            test_batch_size:  self.test_batch_size,
            to_evaluate:      !self.no_evaluate,
            tracking:         self.tracking,
            tracking_dir:     self.tracking_dir,
            save_path:        self.save_path,
            seed:             self.seed,
        }
    }
}

impl From<TrainingArgs> for TrainingConfig {
    fn from(a: TrainingArgs) -> Self {
        a.into_config(AUTOENCODER_EPOCHS)
    }
}

#[derive(Args, Debug)]
pub struct ClassifierArgs {
    /// Autoencoder checkpoint directory or record file
    pub autoencoder_model_path: String,

    /// Channels of the encoder output
    #[arg(long, default_value_t = DEFAULT_CHANNELS)]
    pub channels: usize,

    #[command(flatten)]
    pub training: TrainingArgs,
}

impl From<ClassifierArgs> for ClassifierTrainConfig {
    fn from(a: ClassifierArgs) -> Self {
        ClassifierTrainConfig {
            training:               a.training.into_config(CLASSIFIER_EPOCHS),
            channels:               a.channels,
            autoencoder_model_path: a.autoencoder_model_path,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Autoencoder checkpoint directory or record file
    pub autoencoder_model_path: PathBuf,

    #[arg(long, default_value = "data/cifar-10-batches-bin")]
    pub data_dir: String,

    #[arg(long, default_value_t = 16)]
    pub test_batch_size: usize,
}

impl From<EvalArgs> for EvalConfig {
    fn from(a: EvalArgs) -> Self {
        EvalConfig {
            data_dir:               a.data_dir,
            test_batch_size:        a.test_batch_size,
            autoencoder_model_path: a.autoencoder_model_path,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvalClassifierArgs {
    #[command(flatten)]
    pub eval: EvalArgs,

    /// Classifier checkpoint directory or record file
    pub classifier_model_path: PathBuf,
}
