// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Re-runs test-split evaluation from saved checkpoints, without
// training:
//
//   autoencoder — reconstruction MSE
//   classifier  — loss, accuracy, per-class accuracy
//                 (needs both the autoencoder and the classifier)

use anyhow::Result;
use burn::prelude::Backend;
use std::path::PathBuf;

use crate::data::{dataset::ImageDataset, loader::Cifar10Loader};
use crate::domain::image::Split;
use crate::domain::traits::ImageSource;
use crate::infra::checkpoint::{load_autoencoder, load_classifier};
use crate::ml::evaluator::{
    evaluate_autoencoder, evaluate_classifier, AutoencoderEvaluation, ClassifierEvaluation,
};

#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub data_dir:               String,
    pub test_batch_size:        usize,
    pub autoencoder_model_path: PathBuf,
}

pub struct EvaluateUseCase {
    config: EvalConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    fn test_split(&self) -> Result<ImageDataset> {
        anyhow::ensure!(self.config.test_batch_size > 0, "test batch size must be positive");
        let source = Cifar10Loader::new(&self.config.data_dir);
        Ok(ImageDataset::new(source.load_split(Split::Test)?))
    }

    pub fn autoencoder<B: Backend>(&self, device: &B::Device) -> Result<AutoencoderEvaluation> {
        let test = self.test_split()?;
        let (model, _) = load_autoencoder::<B>(&self.config.autoencoder_model_path, device)?;
        evaluate_autoencoder(&model, test, self.config.test_batch_size, device)
    }

    pub fn classifier<B: Backend>(
        &self,
        classifier_path: &std::path::Path,
        device:          &B::Device,
    ) -> Result<ClassifierEvaluation> {
        let test = self.test_split()?;
        let (autoencoder, ae_cfg) =
            load_autoencoder::<B>(&self.config.autoencoder_model_path, device)?;
        let classifier = load_classifier::<B>(classifier_path, ae_cfg.latent_channels(), device)?;
        evaluate_classifier(
            &classifier,
            &autoencoder.into_encoder(),
            test,
            self.config.test_batch_size,
            device,
        )
    }
}
