// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Runs a trained model over the test split, no gradients.
//
//   Autoencoder: mean squared reconstruction error per pixel,
//                averaged over every test image
//   Classifier:  mean cross-entropy, overall accuracy, and
//                accuracy per CIFAR-10 class
//
// Callers pass models on a plain (non-autodiff) backend,
// e.g. `model.valid()`, so dropout is disabled.

use anyhow::{anyhow, ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    nn::loss::{CrossEntropyLossConfig, MseLoss, Reduction},
    prelude::*,
};
use serde::Serialize;

use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::domain::image::{CifarClass, NUM_CLASSES};
use crate::ml::autoencoder::{AutoEncoder, Encoder};
use crate::ml::classifier::Classifier;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AutoencoderEvaluation {
    pub mse:     f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassTally {
    pub class:   CifarClass,
    pub correct: usize,
    pub total:   usize,
}

impl ClassTally {
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 / self.total as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierEvaluation {
    pub loss:      f64,
    pub accuracy:  f64,
    pub correct:   usize,
    pub total:     usize,
    pub per_class: Vec<ClassTally>,
}

pub fn evaluate_autoencoder<B: Backend>(
    model:        &AutoEncoder<B>,
    test_dataset: ImageDataset,
    batch_size:   usize,
    device:       &B::Device,
) -> Result<AutoencoderEvaluation> {
    ensure!(test_dataset.sample_count() > 0, "test split is empty");

    let loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .num_workers(1)
        .build(test_dataset);

    let mse = MseLoss::new();
    let mut weighted_sum = 0.0f64;
    let mut samples      = 0usize;

    for batch in loader.iter() {
        let n = batch.images.dims()[0];
        let reconstructed = model.forward(batch.images.clone());
        let loss: f64 = mse
            .forward(reconstructed, batch.images, Reduction::Mean)
            .into_scalar()
            .elem();
        // Batches can differ in size; weight by image count
        weighted_sum += loss * n as f64;
        samples      += n;
    }

    let result = AutoencoderEvaluation { mse: weighted_sum / samples as f64, samples };
    tracing::info!("Autoencoder test MSE: {:.6} over {} images", result.mse, samples);
    Ok(result)
}

pub fn evaluate_classifier<B: Backend>(
    classifier:   &Classifier<B>,
    encoder:      &Encoder<B>,
    test_dataset: ImageDataset,
    batch_size:   usize,
    device:       &B::Device,
) -> Result<ClassifierEvaluation> {
    ensure!(test_dataset.sample_count() > 0, "test split is empty");

    let loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .num_workers(1)
        .build(test_dataset);

    let ce = CrossEntropyLossConfig::new().init(device);
    let mut tallies: Vec<ClassTally> = CifarClass::ALL
        .iter()
        .map(|&class| ClassTally { class, correct: 0, total: 0 })
        .collect();
    let mut loss_sum = 0.0f64;
    let mut total    = 0usize;

    for batch in loader.iter() {
        let truth: Vec<usize> = batch
            .labels
            .to_data()
            .iter::<i64>()
            .map(|t| match usize::try_from(t) {
                Ok(i) if i < NUM_CLASSES => Ok(i),
                _ => Err(anyhow!("test label {t} is outside 0..{NUM_CLASSES}")),
            })
            .collect::<Result<_>>()?;

        let logits = classifier.forward(encoder.forward(batch.images));
        let n = logits.dims()[0];

        let loss: f64 = ce
            .forward(logits.clone(), batch.labels)
            .into_scalar()
            .elem();
        loss_sum += loss * n as f64;
        total    += n;

        // argmax(1) returns [batch, 1], flatten to [batch]
        let preds = logits.argmax(1).flatten::<1>(0, 1).into_data();
        for (p, t) in preds.iter::<i64>().zip(truth) {
            let tally = &mut tallies[t];
            tally.total += 1;
            if p == t as i64 {
                tally.correct += 1;
            }
        }
    }

    let correct = tallies.iter().map(|t| t.correct).sum::<usize>();
    let result = ClassifierEvaluation {
        loss:      loss_sum / total as f64,
        accuracy:  correct as f64 / total as f64,
        correct,
        total,
        per_class: tallies,
    };

    tracing::info!(
        "Classifier test loss={:.4} accuracy={:.2}% ({}/{})",
        result.loss, result.accuracy * 100.0, correct, total,
    );
    for t in &result.per_class {
        if let Some(acc) = t.accuracy() {
            tracing::debug!("  {:<10} {:.2}% ({}/{})", t.class.name(), acc * 100.0, t.correct, t.total);
        }
    }
    Ok(result)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::{ImageSample, PIXELS_PER_IMAGE};
    use crate::ml::autoencoder::AutoEncoderConfig;
    use crate::ml::classifier::ClassifierConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn dataset(labels: &[u8]) -> ImageDataset {
        ImageDataset::new(
            labels
                .iter()
                .map(|&l| ImageSample::new(vec![128; PIXELS_PER_IMAGE], l))
                .collect(),
        )
    }

    #[test]
    fn test_autoencoder_evaluation_counts_partial_batch() {
        let device = Default::default();
        let model: AutoEncoder<TestBackend> =
            AutoEncoderConfig::new().with_base_channels(2).init(&device);

        let eval = evaluate_autoencoder(&model, dataset(&[0, 1, 2, 3, 4]), 2, &device).unwrap();
        assert_eq!(eval.samples, 5);
        assert!(eval.mse.is_finite() && eval.mse >= 0.0);
    }

    #[test]
    fn test_classifier_tallies_cover_every_image() {
        let device  = Default::default();
        let ae_cfg  = AutoEncoderConfig::new().with_base_channels(2);
        let encoder = ae_cfg.init::<TestBackend>(&device).into_encoder();
        let model: Classifier<TestBackend> = ClassifierConfig::cifar(ae_cfg.latent_channels())
            .with_hidden_channels(4)
            .init(&device);

        let eval = evaluate_classifier(&model, &encoder, dataset(&[0, 0, 3, 9, 9, 9]), 4, &device)
            .unwrap();

        assert_eq!(eval.total, 6);
        assert_eq!(eval.per_class[0].total, 2);
        assert_eq!(eval.per_class[3].total, 1);
        assert_eq!(eval.per_class[9].total, 3);
        assert_eq!(eval.per_class[5].accuracy(), None);
        assert!((0.0..=1.0).contains(&eval.accuracy));
        assert!(eval.loss.is_finite());
        // Identical images → identical predictions → exactly one class can be right
        let classes_right = eval.per_class.iter().filter(|t| t.correct > 0).count();
        assert!(classes_right <= 1);
    }

    #[test]
    fn test_out_of_range_label_is_an_error() {
        let device  = Default::default();
        let ae_cfg  = AutoEncoderConfig::new().with_base_channels(2);
        let encoder = ae_cfg.init::<TestBackend>(&device).into_encoder();
        let model: Classifier<TestBackend> = ClassifierConfig::cifar(ae_cfg.latent_channels())
            .with_hidden_channels(4)
            .init(&device);

        let result = evaluate_classifier(&model, &encoder, dataset(&[1, 12]), 2, &device);
        let err = result.err().unwrap();
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_empty_test_split_rejected() {
        let device = Default::default();
        let model: AutoEncoder<TestBackend> =
            AutoEncoderConfig::new().with_base_channels(2).init(&device);
        assert!(evaluate_autoencoder(&model, dataset(&[]), 4, &device).is_err());
    }
}
