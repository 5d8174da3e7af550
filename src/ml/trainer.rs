// ============================================================
// Layer 5 — Training Loops
// ============================================================
// Both loops share one shape:
//
//   seed → model → Adam → loader
//   for epoch:
//       for batch: forward → loss → backward → step
//       tick progress bar
//       save checkpoint   (if a CheckpointManager is given)
//       log metrics       (if a tracker is given)
//
// Autoencoder: target is the input image, MSE loss.
//   Tracked per epoch: autoencoder_loss       (last batch)
//                      autoencoder_epoch_loss (mean over batches)
//
// Classifier: the encoder is frozen. It runs on the inner
//   (non-autodiff) backend and its output is lifted back with
//   Tensor::from_inner, so gradients stop at the classifier.
//   Tracked per epoch: classifier_loss (mean over batches)
//
// Burn has no zero_grad: gradients are produced fresh by each
// backward() call and consumed by optim.step().
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::config::TrainingConfig;
use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::domain::traits::ExperimentTracker;
use crate::infra::{checkpoint::CheckpointManager, progress::epoch_bar};
use crate::ml::autoencoder::{AutoEncoder, AutoEncoderConfig, Encoder};
use crate::ml::classifier::{Classifier, ClassifierConfig};

/// Adam ε. burn defaults to 1e-5.
const ADAM_EPSILON: f32 = 1e-8;

/// Adam as both loops use it; the learning rate is passed per step.
fn optimizer_config() -> AdamConfig {
    AdamConfig::new().with_epsilon(ADAM_EPSILON)
}

/// A trained model plus its mean loss for every epoch.
pub struct TrainingRun<M> {
    pub model:        M,
    pub epoch_losses: Vec<f64>,
}

pub fn train_autoencoder<B: AutodiffBackend>(
    cfg:           &TrainingConfig,
    model_cfg:     &AutoEncoderConfig,
    train_dataset: ImageDataset,
    device:        &B::Device,
    checkpoints:   Option<&CheckpointManager>,
    mut tracker:   Option<&mut dyn ExperimentTracker>,
) -> Result<TrainingRun<AutoEncoder<B>>> {
    ensure!(train_dataset.sample_count() > 0, "training split is empty");
    B::seed(cfg.seed);

    let mut model: AutoEncoder<B> = model_cfg.init(device);
    let mut optim = optimizer_config().init();
    tracing::info!(
        "Autoencoder ready: latent {}×4×4, {} training images, {} batches per epoch",
        model_cfg.latent_channels(),
        train_dataset.sample_count(),
        train_dataset.batch_count(cfg.train_batch_size)
    );

    let loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(cfg.train_batch_size)
        .num_workers(1)
        .build(train_dataset);

    let bar = epoch_bar(cfg.epochs, "training")?;
    let mut epoch_losses = Vec::with_capacity(cfg.epochs);

    for epoch in 0..cfg.epochs {
        let mut loss_sum  = 0.0f64;
        let mut batches   = 0usize;
        let mut last_loss = f64::NAN;

        for batch in loader.iter() {
            let (loss, _) = model.forward_loss(batch.images);

            last_loss = loss.clone().into_scalar().elem::<f64>();
            tracing::debug!("epoch {} batch {} loss={:.6}", epoch, batches, last_loss);
            loss_sum += last_loss;
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let epoch_loss = mean(loss_sum, batches);
        bar.inc(1);
        bar.set_message(format!("loss={epoch_loss:.4}"));

        if let Some(ckpt) = checkpoints {
            ckpt.save_autoencoder(&model, &optim, epoch)?;
        }

        if let Some(t) = tracker.as_deref_mut() {
            t.log(&[
                ("autoencoder_loss",       last_loss),
                ("autoencoder_epoch_loss", epoch_loss),
            ])?;
        }

        tracing::info!(
            "Epoch {:>4}/{} | autoencoder_loss={:.6} | epoch_mean={:.6}",
            epoch + 1, cfg.epochs, last_loss, epoch_loss,
        );
        epoch_losses.push(epoch_loss);
    }

    bar.finish();
    Ok(TrainingRun { model, epoch_losses })
}

pub fn train_classifier<B: AutodiffBackend>(
    cfg:            &TrainingConfig,
    classifier_cfg: &ClassifierConfig,
    encoder:        &Encoder<B::InnerBackend>,
    train_dataset:  ImageDataset,
    device:         &B::Device,
    checkpoints:    Option<&CheckpointManager>,
    mut tracker:    Option<&mut dyn ExperimentTracker>,
) -> Result<TrainingRun<Classifier<B>>> {
    ensure!(train_dataset.sample_count() > 0, "training split is empty");
    ensure!(
        encoder.out_channels() == classifier_cfg.in_channels,
        "encoder produces {} channels but the classifier expects {}",
        encoder.out_channels(),
        classifier_cfg.in_channels
    );
    B::seed(cfg.seed);

    let mut classifier: Classifier<B> = classifier_cfg.init(device);
    let mut optim = optimizer_config().init();
    tracing::info!(
        "Classifier ready: {} input channels, {} training images, {} batches per epoch",
        classifier_cfg.in_channels,
        train_dataset.sample_count(),
        train_dataset.batch_count(cfg.train_batch_size)
    );

    let loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(cfg.train_batch_size)
        .num_workers(1)
        .build(train_dataset);

    let bar = epoch_bar(cfg.epochs, "training")?;
    let mut epoch_losses = Vec::with_capacity(cfg.epochs);

    for epoch in 0..cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        for batch in loader.iter() {
            let hidden = Tensor::<B, 4>::from_inner(encoder.forward(batch.images.inner()));
            let (loss, _) = classifier.forward_loss(hidden, batch.labels);

            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &classifier);
            classifier = optim.step(cfg.lr, classifier, grads);
        }

        let epoch_loss = mean(loss_sum, batches);
        bar.inc(1);
        bar.set_message(format!("loss={epoch_loss:.4}"));
        tracing::info!(
            "Epoch {:>4}/{} | classifier_loss={:.6}",
            epoch + 1, cfg.epochs, epoch_loss,
        );

        if let Some(t) = tracker.as_deref_mut() {
            t.log(&[("classifier_loss", epoch_loss)])?;
        }

        if let Some(ckpt) = checkpoints {
            ckpt.save_classifier(&classifier)?;
        }

        epoch_losses.push(epoch_loss);
    }

    bar.finish();
    Ok(TrainingRun { model: classifier, epoch_losses })
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { f64::NAN }
}
