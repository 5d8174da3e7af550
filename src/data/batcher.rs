// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<ImageSample>
// into tensors on the target device.
//
//   Input:  N ImageSamples, each 3072 u8 pixels + a label
//   Output: ImageBatch { images: [N, 3, 32, 32] f32 in [0, 1],
//                        labels: [N] int }
//
// The autoencoder uses only `images` (its target is the input
// itself); the classifier uses both.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::domain::image::{ImageSample, IMAGE_CHANNELS, IMAGE_SIDE};

/// A batch of images ready for a forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Pixel values scaled to [0, 1] — shape: [batch, 3, 32, 32]
    pub images: Tensor<B, 4>,

    /// Class indices — shape: [batch]
    pub labels: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ImageSample, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageSample>) -> ImageBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|s| s.pixels.iter().map(|&p| p as f32 / 255.0))
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, [batch_size, IMAGE_CHANNELS, IMAGE_SIDE, IMAGE_SIDE]),
            &self.device,
        );

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ImageBatch { images, labels }
    }
}
