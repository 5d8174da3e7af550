use burn::data::dataset::Dataset;

use crate::domain::image::ImageSample;

/// In-memory CIFAR-10 split exposed through Burn's Dataset trait.
pub struct ImageDataset {
    samples: Vec<ImageSample>,
}

impl ImageDataset {
    pub fn new(samples: Vec<ImageSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Number of batches a loader with this batch size yields.
    /// The final partial batch counts.
    pub fn batch_count(&self, batch_size: usize) -> usize {
        self.samples.len().div_ceil(batch_size.max(1))
    }
}

impl Dataset<ImageSample> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
