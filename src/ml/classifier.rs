use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::CrossEntropyLossConfig,
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::image::NUM_CLASSES;

#[derive(Config, Debug)]
pub struct ClassifierConfig {
    /// Channels of the encoder output this head sits on.
    pub in_channels: usize,
    #[config(default = 128)]
    pub hidden_channels: usize,
    #[config(default = 10)]
    pub num_classes: usize,
    #[config(default = 0.2)]
    pub dropout: f64,
}

impl ClassifierConfig {
    /// Head for the ten CIFAR-10 classes.
    pub fn cifar(in_channels: usize) -> Self {
        Self::new(in_channels).with_num_classes(NUM_CLASSES)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Classifier<B> {
        let conv = Conv2dConfig::new([self.in_channels, self.hidden_channels], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let pool    = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let dropout = DropoutConfig::new(self.dropout).init();
        let head    = LinearConfig::new(self.hidden_channels, self.num_classes).init(device);
        Classifier { conv, pool, dropout, head }
    }
}

/// Small head over encoder features: conv → global average pool → linear.
#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    pub conv:    Conv2d<B>,
    pub pool:    AdaptiveAvgPool2d,
    pub dropout: Dropout,
    pub head:    Linear<B>,
}

impl<B: Backend> Classifier<B> {
    /// hidden: [batch, in_channels, h, w] → logits: [batch, num_classes]
    pub fn forward(&self, hidden: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.conv.forward(hidden));
        let x = self.pool.forward(x);            // [batch, hidden, 1, 1]
        let x = x.flatten::<2>(1, 3);            // [batch, hidden]
        self.head.forward(self.dropout.forward(x))
    }

    pub fn forward_loss(
        &self,
        hidden: Tensor<B, 4>,
        labels: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(hidden);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), labels);
        (loss, logits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_logit_shape() {
        let device = Default::default();
        let model: Classifier<TestBackend> = ClassifierConfig::cifar(8)
            .with_hidden_channels(4)
            .init(&device);

        let hidden = Tensor::<TestBackend, 4>::ones([3, 8, 4, 4], &device);
        assert_eq!(model.forward(hidden).dims(), [3, NUM_CLASSES]);
    }

    #[test]
    fn test_loss_is_positive() {
        let device = Default::default();
        let model: Classifier<TestBackend> = ClassifierConfig::cifar(8)
            .with_hidden_channels(4)
            .init(&device);

        let hidden = Tensor::<TestBackend, 4>::ones([2, 8, 4, 4], &device);
        let labels = Tensor::<TestBackend, 1, Int>::from_ints([1, 9], &device);
        let (loss, logits) = model.forward_loss(hidden, labels);

        assert_eq!(logits.dims(), [2, NUM_CLASSES]);
        let loss: f32 = loss.into_scalar().elem();
        assert!(loss.is_finite() && loss > 0.0);
    }
}
