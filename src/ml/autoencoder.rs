use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
        loss::{MseLoss, Reduction},
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{relu, sigmoid},
};

// Every stage halves (encoder) or doubles (decoder) the spatial size:
// 32 → 16 → 8 → 4 and back. Kernel 4, stride 2, padding 1.
const KERNEL: usize = 4;
const STRIDE: usize = 2;
const PAD:    usize = 1;

#[derive(Config, Debug)]
pub struct AutoEncoderConfig {
    #[config(default = 3)]
    pub image_channels: usize,
    /// Width of the first encoder stage; doubled at each following stage.
    #[config(default = 64)]
    pub base_channels: usize,
}

impl AutoEncoderConfig {
    /// Channels of the bottleneck representation (`base_channels * 4`).
    pub fn latent_channels(&self) -> usize {
        self.base_channels * 4
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> AutoEncoder<B> {
        let c1 = self.base_channels;
        let c2 = c1 * 2;
        let c3 = c1 * 4;

        let down = |cin: usize, cout: usize| {
            Conv2dConfig::new([cin, cout], [KERNEL, KERNEL])
                .with_stride([STRIDE, STRIDE])
                .with_padding(PaddingConfig2d::Explicit(PAD, PAD))
                .init(device)
        };
        let up = |cin: usize, cout: usize| {
            ConvTranspose2dConfig::new([cin, cout], [KERNEL, KERNEL])
                .with_stride([STRIDE, STRIDE])
                .with_padding([PAD, PAD])
                .init(device)
        };

        let encoder = Encoder {
            conv1: down(self.image_channels, c1),
            conv2: down(c1, c2),
            conv3: down(c2, c3),
        };
        let decoder = Decoder {
            deconv1: up(c3, c2),
            deconv2: up(c2, c1),
            deconv3: up(c1, self.image_channels),
        };
        AutoEncoder { encoder, decoder }
    }
}

impl Default for AutoEncoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Bottleneck half of the autoencoder: [N, 3, 32, 32] → [N, 256, 4, 4].
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub conv3: Conv2d<B>,
}

impl<B: Backend> Encoder<B> {
    /// Channels of the bottleneck this encoder produces.
    pub fn out_channels(&self) -> usize {
        self.conv3.weight.val().dims()[0]
    }

    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = relu(self.conv1.forward(images));
        let x = relu(self.conv2.forward(x));
        relu(self.conv3.forward(x))
    }
}

#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub deconv1: ConvTranspose2d<B>,
    pub deconv2: ConvTranspose2d<B>,
    pub deconv3: ConvTranspose2d<B>,
}

impl<B: Backend> Decoder<B> {
    /// Output is squashed to [0, 1] to match the batcher's pixel scale.
    pub fn forward(&self, latent: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = relu(self.deconv1.forward(latent));
        let x = relu(self.deconv2.forward(x));
        sigmoid(self.deconv3.forward(x))
    }
}

#[derive(Module, Debug)]
pub struct AutoEncoder<B: Backend> {
    pub encoder: Encoder<B>,
    pub decoder: Decoder<B>,
}

impl<B: Backend> AutoEncoder<B> {
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        self.decoder.forward(self.encoder.forward(images))
    }

    /// Reconstruct `images` and score the reconstruction against them.
    /// Loss = mean squared error over every pixel of the batch.
    pub fn forward_loss(&self, images: Tensor<B, 4>) -> (Tensor<B, 1>, Tensor<B, 4>) {
        let reconstructed = self.forward(images.clone());
        let loss = MseLoss::new().forward(reconstructed.clone(), images, Reduction::Mean);
        (loss, reconstructed)
    }

    /// Detach the encoder for reuse as a feature extractor.
    pub fn into_encoder(self) -> Encoder<B> {
        self.encoder
    }
}
