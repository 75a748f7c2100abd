use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
};

/// Configuration for the `DoubleConvBlock` module.
#[derive(Config, Debug)]
pub struct DoubleConvBlockConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of output channels, shared by both convolutions.
    pub out_channels: usize,
}

impl DoubleConvBlockConfig {
    /// Initializes a new `DoubleConvBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> DoubleConvBlock<B> {
        let conv1 = Conv2dConfig::new([self.in_channels, self.out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .with_bias(false)
            .init(device);
        let bn1 = BatchNormConfig::new(self.out_channels).init(device);
        let conv2 = Conv2dConfig::new([self.out_channels, self.out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .with_bias(false)
            .init(device);
        let bn2 = BatchNormConfig::new(self.out_channels).init(device);

        DoubleConvBlock {
            conv1,
            bn1,
            conv2,
            bn2,
            relu: Relu::new(),
        }
    }
}

/// Two `conv3x3 -> BatchNorm -> ReLU` units back to back.
///
/// Padding of one on a 3x3 kernel keeps height and width unchanged, odd or even.
#[derive(Module, Debug)]
pub struct DoubleConvBlock<B: Backend> {
    conv1: Conv2d<B>,
    bn1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    bn2: BatchNorm<B, 2>,
    relu: Relu,
}

impl<B: Backend> DoubleConvBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv1.forward(x);
        let x = self.bn1.forward(x);
        let x = self.relu.forward(x);
        let x = self.conv2.forward(x);
        let x = self.bn2.forward(x);

        self.relu.forward(x)
    }
}
