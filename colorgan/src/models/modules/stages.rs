//! # U-Net Stages
//!
//! The encoder and decoder halves of one U-Net level. An encoder stage hands
//! back its pre-pooling features so the caller can route them, as an explicit
//! value, to the decoder stage on the same level.

use burn::{
    nn::{
        conv::{ConvTranspose2d, ConvTranspose2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
    },
    prelude::*,
};

use super::{DoubleConvBlock, DoubleConvBlockConfig};

/// Configuration for the `EncoderStage` module.
#[derive(Config, Debug)]
pub struct EncoderStageConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of channels of both the skip and the downsampled output.
    pub out_channels: usize,
}

impl EncoderStageConfig {
    /// Initializes a new `EncoderStage` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> EncoderStage<B> {
        EncoderStage {
            conv: DoubleConvBlockConfig::new(self.in_channels, self.out_channels).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }
}

/// A `DoubleConvBlock` followed by 2x2 max pooling.
#[derive(Module, Debug)]
pub struct EncoderStage<B: Backend> {
    conv: DoubleConvBlock<B>,
    pool: MaxPool2d,
}

impl<B: Backend> EncoderStage<B> {
    /// Returns `(skip, downsampled)`.
    ///
    /// `skip` keeps the input resolution. `downsampled` has `floor(H / 2)` by
    /// `floor(W / 2)`, so an odd trailing row or column is dropped.
    pub fn forward(&self, x: Tensor<B, 4>) -> (Tensor<B, 4>, Tensor<B, 4>) {
        let skip = self.conv.forward(x);
        let downsampled = self.pool.forward(skip.clone());

        (skip, downsampled)
    }
}

/// Configuration for the `DecoderStage` module.
#[derive(Config, Debug)]
pub struct DecoderStageConfig {
    /// Number of channels of the tensor coming up from the level below.
    pub in_channels: usize,
    /// Number of channels of the skip tensor and of the output.
    pub out_channels: usize,
}

impl DecoderStageConfig {
    /// Initializes a new `DecoderStage` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> DecoderStage<B> {
        let up = ConvTranspose2dConfig::new([self.in_channels, self.out_channels], [2, 2])
            .with_stride([2, 2])
            .init(device);
        let conv = DoubleConvBlockConfig::new(2 * self.out_channels, self.out_channels).init(device);

        DecoderStage { up, conv }
    }
}

/// Transposed-convolution upsampling, channel concatenation with the skip,
/// then a `DoubleConvBlock`.
#[derive(Module, Debug)]
pub struct DecoderStage<B: Backend> {
    up: ConvTranspose2d<B>,
    conv: DoubleConvBlock<B>,
}

impl<B: Backend> DecoderStage<B> {
    /// Upsamples `x` by two and fuses it with `skip`.
    ///
    /// # Panics
    ///
    /// Panics if the upsampled tensor and `skip` differ in batch, height or
    /// width. The two are never padded or cropped to fit.
    pub fn forward(&self, x: Tensor<B, 4>, skip: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.up.forward(x);
        let x = Tensor::cat(vec![x, skip], 1);

        self.conv.forward(x)
    }
}
