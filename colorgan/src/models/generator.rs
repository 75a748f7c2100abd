//! # U-Net Generator
//!
//! A symmetric encoder/decoder that maps a single-channel image to a
//! two-channel image of the same size, e.g. a lightness channel to its two
//! chrominance channels.
//!
//! ## Core Components
//!
//! - `GeneratorConfig`: channel plan of the network, with defaults
//!   `1 -> [64, 128, 256, 512] -> 1024 -> [512, 256, 128, 64] -> 2`.
//! - `Generator`: encoder stages, a bottleneck `DoubleConvBlock`, decoder
//!   stages and a 1x1 projection head.
//!
//! Skip tensors never live on the module. `Generator::forward` collects them
//! from the encoder stages and hands each one, deepest first, to the decoder
//! stage on the same level.

use burn::{
    nn::conv::{Conv2d, Conv2dConfig},
    prelude::*,
};

use super::{
    DecoderStage, DecoderStageConfig, DoubleConvBlock, DoubleConvBlockConfig, EncoderStage,
    EncoderStageConfig,
};
use crate::error::{ColorGanError, ColorGanResult};

/// Deepest U-Net supported; inputs must already be multiples of `2^16`.
pub const MAX_GENERATOR_DEPTH: usize = 16;

/// Configuration for the `Generator` model.
#[derive(Config, Debug)]
pub struct GeneratorConfig {
    /// Channels of the input image.
    #[config(default = "1")]
    pub in_channels: usize,
    /// Channels produced by the projection head.
    #[config(default = "2")]
    pub out_channels: usize,
    /// Output channels of each encoder stage, shallowest first. The decoder
    /// mirrors this list.
    #[config(default = "vec![64, 128, 256, 512]")]
    pub channels: Vec<usize>,
    /// Bottleneck width as a multiple of the deepest encoder width.
    #[config(default = "2")]
    pub bottleneck_factor: usize,
}

impl GeneratorConfig {
    /// Checks that the channel plan describes a buildable network.
    ///
    /// # Errors
    ///
    /// Returns `Err(ColorGanError::InvalidConfiguration)` for an empty or
    /// too long channel list, or any zero width.
    pub fn validate(&self) -> ColorGanResult<()> {
        if self.channels.is_empty() {
            return Err(ColorGanError::InvalidConfiguration {
                reason: "Generator needs at least one encoder stage".to_string(),
            });
        }
        if self.channels.len() > MAX_GENERATOR_DEPTH {
            return Err(ColorGanError::InvalidConfiguration {
                reason: format!(
                    "Generator depth must be <= {MAX_GENERATOR_DEPTH}, got {}",
                    self.channels.len()
                ),
            });
        }
        if self.in_channels == 0 || self.out_channels == 0 {
            return Err(ColorGanError::InvalidConfiguration {
                reason: format!(
                    "Generator input and output channels must be positive, got {} and {}",
                    self.in_channels, self.out_channels
                ),
            });
        }
        if let Some(stage) = self.channels.iter().position(|&c| c == 0) {
            return Err(ColorGanError::InvalidConfiguration {
                reason: format!("Generator stage {stage} has zero channels"),
            });
        }
        if self.bottleneck_factor == 0 {
            return Err(ColorGanError::InvalidConfiguration {
                reason: "Bottleneck factor must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Width of the bottleneck block.
    pub fn bottleneck_channels(&self) -> usize {
        self.channels.last().copied().unwrap_or(0) * self.bottleneck_factor
    }

    /// Initializes a `Generator` with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not pass [`Self::validate`].
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ColorGanResult<Generator<B>> {
        self.validate()?;

        let depth = self.channels.len();
        let bottleneck_channels = self.bottleneck_channels();

        let encoders = (0..depth)
            .map(|level| {
                let in_channels = if level == 0 {
                    self.in_channels
                } else {
                    self.channels[level - 1]
                };
                EncoderStageConfig::new(in_channels, self.channels[level]).init(device)
            })
            .collect();

        let bottleneck =
            DoubleConvBlockConfig::new(self.channels[depth - 1], bottleneck_channels).init(device);

        // Deepest level first, matching the order skips are consumed in.
        let decoders = (0..depth)
            .rev()
            .map(|level| {
                let in_channels = if level == depth - 1 {
                    bottleneck_channels
                } else {
                    self.channels[level + 1]
                };
                DecoderStageConfig::new(in_channels, self.channels[level]).init(device)
            })
            .collect();

        let head = Conv2dConfig::new([self.channels[0], self.out_channels], [1, 1]).init(device);

        let generator = Generator {
            encoders,
            bottleneck,
            decoders,
            head,
            in_channels: self.in_channels,
        };

        log::debug!(
            "Generator: {} -> {:?} -> {} -> {}, {} parameters",
            self.in_channels,
            self.channels,
            bottleneck_channels,
            self.out_channels,
            generator.num_params()
        );

        Ok(generator)
    }
}

/// The U-Net generator.
#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    encoders: Vec<EncoderStage<B>>,
    bottleneck: DoubleConvBlock<B>,
    decoders: Vec<DecoderStage<B>>,
    head: Conv2d<B>,
    in_channels: usize,
}

impl<B: Backend> Generator<B> {
    /// Maps `[N, in, H, W]` to `[N, out, H, W]`.
    ///
    /// No validation happens here. If `H` or `W` is not a multiple of
    /// [`Self::required_multiple`], a decoder concatenation panics.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut skips = Vec::with_capacity(self.encoders.len());
        let mut x = x;
        for encoder in &self.encoders {
            let (skip, downsampled) = encoder.forward(x);
            skips.push(skip);
            x = downsampled;
        }

        let mut x = self.bottleneck.forward(x);

        for (decoder, skip) in self.decoders.iter().zip(skips.into_iter().rev()) {
            x = decoder.forward(x, skip);
        }

        self.head.forward(x)
    }

    /// Checks `x` against [`Self::check_input`] before running [`Self::forward`].
    ///
    /// # Errors
    ///
    /// Returns `Err(ColorGanError::InvalidTensorShape)` instead of letting a
    /// mismatched input reach the decoder.
    pub fn try_forward(&self, x: Tensor<B, 4>) -> ColorGanResult<Tensor<B, 4>> {
        if let Err(err) = self.check_input(x.dims()) {
            log::warn!("Generator rejected input: {err}");
            return Err(err);
        }

        Ok(self.forward(x))
    }

    /// Spatial sizes must be a multiple of this value: two to the number of
    /// encoder stages.
    pub fn required_multiple(&self) -> usize {
        1 << self.encoders.len()
    }

    /// Validates an input shape `[N, C, H, W]`.
    ///
    /// # Errors
    ///
    /// Returns `Err(ColorGanError::InvalidTensorShape)` if the batch is empty,
    /// the channel count is wrong, or a spatial size is not a positive
    /// multiple of [`Self::required_multiple`].
    pub fn check_input(&self, dims: [usize; 4]) -> ColorGanResult<()> {
        let [batch, channels, height, width] = dims;
        let multiple = self.required_multiple();
        let fits = |size: usize| size > 0 && size % multiple == 0;

        if batch == 0 || channels != self.in_channels || !fits(height) || !fits(width) {
            return Err(ColorGanError::InvalidTensorShape {
                expected: format!(
                    "[N > 0, {}, H, W] with H and W positive multiples of {multiple}",
                    self.in_channels
                ),
                actual: format!("{dims:?}"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::Distribution};

    type TestBackend = NdArray<f32>;

    fn small_config() -> GeneratorConfig {
        GeneratorConfig::new().with_channels(vec![4, 8, 16, 32])
    }

    #[test]
    fn default_topology_maps_one_channel_to_two() {
        let device = Default::default();
        let generator = GeneratorConfig::new().init::<TestBackend>(&device).unwrap();
        let x = Tensor::<TestBackend, 4>::random([2, 1, 16, 16], Distribution::Default, &device);

        assert_eq!(generator.forward(x).dims(), [2, 2, 16, 16]);
    }

    #[test]
    fn default_topology_layer_widths() {
        let device = Default::default();
        let generator = GeneratorConfig::new().init::<TestBackend>(&device).unwrap();

        assert_eq!(generator.encoders.len(), 4);
        assert_eq!(generator.decoders.len(), 4);
        assert_eq!(generator.required_multiple(), 16);
        assert_eq!(generator.head.weight.dims(), [2, 64, 1, 1]);
        assert!(generator.head.bias.is_some());
    }

    #[test]
    fn keeps_spatial_size_for_multiples_of_sixteen() {
        let device = Default::default();
        let generator = small_config().init::<TestBackend>(&device).unwrap();

        for [height, width] in [[16, 16], [32, 48], [256, 256]] {
            let x = Tensor::<TestBackend, 4>::random(
                [1, 1, height, width],
                Distribution::Default,
                &device,
            );
            assert_eq!(generator.forward(x).dims(), [1, 2, height, width]);
        }
    }

    #[test]
    #[ignore = "full-width U-Net at 256x256 is slow on the ndarray backend"]
    fn default_topology_at_256() {
        let device = Default::default();
        let generator = GeneratorConfig::new().init::<TestBackend>(&device).unwrap();
        let x = Tensor::<TestBackend, 4>::random([1, 1, 256, 256], Distribution::Default, &device);

        assert_eq!(generator.forward(x).dims(), [1, 2, 256, 256]);
    }

    #[test]
    #[should_panic]
    fn forward_fails_loudly_on_indivisible_input() {
        let device = Default::default();
        let generator = small_config().init::<TestBackend>(&device).unwrap();
        // 24 -> 12 -> 6 -> 3 -> 1: the deepest decoder upsamples 1 to 2 against a 3x3 skip.
        let x = Tensor::<TestBackend, 4>::random([1, 1, 24, 24], Distribution::Default, &device);

        let _ = generator.forward(x);
    }

    #[test]
    fn try_forward_rejects_indivisible_input() {
        let device = Default::default();
        let generator = small_config().init::<TestBackend>(&device).unwrap();
        let x = Tensor::<TestBackend, 4>::random([1, 1, 24, 32], Distribution::Default, &device);

        match generator.try_forward(x) {
            Err(ColorGanError::InvalidTensorShape { actual, .. }) => {
                assert_eq!(actual, "[1, 1, 24, 32]");
            }
            other => panic!("Expected InvalidTensorShape error, got {other:?}"),
        }
    }

    #[test]
    fn check_input_rejects_wrong_channels_and_empty_batch() {
        let device = Default::default();
        let generator = small_config().init::<TestBackend>(&device).unwrap();

        assert!(generator.check_input([1, 1, 64, 32]).is_ok());
        assert!(generator.check_input([1, 3, 64, 32]).is_err());
        assert!(generator.check_input([0, 1, 64, 32]).is_err());
        assert!(generator.check_input([1, 1, 0, 32]).is_err());
    }

    #[test]
    fn try_forward_accepts_valid_input() {
        let device = Default::default();
        let generator = small_config().init::<TestBackend>(&device).unwrap();
        let x = Tensor::<TestBackend, 4>::random([3, 1, 32, 32], Distribution::Default, &device);

        let y = generator.try_forward(x).unwrap();
        assert_eq!(y.dims(), [3, 2, 32, 32]);
    }

    #[test]
    fn depth_follows_channel_list() {
        let device = Default::default();
        let generator = GeneratorConfig::new()
            .with_channels(vec![4, 8])
            .init::<TestBackend>(&device)
            .unwrap();
        let x = Tensor::<TestBackend, 4>::random([1, 1, 12, 20], Distribution::Default, &device);

        assert_eq!(generator.required_multiple(), 4);
        assert_eq!(generator.forward(x).dims(), [1, 2, 12, 20]);
    }
}
