use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        InstanceNorm, InstanceNormConfig, LeakyRelu, LeakyReluConfig, PaddingConfig2d,
    },
    prelude::*,
};
use burn_extra_ops::Identity;

/// The normalization step of a `PatchConvBlock`, fixed at construction.
#[derive(Module, Debug)]
pub enum PatchNorm<B: Backend> {
    /// Per-sample, per-channel normalization without learned scale or shift.
    Instance(InstanceNorm<B>),
    /// No normalization; the first critic block sees raw pixel statistics.
    Identity(Identity),
}

impl<B: Backend> PatchNorm<B> {
    fn new(channels: usize, normalize: bool, device: &Device<B>) -> Self {
        if normalize {
            Self::Instance(
                InstanceNormConfig::new(channels)
                    .with_affine(false)
                    .init(device),
            )
        } else {
            Self::Identity(Identity::new())
        }
    }

    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        match self {
            Self::Instance(norm) => norm.forward(x),
            Self::Identity(identity) => identity.forward(x),
        }
    }
}

/// Configuration for the `PatchConvBlock` module.
#[derive(Config, Debug)]
pub struct PatchConvBlockConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of output channels.
    pub out_channels: usize,
    /// Whether to apply instance normalization after the convolution.
    #[config(default = "true")]
    pub normalize: bool,
    /// Negative slope of the leaky ReLU.
    #[config(default = "0.2")]
    pub negative_slope: f64,
}

impl PatchConvBlockConfig {
    /// Initializes a new `PatchConvBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> PatchConvBlock<B> {
        let conv = Conv2dConfig::new([self.in_channels, self.out_channels], [4, 4])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .with_bias(false)
            .init(device);
        let norm = PatchNorm::new(self.out_channels, self.normalize, device);
        let activation = LeakyReluConfig::new()
            .with_negative_slope(self.negative_slope)
            .init();

        PatchConvBlock {
            conv,
            norm,
            activation,
        }
    }
}

/// A 4x4 stride-2 convolution, optional instance norm, then leaky ReLU.
///
/// Maps `[N, in, H, W]` to `[N, out, floor(H / 2), floor(W / 2)]`.
#[derive(Module, Debug)]
pub struct PatchConvBlock<B: Backend> {
    pub(crate) conv: Conv2d<B>,
    norm: PatchNorm<B>,
    activation: LeakyRelu,
}

impl<B: Backend> PatchConvBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.norm.forward(x);

        self.activation.forward(x)
    }

    /// Whether this block normalizes its convolution output.
    pub fn is_normalized(&self) -> bool {
        matches!(self.norm, PatchNorm::Instance(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::Distribution};

    type TestBackend = NdArray<f32>;

    #[test]
    fn halves_spatial_size() {
        let device = Default::default();
        let block = PatchConvBlockConfig::new(3, 32).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::random([2, 3, 64, 48], Distribution::Default, &device);

        assert_eq!(block.forward(x).dims(), [2, 32, 32, 24]);
    }

    #[test]
    fn odd_spatial_size_is_floored() {
        let device = Default::default();
        let block = PatchConvBlockConfig::new(2, 4).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::random([1, 2, 7, 9], Distribution::Default, &device);

        assert_eq!(block.forward(x).dims(), [1, 4, 3, 4]);
    }

    #[test]
    fn unnormalized_block_is_conv_then_leaky_relu() {
        let device = Default::default();
        let block = PatchConvBlockConfig::new(3, 8)
            .with_normalize(false)
            .init::<TestBackend>(&device);
        let x =
            Tensor::<TestBackend, 4>::random([1, 3, 16, 16], Distribution::Normal(0.0, 1.0), &device);

        let expected = LeakyReluConfig::new()
            .with_negative_slope(0.2)
            .init()
            .forward(block.conv.forward(x.clone()));
        let output = block.forward(x);

        assert!(!block.is_normalized());
        output.to_data().assert_eq(&expected.to_data(), true);
    }

    #[test]
    fn normalized_block_differs_from_raw_path() {
        let device = Default::default();
        let block = PatchConvBlockConfig::new(3, 8).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::random(
            [1, 3, 16, 16],
            Distribution::Normal(5.0, 1.0),
            &device,
        );

        let raw = LeakyReluConfig::new()
            .with_negative_slope(0.2)
            .init()
            .forward(block.conv.forward(x.clone()));
        let output = block.forward(x);

        assert!(block.is_normalized());
        let diff = (output - raw).abs().sum().into_scalar();
        assert!(diff > 1e-3);
    }

    #[test]
    fn instance_norm_has_no_learned_parameters() {
        let device = Default::default();
        let with_norm = PatchConvBlockConfig::new(32, 64).init::<TestBackend>(&device);
        let without_norm = PatchConvBlockConfig::new(32, 64)
            .with_normalize(false)
            .init::<TestBackend>(&device);

        assert_eq!(with_norm.num_params(), 64 * 32 * 4 * 4);
        assert_eq!(without_norm.num_params(), with_norm.num_params());
        assert!(with_norm.conv.bias.is_none());
    }
}
