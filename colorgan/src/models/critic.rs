//! # Patch Critic
//!
//! A convolutional critic that scores every receptive-field patch of its
//! input instead of the image as a whole. The trainer reduces the score grid
//! in its loss.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        PaddingConfig2d,
    },
    prelude::*,
};
use burn_extra_ops::normal_;

use super::{PatchConvBlock, PatchConvBlockConfig};
use crate::error::{ColorGanError, ColorGanResult};

/// Kernel size of the unpadded scoring head.
const HEAD_KERNEL: usize = 4;

/// Most downsampling blocks a critic may have; the smallest scorable input
/// is then `4 * 2^16`.
pub const MAX_CRITIC_DEPTH: usize = 16;

/// Configuration for the `Critic` model.
#[derive(Config, Debug)]
pub struct CriticConfig {
    /// Channels of the image pair fed to the critic.
    #[config(default = "3")]
    pub in_channels: usize,
    /// Output channels of each downsampling block. The first block is never
    /// normalized.
    #[config(default = "vec![32, 64, 128, 256, 512]")]
    pub channels: Vec<usize>,
    /// Mean of the normal distribution convolution weights are drawn from.
    #[config(default = "0.0")]
    pub init_mean: f64,
    /// Standard deviation of the normal distribution convolution weights are
    /// drawn from.
    #[config(default = "0.02")]
    pub init_std: f64,
    /// Negative slope of the leaky ReLU in every block.
    #[config(default = "0.2")]
    pub negative_slope: f64,
}

impl CriticConfig {
    /// Checks that the configuration describes a buildable network.
    ///
    /// # Errors
    ///
    /// Returns `Err(ColorGanError::InvalidConfiguration)` for an empty or too
    /// long channel list, a zero width, or an initialization std that is not a positive
    /// finite number.
    pub fn validate(&self) -> ColorGanResult<()> {
        if self.channels.is_empty() {
            return Err(ColorGanError::InvalidConfiguration {
                reason: "Critic needs at least one downsampling block".to_string(),
            });
        }
        if self.channels.len() > MAX_CRITIC_DEPTH {
            return Err(ColorGanError::InvalidConfiguration {
                reason: format!(
                    "Critic depth must be <= {MAX_CRITIC_DEPTH}, got {}",
                    self.channels.len()
                ),
            });
        }
        if self.in_channels == 0 {
            return Err(ColorGanError::InvalidConfiguration {
                reason: "Critic input channels must be positive".to_string(),
            });
        }
        if let Some(block) = self.channels.iter().position(|&c| c == 0) {
            return Err(ColorGanError::InvalidConfiguration {
                reason: format!("Critic block {block} has zero channels"),
            });
        }
        if !(self.init_std.is_finite() && self.init_std > 0.0) || !self.init_mean.is_finite() {
            return Err(ColorGanError::InvalidConfiguration {
                reason: format!(
                    "Weight init needs a finite mean and positive std, got N({}, {})",
                    self.init_mean, self.init_std
                ),
            });
        }

        Ok(())
    }

    /// Initializes a `Critic` and draws all of its convolution weights from
    /// `N(init_mean, init_std²)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not pass [`Self::validate`].
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ColorGanResult<Critic<B>> {
        self.validate()?;

        let blocks = self
            .channels
            .iter()
            .enumerate()
            .map(|(index, &out_channels)| {
                let in_channels = if index == 0 {
                    self.in_channels
                } else {
                    self.channels[index - 1]
                };
                PatchConvBlockConfig::new(in_channels, out_channels)
                    .with_normalize(index != 0)
                    .with_negative_slope(self.negative_slope)
                    .init(device)
            })
            .collect();

        let last = self.channels[self.channels.len() - 1];
        let head = Conv2dConfig::new([last, 1], [HEAD_KERNEL, HEAD_KERNEL])
            .with_padding(PaddingConfig2d::Valid)
            .with_bias(false)
            .init(device);

        let mut critic = Critic {
            blocks,
            head,
            in_channels: self.in_channels,
        };
        critic.reset_conv_weights(self.init_mean, self.init_std);

        log::debug!(
            "Critic: {} -> {:?} -> 1, {} parameters, weights ~ N({}, {})",
            self.in_channels,
            self.channels,
            critic.num_params(),
            self.init_mean,
            self.init_std
        );

        Ok(critic)
    }
}

/// The patch critic.
#[derive(Module, Debug)]
pub struct Critic<B: Backend> {
    blocks: Vec<PatchConvBlock<B>>,
    head: Conv2d<B>,
    in_channels: usize,
}

impl<B: Backend> Critic<B> {
    /// Maps `[N, in, H, W]` to a score grid `[N, 1, H', W']`, see
    /// [`Self::output_size`].
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.blocks.iter().fold(x, |x, block| block.forward(x));

        self.head.forward(x)
    }

    /// Checks `x` against [`Self::check_input`] before running [`Self::forward`].
    ///
    /// # Errors
    ///
    /// Returns `Err(ColorGanError::InvalidTensorShape)` for inputs the critic
    /// cannot score.
    pub fn try_forward(&self, x: Tensor<B, 4>) -> ColorGanResult<Tensor<B, 4>> {
        if let Err(err) = self.check_input(x.dims()) {
            log::warn!("Critic rejected input: {err}");
            return Err(err);
        }

        Ok(self.forward(x))
    }

    /// Validates an input shape `[N, C, H, W]`.
    ///
    /// # Errors
    ///
    /// Returns `Err(ColorGanError::InvalidTensorShape)` if the batch is empty,
    /// the channel count is wrong, or the image is too small for the head.
    pub fn check_input(&self, dims: [usize; 4]) -> ColorGanResult<()> {
        let [batch, channels, height, width] = dims;

        if batch == 0
            || channels != self.in_channels
            || self.output_size([height, width]).is_none()
        {
            return Err(ColorGanError::InvalidTensorShape {
                expected: format!(
                    "[N > 0, {}, H, W] with H and W at least {}",
                    self.in_channels,
                    self.min_input_size()
                ),
                actual: format!("{dims:?}"),
            });
        }

        Ok(())
    }

    /// Size of the score grid for an input of `[height, width]`, or `None`
    /// when the head kernel no longer fits.
    ///
    /// Every block maps `h` to `floor(h / 2)`; the unpadded head maps `h` to
    /// `h - 3`.
    pub fn output_size(&self, size: [usize; 2]) -> Option<[usize; 2]> {
        let depth = self.blocks.len();
        let side = |mut h: usize| {
            for _ in 0..depth {
                // 4x4 kernel, stride 2, padding 1.
                if h + 2 < 4 {
                    return None;
                }
                h = (h + 2 - 4) / 2 + 1;
            }
            h.checked_sub(HEAD_KERNEL).map(|h| h + 1)
        };

        Some([side(size[0])?, side(size[1])?])
    }

    /// Smallest height or width the critic can score.
    pub fn min_input_size(&self) -> usize {
        HEAD_KERNEL << self.blocks.len()
    }

    /// Redraws every convolution weight, in network order, from
    /// `N(mean, std²)`.
    fn reset_conv_weights(&mut self, mean: f64, std: f64) {
        for conv in self.convolutions_mut() {
            conv.weight = normal_(conv.weight.clone(), mean, std);
        }
    }

    /// All convolutions of the critic: each block's, then the head.
    fn convolutions_mut(&mut self) -> Vec<&mut Conv2d<B>> {
        self.blocks
            .iter_mut()
            .map(|block| &mut block.conv)
            .chain(core::iter::once(&mut self.head))
            .collect()
    }
}
