//! U-Net generator and patch critic for adversarial image colorization.
//!
//! Both networks are plain Burn modules configured through Burn configs:
//!
//! - [`Generator`] maps `[N, 1, H, W]` to `[N, 2, H, W]` for `H` and `W`
//!   divisible by 16.
//! - [`Critic`] maps `[N, 3, H, W]` to a grid of per-patch scores
//!   `[N, 1, H', W']`.
//!
//! Training, losses and checkpoint formats are left to the caller; the
//! parameters of both networks are reachable through Burn's `Module` trait.

mod error;
mod models;

pub use error::{ColorGanError, ColorGanResult};
pub use models::{
    ColorGan, ColorGanConfig, ColorGanRecord, Critic, CriticConfig, CriticRecord, DecoderStage,
    DecoderStageConfig, DoubleConvBlock, DoubleConvBlockConfig, EncoderStage, EncoderStageConfig,
    Generator, GeneratorConfig, GeneratorRecord, PatchConvBlock, PatchConvBlockConfig, PatchNorm,
    MAX_CRITIC_DEPTH, MAX_GENERATOR_DEPTH,
};
