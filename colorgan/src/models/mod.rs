//! # Model Architectures
//!
//! - `modules`: building blocks shared by the networks (double convolution,
//!   U-Net encoder/decoder stages, patch convolution).
//! - `generator`: the U-Net generator.
//! - `critic`: the patch critic.
//! - `colorgan`: both networks paired for a trainer.

pub mod colorgan;
pub mod critic;
pub mod generator;
pub mod modules;

pub use colorgan::*;
pub use critic::*;
pub use generator::*;
pub use modules::*;
