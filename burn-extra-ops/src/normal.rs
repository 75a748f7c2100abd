//! # Normal Re-initialization
//!
//! Resamples an already-allocated parameter from a normal distribution. Burn's
//! `Initializer` only applies while a layer is being built; these helpers cover
//! the case where the whole network exists first and its weights are drawn
//! afterwards in a fixed order.

use burn::{module::Param, prelude::*, tensor::Distribution};

/// Returns a tensor shaped like `x` filled with samples from `N(mean, std²)`.
pub fn normal<B: Backend, const D: usize>(x: Tensor<B, D>, mean: f64, std: f64) -> Tensor<B, D> {
    x.random_like(Distribution::Normal(mean, std))
}

/// Replaces the values of `param` with samples from `N(mean, std²)`.
///
/// The parameter keeps its id and its `require_grad` flag, so an optimizer
/// state keyed on the parameter stays valid.
pub fn normal_<B: Backend, const D: usize>(
    param: Param<Tensor<B, D>>,
    mean: f64,
    std: f64,
) -> Param<Tensor<B, D>> {
    param.map(|tensor| normal(tensor, mean, std))
}
