//! Identity module implementation

use burn::{
    module::Module,
    tensor::{backend::Backend, Tensor},
};

/// A module that hands its input back untouched.
///
/// Useful as the "off" arm of an enum of layers, so that the choice between
/// a real layer and no layer is made once at construction.
#[derive(Module, Clone, Debug, Default)]
pub struct Identity {}

impl Identity {
    /// Creates a new `Identity` module.
    pub const fn new() -> Self {
        Self {}
    }

    pub const fn forward<B: Backend, const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, D> {
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{ndarray::NdArray, Autodiff},
        tensor::Distribution,
    };

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn identity_returns_input_values() {
        let device = Default::default();
        let identity = Identity::new();
        let input =
            Tensor::<TestBackend, 4>::random([2, 3, 5, 7], Distribution::Normal(0.0, 1.0), &device);

        let output = identity.forward(input.clone());

        assert_eq!(output.dims(), [2, 3, 5, 7]);
        output.to_data().assert_eq(&input.to_data(), true);
    }

    #[test]
    fn identity_has_no_parameters() {
        let identity = Identity::new();
        assert_eq!(Module::<TestBackend>::num_params(&identity), 0);
    }
}
