use burn::prelude::*;
use serde_json::Value;

use super::{Critic, CriticConfig, Generator, GeneratorConfig};
use crate::error::{ColorGanError, ColorGanResult};

/// Configuration for a generator and critic built together.
#[derive(Config, Debug)]
pub struct ColorGanConfig {
    #[config(default = "GeneratorConfig::new()")]
    pub generator: GeneratorConfig,
    #[config(default = "CriticConfig::new()")]
    pub critic: CriticConfig,
}

impl ColorGanConfig {
    /// Validates both halves.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by the generator or critic config.
    pub fn validate(&self) -> ColorGanResult<()> {
        self.generator.validate()?;
        self.critic.validate()
    }

    /// Parses a JSON config in which any field may be left out.
    ///
    /// Missing fields, at any nesting level, take their `#[config(default)]`
    /// value. Burn's own `Config::load` requires every field to be present.
    ///
    /// # Errors
    ///
    /// Returns `Err(ColorGanError::InvalidConfiguration)` for malformed JSON,
    /// a field of the wrong type, or a result that fails [`Self::validate`].
    pub fn from_json(json: &str) -> ColorGanResult<Self> {
        let malformed = |err: serde_json::Error| ColorGanError::InvalidConfiguration {
            reason: format!("Malformed config JSON: {err}"),
        };

        let mut merged = serde_json::to_value(Self::new()).map_err(malformed)?;
        let overrides: Value = serde_json::from_str(json).map_err(malformed)?;
        merge_json(&mut merged, overrides);

        let config: Self = serde_json::from_value(merged).map_err(malformed)?;
        config.validate()?;

        Ok(config)
    }

    /// Initializes both networks on `device`.
    ///
    /// # Errors
    ///
    /// Returns an error if either configuration is invalid.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ColorGanResult<ColorGan<B>> {
        Ok(ColorGan {
            generator: self.generator.init(device)?,
            critic: self.critic.init(device)?,
        })
    }
}

/// Overlays `overrides` onto `base`, descending into objects present in both.
fn merge_json(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, value) => *base = value,
    }
}

/// The two adversaries of a colorization setup, kept in one module so a
/// trainer can record or move them as a unit.
#[derive(Module, Debug)]
pub struct ColorGan<B: Backend> {
    pub generator: Generator<B>,
    pub critic: Critic<B>,
}

impl<B: Backend> ColorGan<B> {
    /// Scores the colorization of `lightness`: the generator predicts the
    /// missing channels, which are stacked after the input and handed to the
    /// critic.
    ///
    /// Returns `(predicted, scores)`. This only lines up when the critic's
    /// input channels equal the generator's input plus output channels.
    pub fn forward(&self, lightness: Tensor<B, 4>) -> (Tensor<B, 4>, Tensor<B, 4>) {
        let predicted = self.generator.forward(lightness.clone());
        let scores = self
            .critic
            .forward(Tensor::cat(vec![lightness, predicted.clone()], 1));

        (predicted, scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::Distribution};

    type TestBackend = NdArray<f32>;

    #[test]
    fn generator_output_feeds_the_critic() {
        let device = Default::default();
        let model = ColorGanConfig::new()
            .with_generator(GeneratorConfig::new().with_channels(vec![4, 8, 16, 32]))
            .with_critic(CriticConfig::new().with_channels(vec![4, 8, 8, 8, 8]))
            .init::<TestBackend>(&device)
            .unwrap();
        let lightness =
            Tensor::<TestBackend, 4>::random([2, 1, 128, 128], Distribution::Default, &device);

        let (predicted, scores) = model.forward(lightness);

        assert_eq!(predicted.dims(), [2, 2, 128, 128]);
        assert_eq!(scores.dims(), [2, 1, 1, 1]);
    }
}
