//! Shared setup for the colorgan demo binaries.
//!
//! ```bash
//! # Print both networks and the shapes they produce for a 256x256 image
//! cargo run --bin print -- --size 256
//!
//! # Time 20 generator and critic passes
//! cargo run --release --bin bench -- --iterations 20
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use burn::backend::NdArray;
use colorgan::ColorGanConfig;
use log::LevelFilter;

/// Backend used by every demo.
pub type DemoBackend = NdArray<f32>;

/// Installs a stderr logger at `level`.
pub fn init_logging(level: LevelFilter) {
    simple_logging::log_to_stderr(level);
}

/// Loads a JSON model config, or the default topology when `path` is `None`.
/// Fields missing from the file keep their default values.
pub fn load_config(path: Option<&Path>) -> Result<ColorGanConfig> {
    let Some(path) = path else {
        return Ok(ColorGanConfig::new());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    let config = ColorGanConfig::from_json(&json)
        .with_context(|| format!("invalid config in {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_file_keeps_defaults() {
        let path =
            std::env::temp_dir().join(format!("colorgan-demo-{}.json", std::process::id()));
        fs::write(&path, r#"{"generator": {"channels": [8, 16]}}"#).unwrap();

        let config = load_config(Some(&path));
        fs::remove_file(&path).unwrap();
        let config = config.unwrap();

        assert_eq!(config.generator.channels, vec![8, 16]);
        assert_eq!(config.generator.in_channels, 1);
        assert_eq!(config.critic.channels, vec![32, 64, 128, 256, 512]);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let path = std::env::temp_dir().join("colorgan-demo-does-not-exist.json");

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn no_path_means_default_topology() {
        let config = load_config(None).unwrap();

        assert_eq!(config.generator.bottleneck_channels(), 1024);
    }
}
