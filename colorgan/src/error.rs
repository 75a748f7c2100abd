use thiserror::Error;

/// The error type for `colorgan` operations.
///
/// Forward passes through the raw `forward` methods never produce this type:
/// a shape mismatch there panics inside Burn. These variants come from
/// configuration validation and from the checked `try_forward` entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorGanError {
    /// Error for when a network configuration cannot produce a working model.
    #[error("Invalid model configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },

    /// Error for when an input tensor has a shape the network cannot consume.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },
}

/// A specialized `Result` type for `colorgan` operations.
pub type ColorGanResult<T> = Result<T, ColorGanError>;
