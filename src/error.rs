//! Error types for swatch matching.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SwatchError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwatchError {
    /// No pixel was matched to the named reference during a pass.
    #[error("no pixels matched reference `{name}`")]
    EmptyClass { name: String },

    /// RGBA buffers hold four bytes per pixel.
    #[error("pixel buffer length {len} is not a multiple of 4")]
    InvalidPixelBuffer { len: usize },

    /// Tolerance must lie in [0, 1].
    #[error("tolerance {value} is outside [0, 1]")]
    InvalidTolerance { value: f64 },

    /// A reference color could not be parsed.
    #[error("invalid color `{spec}`: {reason}")]
    InvalidColor { spec: String, reason: String },

    /// Unknown classification policy or hue metric name.
    #[error("unknown {kind} `{value}`")]
    UnknownOption { kind: &'static str, value: String },
}

impl SwatchError {
    /// Whether the condition is reported as data rather than failing a redraw.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SwatchError::EmptyClass { .. })
    }
}
