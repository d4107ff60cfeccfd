//! Reducing a class's matched pixels to one swatch color.

use palette::Srgb;

use crate::error::{Result, SwatchError};

/// Component-wise mean of 8-bit colors, kept unrounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeanColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl MeanColor {
    pub fn to_srgb8(self) -> Srgb<u8> {
        let quantize = |c: f64| c.round().clamp(0.0, 255.0) as u8;
        Srgb::new(quantize(self.red), quantize(self.green), quantize(self.blue))
    }

    /// CSS `rgb()` value for a swatch background.
    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.red, self.green, self.blue)
    }
}

/// Arithmetic mean of `colors`. Fails with [`SwatchError::EmptyClass`] when
/// there is nothing to average.
pub fn average(colors: &[Srgb<u8>]) -> Result<MeanColor> {
    if colors.is_empty() {
        return Err(SwatchError::EmptyClass { name: String::new() });
    }

    let (mut red, mut green, mut blue) = (0u64, 0u64, 0u64);
    for c in colors {
        red += c.red as u64;
        green += c.green as u64;
        blue += c.blue as u64;
    }

    let n = colors.len() as f64;
    Ok(MeanColor {
        red: red as f64 / n,
        green: green as f64 / n,
        blue: blue as f64 / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_components() {
        let mean = average(&[Srgb::new(10, 20, 30), Srgb::new(20, 30, 40)]).unwrap();
        assert_eq!(mean, MeanColor { red: 15.0, green: 25.0, blue: 35.0 });
        assert_eq!(mean.css(), "rgb(15,25,35)");
    }

    #[test]
    fn keeps_fractions_until_quantized() {
        let mean = average(&[Srgb::new(0, 0, 255), Srgb::new(1, 0, 0)]).unwrap();
        assert_eq!(mean.css(), "rgb(0.5,0,127.5)");
        assert_eq!(mean.to_srgb8(), Srgb::new(1, 0, 128));
    }

    #[test]
    fn empty_is_an_error() {
        let err = average(&[]).unwrap_err();
        assert!(matches!(err, SwatchError::EmptyClass { .. }));
        assert!(err.is_recoverable());
    }
}
