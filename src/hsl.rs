//! RGB to HSL conversion and the hue distance used by the classifier.

use palette::Srgb;

/// An HSL triple with every channel in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub const fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self { hue, saturation, lightness }
    }

    /// Absolute per-channel differences `[hue, saturation, lightness]`,
    /// with the hue measured by `metric`.
    pub fn differences(&self, other: &Hsl, metric: HueDistance) -> [f64; 3] {
        [
            metric.distance(self.hue, other.hue),
            (self.saturation - other.saturation).abs(),
            (self.lightness - other.lightness).abs(),
        ]
    }
}

impl From<Srgb<u8>> for Hsl {
    fn from(rgb: Srgb<u8>) -> Self {
        to_hsl(rgb.red, rgb.green, rgb.blue)
    }
}

/// Convert 8-bit RGB to HSL.
///
/// Lightness is the midpoint of the largest and smallest channel. When all
/// channels are equal the color is achromatic and hue and saturation are 0.
/// Otherwise the hue is taken from whichever channel is largest (red wins
/// ties, then green) and scaled from sixths of the wheel into [0, 1].
pub fn to_hsl(r: u8, g: u8, b: u8) -> Hsl {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;

    if max == min {
        return Hsl::new(0.0, 0.0, lightness);
    }

    let d = max - min;
    let saturation = if lightness > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let sextant = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl::new(sextant / 6.0, saturation, lightness)
}

/// How the distance between two hues in [0, 1] is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HueDistance {
    /// Plain `|a - b|`. Hues just above 0 and just below 1 look far apart.
    Linear,
    /// Shortest way round the color wheel, at most 0.5.
    #[default]
    Circular,
}

impl HueDistance {
    #[inline]
    pub fn distance(self, a: f64, b: f64) -> f64 {
        let d = (a - b).abs();
        match self {
            HueDistance::Linear => d,
            HueDistance::Circular => d.min(1.0 - d),
        }
    }
}

impl std::str::FromStr for HueDistance {
    type Err = crate::SwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(HueDistance::Linear),
            "circular" => Ok(HueDistance::Circular),
            other => Err(crate::SwatchError::UnknownOption {
                kind: "hue distance",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_points() {
        assert_eq!(to_hsl(255, 255, 255), Hsl::new(0.0, 0.0, 1.0));
        assert_eq!(to_hsl(0, 0, 0), Hsl::new(0.0, 0.0, 0.0));
        assert_eq!(to_hsl(255, 0, 0), Hsl::new(0.0, 1.0, 0.5));
    }

    #[test]
    fn primary_hues() {
        let green = to_hsl(0, 255, 0);
        assert!((green.hue - 1.0 / 3.0).abs() < 1e-12);
        let blue = to_hsl(0, 0, 255);
        assert!((blue.hue - 2.0 / 3.0).abs() < 1e-12);
        // magenta-ish: red is max and green < blue, so the hue wraps up near 1
        let rose = to_hsl(255, 0, 128);
        assert!(rose.hue > 0.9 && rose.hue < 1.0);
    }

    #[test]
    fn light_colors_use_upper_saturation_branch() {
        let pink = to_hsl(247, 168, 184);
        assert!(pink.lightness > 0.5);
        let expected = (79.0 / 255.0) / (2.0 - 247.0 / 255.0 - 168.0 / 255.0);
        assert!((pink.saturation - expected).abs() < 1e-12);
    }

    #[test]
    fn circular_distance_wraps() {
        assert!((HueDistance::Circular.distance(0.02, 0.98) - 0.04).abs() < 1e-12);
        assert!((HueDistance::Linear.distance(0.02, 0.98) - 0.96).abs() < 1e-12);
        assert_eq!(HueDistance::Circular.distance(0.25, 0.75), 0.5);
    }

    #[test]
    fn parses_metric_names() {
        assert_eq!("Linear".parse::<HueDistance>().unwrap(), HueDistance::Linear);
        assert_eq!(" circular ".parse::<HueDistance>().unwrap(), HueDistance::Circular);
        assert!("euclid".parse::<HueDistance>().is_err());
    }
}
