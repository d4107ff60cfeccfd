//! Deciding which reference, if any, a pixel belongs to.

use crate::error::{Result, SwatchError};
use crate::hsl::{Hsl, HueDistance};
use crate::reference::ReferencePalette;

/// Matching tolerance in [0, 1], applied to every reference in a pass.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Tolerance(f64);

impl Tolerance {
    /// Only exact HSL matches are accepted.
    pub const EXACT: Tolerance = Tolerance(0.0);
    pub const ANY: Tolerance = Tolerance(1.0);

    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SwatchError::InvalidTolerance { value })
        }
    }

    /// Scale a slider percentage (0-100) down to [0, 1].
    pub fn from_percent(percent: u32) -> Result<Self> {
        Self::new(percent as f64 / 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance(0.2)
    }
}

/// Which reference a pixel is tested against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Pick the reference nearest in hue (earliest on ties), then accept only
    /// if hue, saturation and lightness all lie within tolerance of it.
    #[default]
    NearestHue,
    /// Walk the palette in order and take the first reference whose mean
    /// channel difference is within tolerance.
    FirstMatch,
}

impl std::str::FromStr for MatchPolicy {
    type Err = SwatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "nearest-hue" | "nearest" => Ok(MatchPolicy::NearestHue),
            "first-match" | "first" => Ok(MatchPolicy::FirstMatch),
            other => Err(SwatchError::UnknownOption {
                kind: "match policy",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Classifier {
    pub policy: MatchPolicy,
    pub hue_distance: HueDistance,
}

impl Classifier {
    pub fn new(policy: MatchPolicy, hue_distance: HueDistance) -> Self {
        Self { policy, hue_distance }
    }

    /// Index of the matched reference, or `None` when the pixel is unmatched.
    pub fn classify(
        &self,
        pixel: &Hsl,
        palette: &ReferencePalette,
        tolerance: Tolerance,
    ) -> Option<usize> {
        match self.policy {
            MatchPolicy::NearestHue => self.nearest_hue(pixel, palette, tolerance.value()),
            MatchPolicy::FirstMatch => self.first_match(pixel, palette, tolerance.value()),
        }
    }

    fn nearest_hue(&self, pixel: &Hsl, palette: &ReferencePalette, tolerance: f64) -> Option<usize> {
        let mut nearest: Option<(usize, f64)> = None;
        for (idx, reference) in palette.iter().enumerate() {
            let d = self.hue_distance.distance(pixel.hue, reference.hsl.hue);
            // strict comparison keeps the earliest entry on ties
            if nearest.is_none_or(|(_, best)| d < best) {
                nearest = Some((idx, d));
            }
        }

        let (idx, _) = nearest?;
        let reference = palette.get(idx)?;
        pixel
            .differences(&reference.hsl, self.hue_distance)
            .iter()
            .all(|&d| d <= tolerance)
            .then_some(idx)
    }

    fn first_match(&self, pixel: &Hsl, palette: &ReferencePalette, tolerance: f64) -> Option<usize> {
        palette.iter().position(|reference| {
            let [h, s, l] = pixel.differences(&reference.hsl, self.hue_distance);
            (h + s + l) / 3.0 <= tolerance
        })
    }
}
