//! Reference colors that pixels are matched against.

use palette::Srgb;

use crate::error::{Result, SwatchError};
use crate::hsl::Hsl;

/// A named reference color with its HSL form precomputed.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    pub name: String,
    pub rgb: Srgb<u8>,
    pub hsl: Hsl,
}

impl Reference {
    pub fn new(name: impl Into<String>, rgb: Srgb<u8>) -> Self {
        Self {
            name: name.into(),
            hsl: Hsl::from(rgb),
            rgb,
        }
    }
}

/// Ordered, immutable set of references. Declaration order is significant:
/// it decides ties and first-match classification.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferencePalette {
    entries: Vec<Reference>,
}

impl ReferencePalette {
    pub fn new<N, I>(colors: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Srgb<u8>)>,
    {
        Self {
            entries: colors
                .into_iter()
                .map(|(name, rgb)| Reference::new(name, rgb))
                .collect(),
        }
    }

    /// Light blue, pink and white stripes.
    pub fn trans_flag() -> Self {
        Self::new([
            ("blue", Srgb::new(85, 205, 252)),
            ("pink", Srgb::new(247, 168, 184)),
            ("white", Srgb::new(255, 255, 255)),
        ])
    }

    /// Build a palette from `name=#RRGGBB` strings. An entry without a name
    /// is named after its upper-case hex digits.
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self> {
        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            let spec = spec.as_ref().trim();
            let (name, hex) = match spec.split_once('=') {
                Some((name, hex)) => (name.trim().to_string(), hex.trim()),
                None => (spec.trim_start_matches('#').to_uppercase(), spec),
            };
            if name.is_empty() {
                return Err(SwatchError::InvalidColor {
                    spec: spec.to_string(),
                    reason: "empty name".to_string(),
                });
            }
            entries.push(Reference::new(name, parse_hex(hex)?));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Reference> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ReferencePalette {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Parse `#RRGGBB` or `RRGGBB`.
pub fn parse_hex(s: &str) -> Result<Srgb<u8>> {
    let invalid = |reason: &str| SwatchError::InvalidColor {
        spec: s.to_string(),
        reason: reason.to_string(),
    };

    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid("hex color must be 6 characters"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| invalid("invalid hex digit"))
    };
    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precomputes_hsl() {
        let palette = ReferencePalette::trans_flag();
        assert_eq!(palette.len(), 3);
        let white = palette.get(2).unwrap();
        assert_eq!(white.name, "white");
        assert_eq!(white.hsl, Hsl::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn parses_named_and_bare_specs() {
        let palette = ReferencePalette::from_specs(&["blue=#55CDFC", "f7a8b8"]).unwrap();
        assert_eq!(palette.get(0).unwrap().name, "blue");
        assert_eq!(palette.get(0).unwrap().rgb, Srgb::new(85, 205, 252));
        assert_eq!(palette.get(1).unwrap().name, "F7A8B8");
        assert_eq!(palette.get(1).unwrap().rgb, Srgb::new(247, 168, 184));
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#12345G").is_err());
        assert!(parse_hex("#ééé").is_err());
        assert!(ReferencePalette::from_specs(&["=#FFFFFF"]).is_err());
    }
}
