//! Walking an RGBA buffer: matched pixels are collected per reference,
//! unmatched pixels are turned gray in place.

use log::trace;
use palette::Srgb;

use crate::average::{MeanColor, average};
use crate::classify::{Classifier, Tolerance};
use crate::error::{Result, SwatchError};
use crate::hsl::to_hsl;
use crate::reference::ReferencePalette;

/// Matched colors per reference, in palette order, plus pass counters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchAccumulator {
    classes: Vec<Vec<Srgb<u8>>>,
    pub desaturated: usize,
    pub transparent: usize,
}

impl MatchAccumulator {
    fn with_classes(n: usize) -> Self {
        Self {
            classes: vec![Vec::new(); n],
            ..Default::default()
        }
    }

    /// Colors matched to reference `index`, in scan order.
    pub fn class(&self, index: usize) -> &[Srgb<u8>] {
        self.classes.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn matched(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    /// Mean color of class `index`, labelled with the reference name when empty.
    pub fn average_of(&self, index: usize, palette: &ReferencePalette) -> Result<MeanColor> {
        average(self.class(index)).map_err(|err| match err {
            SwatchError::EmptyClass { .. } => SwatchError::EmptyClass {
                name: palette
                    .get(index)
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| index.to_string()),
            },
            other => other,
        })
    }
}

/// A scan that may be fed the buffer in several pixel-aligned pieces,
/// so a caller can yield between them. Feeding the whole buffer at once
/// is the same as [`scan`].
pub struct ScanPass<'a> {
    palette: &'a ReferencePalette,
    tolerance: Tolerance,
    classifier: Classifier,
    acc: MatchAccumulator,
}

impl<'a> ScanPass<'a> {
    pub fn new(palette: &'a ReferencePalette, tolerance: Tolerance, classifier: Classifier) -> Self {
        Self {
            palette,
            tolerance,
            classifier,
            acc: MatchAccumulator::with_classes(palette.len()),
        }
    }

    pub fn feed(&mut self, chunk: &mut [u8]) -> Result<()> {
        if chunk.len() % 4 != 0 {
            return Err(SwatchError::InvalidPixelBuffer { len: chunk.len() });
        }

        for px in chunk.chunks_exact_mut(4) {
            if px[3] == 0 {
                self.acc.transparent += 1;
                continue;
            }

            let (r, g, b) = (px[0], px[1], px[2]);
            match self.classifier.classify(&to_hsl(r, g, b), self.palette, self.tolerance) {
                Some(idx) => self.acc.classes[idx].push(Srgb::new(r, g, b)),
                None => {
                    let gray = gray_level(r, g, b);
                    px[0] = gray;
                    px[1] = gray;
                    px[2] = gray;
                    self.acc.desaturated += 1;
                }
            }
        }

        trace!(
            "scanned {} pixels, {} matched so far",
            chunk.len() / 4,
            self.acc.matched()
        );
        Ok(())
    }

    pub fn finish(self) -> MatchAccumulator {
        self.acc
    }
}

/// Classify every opaque pixel of `buffer`, graying out the unmatched ones.
pub fn scan(
    buffer: &mut [u8],
    palette: &ReferencePalette,
    tolerance: Tolerance,
    classifier: Classifier,
) -> Result<MatchAccumulator> {
    let mut pass = ScanPass::new(palette, tolerance, classifier);
    pass.feed(buffer)?;
    Ok(pass.finish())
}

/// Mean of the three channels, rounded to the nearest level.
#[inline]
pub fn gray_level(r: u8, g: u8, b: u8) -> u8 {
    ((r as f64 + g as f64 + b as f64) / 3.0).round() as u8
}
