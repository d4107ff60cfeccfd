use wasm_bindgen::prelude::*;
use image::{DynamicImage, ImageFormat, RgbaImage, imageops::FilterType};
use js_sys::{Array, Object, Reflect, Uint8Array};
use log::{debug, warn};

pub mod average;
pub mod classify;
pub mod error;
pub mod hsl;
pub mod reference;
pub mod scan;

pub use average::{MeanColor, average};
pub use classify::{Classifier, MatchPolicy, Tolerance};
pub use error::{Result, SwatchError};
pub use hsl::{Hsl, HueDistance, to_hsl};
pub use reference::{Reference, ReferencePalette};
pub use scan::{MatchAccumulator, ScanPass, scan};

/// Average color of the pixels matched to one reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Swatch {
    pub name: String,
    /// `None` when nothing matched the reference this pass.
    pub average: Option<MeanColor>,
    pub count: usize,
}

impl Swatch {
    pub fn css(&self) -> Option<String> {
        self.average.map(|c| c.css())
    }
}

/// Run one full classification pass over an RGBA `buffer`.
///
/// Unmatched opaque pixels are grayed in place. The result has one swatch
/// per palette entry, in palette order; a reference nothing matched gets an
/// empty swatch instead of failing the whole call.
pub fn redraw(
    buffer: &mut [u8],
    palette: &ReferencePalette,
    tolerance: Tolerance,
    classifier: Classifier,
) -> Result<Vec<Swatch>> {
    let acc = scan(buffer, palette, tolerance, classifier)?;

    debug!(
        "redraw at tolerance {}: {} matched, {} desaturated, {} transparent",
        tolerance.value(),
        acc.matched(),
        acc.desaturated,
        acc.transparent
    );

    palette
        .iter()
        .enumerate()
        .map(|(idx, reference)| {
            let average = match acc.average_of(idx, palette) {
                Ok(mean) => Some(mean),
                Err(err) if err.is_recoverable() => {
                    warn!("{err}");
                    None
                }
                Err(err) => return Err(err),
            };
            Ok(Swatch {
                name: reference.name.clone(),
                average,
                count: acc.class(idx).len(),
            })
        })
        .collect()
}

// ------------------------------------------------------------
// Drawing surface helpers
// ------------------------------------------------------------

/// How an image is drawn onto a fixed-size surface before scanning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SurfaceFit {
    /// Scale to fit entirely inside the surface, keeping the aspect ratio.
    #[default]
    Contain,
    /// Scale to cover the surface and crop the overflow around the center.
    Cover,
}

impl std::str::FromStr for SurfaceFit {
    type Err = SwatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contain" => Ok(SurfaceFit::Contain),
            "cover" => Ok(SurfaceFit::Cover),
            other => Err(SwatchError::UnknownOption {
                kind: "surface fit",
                value: other.to_string(),
            }),
        }
    }
}

pub fn fit_to_surface(img: &DynamicImage, width: u32, height: u32, fit: SurfaceFit) -> DynamicImage {
    let (width, height) = (width.max(1), height.max(1));
    match fit {
        SurfaceFit::Contain => img.resize(width, height, FilterType::Triangle),
        SurfaceFit::Cover => img.resize_to_fill(width, height, FilterType::Triangle),
    }
}

/// Redraw a decoded image, returning the recolored RGBA image and swatches.
pub fn redraw_image(
    img: &DynamicImage,
    palette: &ReferencePalette,
    tolerance: Tolerance,
    classifier: Classifier,
) -> Result<(RgbaImage, Vec<Swatch>)> {
    let mut rgba = img.to_rgba8();
    let swatches = redraw(&mut rgba, palette, tolerance, classifier)?;
    Ok((rgba, swatches))
}

fn encode_png(img: RgbaImage) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

// ------------------------------------------------------------
// JavaScript bindings
// ------------------------------------------------------------

fn js_err(err: SwatchError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn palette_from_js(palette: Option<Array>) -> std::result::Result<ReferencePalette, JsValue> {
    let Some(js_palette) = palette else {
        return Ok(ReferencePalette::trans_flag());
    };
    let mut specs = Vec::new();
    for val in js_palette.iter() {
        let s = val
            .as_string()
            .ok_or_else(|| JsValue::from_str("Palette values must be strings"))?;
        specs.push(s);
    }
    ReferencePalette::from_specs(&specs).map_err(js_err)
}

fn classifier_from_js(
    policy: Option<String>,
    hue_distance: Option<String>,
) -> std::result::Result<Classifier, JsValue> {
    let policy = match policy {
        Some(p) => p.parse().map_err(js_err)?,
        None => MatchPolicy::default(),
    };
    let hue_distance = match hue_distance {
        Some(h) => h.parse().map_err(js_err)?,
        None => HueDistance::default(),
    };
    Ok(Classifier::new(policy, hue_distance))
}

fn swatches_to_js(swatches: &[Swatch]) -> std::result::Result<JsValue, JsValue> {
    let out = Array::new();
    for swatch in swatches {
        let obj = Object::new();
        Reflect::set(&obj, &JsValue::from_str("name"), &JsValue::from_str(&swatch.name))?;
        let (css, rgb) = match swatch.average {
            Some(mean) => {
                let rgb = Array::of3(
                    &JsValue::from_f64(mean.red),
                    &JsValue::from_f64(mean.green),
                    &JsValue::from_f64(mean.blue),
                );
                (JsValue::from_str(&mean.css()), JsValue::from(rgb))
            }
            None => (JsValue::NULL, JsValue::NULL),
        };
        Reflect::set(&obj, &JsValue::from_str("css"), &css)?;
        Reflect::set(&obj, &JsValue::from_str("rgb"), &rgb)?;
        Reflect::set(
            &obj,
            &JsValue::from_str("count"),
            &JsValue::from_f64(swatch.count as f64),
        )?;
        out.push(&obj);
    }
    Ok(out.into())
}

/// Classify the pixels of a canvas `ImageData` buffer in place. The slice is
/// copied back into the caller's `Uint8ClampedArray` when the call returns.
///
/// `tolerance_percent` is the slider value (0-100). `palette` is an optional
/// array of `"name=#RRGGBB"` strings and defaults to the trans flag stripes.
/// `policy` is `"nearest-hue"` (default) or `"first-match"`; `hue_distance`
/// is `"circular"` (default) or `"linear"`.
///
/// Returns `{ swatches: [{ name, css, rgb, count }] }` where `css` and `rgb`
/// are `null` for references nothing matched.
#[wasm_bindgen]
pub fn redraw_image_data(
    data: &mut [u8],
    tolerance_percent: u32,
    palette: Option<Array>,
    policy: Option<String>,
    hue_distance: Option<String>,
) -> std::result::Result<Object, JsValue> {
    let tolerance = Tolerance::from_percent(tolerance_percent).map_err(js_err)?;
    let palette = palette_from_js(palette)?;
    let classifier = classifier_from_js(policy, hue_distance)?;

    let swatches = redraw(data, &palette, tolerance, classifier).map_err(js_err)?;

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("swatches"), &swatches_to_js(&swatches)?)?;
    Ok(result)
}

/// Decode an encoded image, classify it and return `{ image, swatches }`
/// where `image` holds the recolored picture as PNG bytes.
#[wasm_bindgen]
pub fn redraw_encoded(
    input: Vec<u8>,
    tolerance_percent: u32,
    palette: Option<Array>,
    policy: Option<String>,
    hue_distance: Option<String>,
) -> std::result::Result<Object, JsValue> {
    let tolerance = Tolerance::from_percent(tolerance_percent).map_err(js_err)?;
    let palette = palette_from_js(palette)?;
    let classifier = classifier_from_js(policy, hue_distance)?;

    let img = image::load_from_memory(&input)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))?;
    let (recolored, swatches) =
        redraw_image(&img, &palette, tolerance, classifier).map_err(js_err)?;
    let encoded =
        encode_png(recolored).map_err(|e| JsValue::from_str(&format!("PNG encode error: {e}")))?;

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("image"), &Uint8Array::from(encoded.as_slice()))?;
    Reflect::set(&result, &JsValue::from_str("swatches"), &swatches_to_js(&swatches)?)?;
    Ok(result)
}

// ------------------------------------------------------------
// Native entry point
// ------------------------------------------------------------

/// Decode `input`, optionally draw it onto a `(fit, width, height)` surface,
/// classify it and return the recolored image as PNG with its swatches.
#[cfg(feature = "native-bin")]
pub fn redraw_image_bytes(
    input: &[u8],
    palette: &ReferencePalette,
    tolerance: Tolerance,
    classifier: Classifier,
    surface: Option<(SurfaceFit, u32, u32)>,
) -> anyhow::Result<(Vec<u8>, Vec<Swatch>)> {
    use anyhow::Context;

    let mut img = image::load_from_memory(input).context("unable to decode image")?;
    if let Some((fit, width, height)) = surface {
        img = fit_to_surface(&img, width, height, fit);
    }
    let (recolored, swatches) = redraw_image(&img, palette, tolerance, classifier)?;
    let png = encode_png(recolored).context("PNG encode error")?;
    Ok((png, swatches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::Srgb;

    #[test]
    fn redraw_reports_every_reference_in_order() {
        let palette = ReferencePalette::trans_flag();
        let mut buf = vec![85, 205, 252, 255, 85, 205, 252, 255, 0, 0, 0, 255];
        let swatches = redraw(&mut buf, &palette, Tolerance::default(), Classifier::default()).unwrap();

        let names: Vec<_> = swatches.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["blue", "pink", "white"]);
        assert_eq!(swatches[0].count, 2);
        assert_eq!(swatches[0].css().as_deref(), Some("rgb(85,205,252)"));
        assert_eq!(swatches[1].average, None);
        assert_eq!(swatches[2].average, None);
    }

    #[test]
    fn redraw_rejects_bad_buffer_untouched() {
        let palette = ReferencePalette::trans_flag();
        let mut buf = vec![1, 2, 3, 255, 9];
        let err = redraw(&mut buf, &palette, Tolerance::default(), Classifier::default()).unwrap_err();
        assert_eq!(err, SwatchError::InvalidPixelBuffer { len: 5 });
        assert_eq!(buf, vec![1, 2, 3, 255, 9]);
    }

    #[test]
    fn redraw_image_leaves_source_alone() {
        let mut src = RgbaImage::new(2, 1);
        src.put_pixel(0, 0, image::Rgba([247, 168, 184, 255]));
        src.put_pixel(1, 0, image::Rgba([30, 60, 90, 255]));
        let img = DynamicImage::ImageRgba8(src.clone());

        let (out, swatches) = redraw_image(
            &img,
            &ReferencePalette::trans_flag(),
            Tolerance::default(),
            Classifier::default(),
        )
        .unwrap();

        assert_eq!(out.get_pixel(0, 0).0, [247, 168, 184, 255]);
        assert_eq!(out.get_pixel(1, 0).0, [60, 60, 60, 255]);
        assert_eq!(img.to_rgba8(), src);
        assert_eq!(swatches[1].average.map(MeanColor::to_srgb8), Some(Srgb::new(247, 168, 184)));
    }

    #[test]
    fn image_data_entry_takes_plain_mutable_slice() {
        let _entry: fn(
            &mut [u8],
            u32,
            Option<Array>,
            Option<String>,
            Option<String>,
        ) -> std::result::Result<Object, JsValue> = redraw_image_data;
        let _encoded: fn(
            Vec<u8>,
            u32,
            Option<Array>,
            Option<String>,
            Option<String>,
        ) -> std::result::Result<Object, JsValue> = redraw_encoded;
    }

    #[test]
    fn only_empty_classes_are_absorbed() {
        assert!(SwatchError::EmptyClass { name: "pink".into() }.is_recoverable());
        assert!(!SwatchError::InvalidPixelBuffer { len: 3 }.is_recoverable());
        assert!(!SwatchError::InvalidTolerance { value: 2.0 }.is_recoverable());

        let mut buf = vec![247, 168, 184, 255];
        let palette = ReferencePalette::trans_flag();
        let swatches = redraw(&mut buf, &palette, Tolerance::default(), Classifier::default()).unwrap();
        assert_eq!(swatches.len(), 3);
        assert_eq!(swatches[0].average, None);
        assert!(swatches[1].average.is_some());
    }

    #[test]
    fn surface_fits() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(40, 20));
        let contained = fit_to_surface(&img, 10, 10, SurfaceFit::Contain);
        assert_eq!((contained.width(), contained.height()), (10, 5));
        let covered = fit_to_surface(&img, 10, 10, SurfaceFit::Cover);
        assert_eq!((covered.width(), covered.height()), (10, 10));
        assert_eq!("COVER".parse::<SurfaceFit>().unwrap(), SurfaceFit::Cover);
    }

    #[test]
    fn png_encoding_round_trips_dimensions() {
        let png = encode_png(RgbaImage::new(3, 2)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }
}
