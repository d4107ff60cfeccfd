use clap::Parser;
use std::fs;
use std::path::PathBuf;
use swatch_match_wasm::{
    Classifier, HueDistance, MatchPolicy, ReferencePalette, Swatch, SurfaceFit, Tolerance,
    redraw_image_bytes,
};
use anyhow::{Context, Result};
use serde_json::json;

/// Gray out everything that does not match a palette and report the average
/// color found for each palette entry.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Matching tolerance in percent (0-100)
    #[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(0..=100))]
    tolerance: u32,

    /// Comma-separated `name=#RRGGBB` reference colors (default: trans flag stripes)
    #[arg(short = 'c', long)]
    palette: Option<String>,

    /// `nearest-hue` or `first-match`
    #[arg(long, default_value = "nearest-hue")]
    policy: MatchPolicy,

    /// `circular` or `linear`
    #[arg(long, default_value = "circular")]
    hue_distance: HueDistance,

    /// Draw onto a surface first: `contain` or `cover` (needs --width and --height)
    #[arg(long, requires_all = ["width", "height"])]
    fit: Option<SurfaceFit>,

    /// Surface width in pixels
    #[arg(long, requires = "fit")]
    width: Option<u32>,

    /// Surface height in pixels
    #[arg(long, requires = "fit")]
    height: Option<u32>,

    /// Output directory
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// Output filename prefix (ignored when --out-dir supplied)
    #[arg(short = 'p', long, default_value = "swatched_")]
    prefix: String,

    /// Print swatches as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn swatch_json(swatch: &Swatch) -> serde_json::Value {
    json!({
        "name": swatch.name,
        "count": swatch.count,
        "rgb": swatch.average.map(|c| [c.red, c.green, c.blue]),
        "css": swatch.css(),
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let palette = match &args.palette {
        Some(s) => {
            let specs: Vec<&str> = s.split(',').map(str::trim).collect();
            ReferencePalette::from_specs(&specs).context("invalid --palette")?
        }
        None => ReferencePalette::trans_flag(),
    };
    let tolerance = Tolerance::from_percent(args.tolerance)?;
    let classifier = Classifier::new(args.policy, args.hue_distance);
    let surface = match (args.fit, args.width, args.height) {
        (Some(fit), Some(w), Some(h)) => Some((fit, w, h)),
        _ => None,
    };

    let mut report = Vec::new();
    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let (png, swatches) = redraw_image_bytes(&bytes, &palette, tolerance, classifier, surface)
            .context("swatch processing failed")?;

        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        let out_path = if let Some(dir) = &args.out_dir {
            dir.join(format!("{stem}.png"))
        } else {
            let name = format!("{}{stem}.png", args.prefix);
            input.with_file_name(name)
        };

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out_path, png)?;

        if args.json {
            report.push(json!({
                "input": input.display().to_string(),
                "output": out_path.display().to_string(),
                "swatches": swatches.iter().map(swatch_json).collect::<Vec<_>>(),
            }));
        } else {
            println!("Saved → {}", out_path.display());
            for swatch in &swatches {
                match swatch.css() {
                    Some(css) => println!("  {:<12} {css} ({} px)", swatch.name, swatch.count),
                    None => println!("  {:<12} no pixels matched", swatch.name),
                }
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
