use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use dominant_palette_wasm::{
    ColorSpace, Downscale, ExtractorConfig, PaletteError, PaletteOrder, StripStyle,
    Theme, encode_png, extract_palette, render_strip,
};
use log::debug;
use serde::Serialize;

/// Extract dominant color palettes from images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colors in each palette
    #[arg(short = 'k', long, default_value_t = dominant_palette_wasm::DEFAULT_N_COLORS)]
    n_colors: usize,

    /// JSON extractor configuration; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Square working resolution used for clustering
    #[arg(short, long)]
    size: Option<u32>,

    /// Cluster every pixel of the source image
    #[arg(long, conflicts_with = "size")]
    no_downscale: bool,

    /// Fit the working resolution to the image aspect ratio
    #[arg(long)]
    keep_aspect: bool,

    /// Number of k-means restarts
    #[arg(short, long)]
    runs: Option<u32>,

    /// Seed of the first k-means run
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    order: Option<PaletteOrder>,

    #[arg(long, value_enum)]
    color_space: Option<ColorSpace>,

    /// Print one JSON object per image instead of plain hex codes
    #[arg(long)]
    json: bool,

    /// Write a PNG swatch strip per image into this directory
    #[arg(short = 'd', long)]
    swatch_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Theme::Dark)]
    theme: Theme,
}

#[derive(Serialize)]
struct Report {
    input: String,
    palette: Vec<String>,
    shares: Vec<f32>,
}

fn build_config(args: &Args) -> Result<ExtractorConfig> {
    let mut config = match &args.config {
        Some(path) => ExtractorConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExtractorConfig::default(),
    };

    if args.no_downscale {
        config.downscale = None;
    } else if let Some(side) = args.size {
        let filter = config.downscale.unwrap_or_default().filter;
        config.downscale = Some(Downscale {
            filter,
            ..Downscale::square(side)
        });
    }
    if args.keep_aspect {
        if let Some(d) = config.downscale.as_mut() {
            d.keep_aspect = true;
        }
    }
    if let Some(runs) = args.runs {
        config.runs = runs;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(order) = args.order {
        config.order = order;
    }
    if let Some(color_space) = args.color_space {
        config.color_space = color_space;
    }

    config.validate()?;
    Ok(config)
}

/// Extract, print and optionally render one input.
fn process_file(
    input: &Path,
    args: &Args,
    config: &ExtractorConfig,
    style: &StripStyle,
) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let palette = extract_palette(&bytes, args.n_colors, config)?;

    if args.json {
        let report = Report {
            input: input.display().to_string(),
            palette: palette.hex(),
            shares: (0..palette.len()).map(|i| palette.share(i)).collect(),
        };
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{}: {}", input.display(), palette.hex().join(" "));
    }

    if let Some(dir) = &args.swatch_dir {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        let out_path = dir.join(format!("{stem}_palette.png"));
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let png = encode_png(&render_strip(&palette, style)?)?;
        fs::write(&out_path, png).with_context(|| format!("writing {}", out_path.display()))?;
        eprintln!("Saved → {}", out_path.display());
    }
    Ok(())
}

/// Processes every input and returns how many of them failed.
fn run(args: &Args) -> Result<usize> {
    let config = build_config(args)?;
    debug!("extractor config: {config:?}");

    let style = StripStyle {
        theme: args.theme,
        ..StripStyle::default()
    };
    let mut failed = 0usize;

    for input in &args.inputs {
        if let Err(err) = process_file(input, args, &config, &style) {
            debug!("{}: {err:#}", input.display());
            report_failure(input, &err);
            failed += 1;
        }
    }
    Ok(failed)
}

fn report_failure(input: &Path, err: &anyhow::Error) {
    match err.downcast_ref::<PaletteError>() {
        Some(palette_err) => eprintln!("{}: {}", input.display(), palette_err.user_message()),
        None => eprintln!("{}: {err:#}", input.display()),
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();
    let failed = run(&args)?;

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dominant_palette_wasm::ResizeFilter;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("palette-cli-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_config(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("config.json");
        fs::write(&path, json).unwrap();
        path
    }

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("palette-cli").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn size_flag_keeps_filter_from_file() {
        let dir = scratch_dir("size");
        let config = write_config(
            &dir,
            r#"{ "downscale": { "width": 64, "height": 48, "filter": "nearest" }, "runs": 3, "seed": 7 }"#,
        );
        let args = parse(&["--config", config.to_str().unwrap(), "--size", "32", "a.png"]);
        let merged = build_config(&args).unwrap();

        let downscale = merged.downscale.unwrap();
        assert_eq!((downscale.width, downscale.height), (32, 32));
        assert_eq!(downscale.filter, ResizeFilter::Nearest);
        assert_eq!(merged.runs, 3);
        assert_eq!(merged.seed, 7);
    }

    #[test]
    fn flags_override_file_values() {
        let dir = scratch_dir("override");
        let config = write_config(
            &dir,
            r#"{ "runs": 3, "seed": 7, "order": "clustering", "color_space": "rgb" }"#,
        );
        let args = parse(&[
            "--config",
            config.to_str().unwrap(),
            "--runs",
            "2",
            "--seed",
            "99",
            "--order",
            "dominance",
            "--color-space",
            "lab",
            "a.png",
        ]);
        let merged = build_config(&args).unwrap();
        assert_eq!(merged.runs, 2);
        assert_eq!(merged.seed, 99);
        assert_eq!(merged.order, PaletteOrder::Dominance);
        assert_eq!(merged.color_space, ColorSpace::Lab);
    }

    #[test]
    fn keep_aspect_applies_to_default_downscale() {
        let merged = build_config(&parse(&["--keep-aspect", "a.png"])).unwrap();
        let downscale = merged.downscale.unwrap();
        assert!(downscale.keep_aspect);
        assert_eq!((downscale.width, downscale.height), (150, 150));
    }

    #[test]
    fn no_downscale_wins_over_keep_aspect() {
        let merged = build_config(&parse(&["--no-downscale", "--keep-aspect", "a.png"])).unwrap();
        assert!(merged.downscale.is_none());
    }

    #[test]
    fn conflicting_or_invalid_flags_are_rejected() {
        assert!(Args::try_parse_from(["palette-cli", "--size", "10", "--no-downscale", "a.png"]).is_err());
        assert!(build_config(&parse(&["--size", "0", "a.png"])).is_err());
        assert!(build_config(&parse(&["--runs", "0", "a.png"])).is_err());
    }

    #[test]
    fn batch_continues_past_failed_inputs() {
        let dir = scratch_dir("batch");
        let good = dir.join("good.png");
        image::RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]))
            .save(&good)
            .unwrap();
        let missing = dir.join("missing.png");
        let garbage = dir.join("garbage.png");
        fs::write(&garbage, b"not an image").unwrap();
        let swatches = dir.join("swatches");

        let args = parse(&[
            missing.to_str().unwrap(),
            garbage.to_str().unwrap(),
            good.to_str().unwrap(),
            "--swatch-dir",
            swatches.to_str().unwrap(),
        ]);
        assert_eq!(run(&args).unwrap(), 2);
        assert!(swatches.join("good_palette.png").exists());
        assert!(!swatches.join("missing_palette.png").exists());
    }
}
