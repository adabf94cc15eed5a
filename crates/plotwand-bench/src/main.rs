//! plotwand-bench: CLI tool for preset experimentation and trace diagnostics.
//!
//! Traces a curve in a given image file from a seed pixel with configurable
//! preset parameters, printing detailed per-stage diagnostics. Useful for:
//!
//! - Comparing catalog presets against one another on a real chart
//! - Tuning threshold bias, gap bridging, momentum, simplification
//! - Measuring per-stage durations to identify bottlenecks
//! - Understanding how parameter changes affect walk/point counts
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin plotwand-bench -- [OPTIONS] --seed-x <X> --seed-y <Y> <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use plotwand_engine::{Point, WandPreset};

/// Preset experimentation and trace diagnostics for plotwand.
///
/// Traces the curve passing through the given seed pixel with configurable
/// parameters and prints detailed per-stage timing and count diagnostics.
#[derive(Parser)]
#[command(name = "plotwand-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Seed x coordinate in pixels.
    #[arg(long)]
    seed_x: f64,

    /// Seed y coordinate in pixels.
    #[arg(long)]
    seed_y: f64,

    /// Named catalog preset to start from (e.g. "balanced", "gap jumper").
    /// Individual parameter flags override the chosen preset's values.
    #[arg(long, default_value = "balanced")]
    preset: String,

    /// Adaptive threshold window side length in pixels.
    #[arg(long)]
    threshold_window: Option<u32>,

    /// Adaptive threshold bias, in (0, 1].
    #[arg(long)]
    threshold_bias: Option<f64>,

    /// Minimum connected-component size in pixels.
    #[arg(long)]
    min_component_size: Option<usize>,

    /// Thickness-keep fraction for walk continuation.
    #[arg(long)]
    thickness_keep_frac: Option<f64>,

    /// Walk step size in pixels.
    #[arg(long)]
    step_size: Option<f64>,

    /// Directional momentum blend weight in [0, 1].
    #[arg(long)]
    momentum: Option<f64>,

    /// Maximum gap-bridging radius in pixels (0 disables bridging).
    #[arg(long)]
    max_gap: Option<f64>,

    /// Gap search cone half-angle in degrees.
    #[arg(long)]
    gap_angle_degrees: Option<f64>,

    /// Hard cap on points per directional walk.
    #[arg(long)]
    max_points: Option<usize>,

    /// Hard cap on loop iterations per directional walk.
    #[arg(long)]
    max_steps: Option<usize>,

    /// RDP simplification tolerance in pixels.
    #[arg(long)]
    simplify_epsilon: Option<f64>,

    /// Trace the whole preset catalog instead of a single preset and
    /// print a per-preset comparison.
    #[arg(long)]
    variations: bool,

    /// Write the traced path to a file as JSON.
    #[arg(long)]
    path_json: Option<PathBuf>,

    /// Write per-stage preview PNGs (luminance, mask, filtered, distance)
    /// into the given directory.
    #[arg(long)]
    dump_stages: Option<PathBuf>,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Full preset as a JSON string.
    ///
    /// When provided, --preset and all individual parameter flags are
    /// ignored. The JSON must be a valid `WandPreset` serialization.
    #[arg(long)]
    preset_json: Option<String>,
}

/// Build a [`WandPreset`] from CLI arguments.
///
/// If `--preset-json` is provided, the JSON is parsed directly. Otherwise
/// the named catalog preset is looked up and individual flags override
/// its fields.
fn preset_from_cli(cli: &Cli) -> Result<WandPreset, String> {
    if let Some(ref json) = cli.preset_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --preset-json: {e}"));
    }

    let mut preset = plotwand_engine::catalog()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(&cli.preset))
        .ok_or_else(|| {
            let names: Vec<String> = plotwand_engine::catalog()
                .into_iter()
                .map(|p| p.name)
                .collect();
            format!(
                "Unknown preset {:?}; available: {}",
                cli.preset,
                names.join(", "),
            )
        })?;

    if let Some(v) = cli.threshold_window {
        preset.threshold_window = v;
    }
    if let Some(v) = cli.threshold_bias {
        preset.threshold_bias = v;
    }
    if let Some(v) = cli.min_component_size {
        preset.min_component_size = v;
    }
    if let Some(v) = cli.thickness_keep_frac {
        preset.thickness_keep_frac = v;
    }
    if let Some(v) = cli.step_size {
        preset.step_size = v;
    }
    if let Some(v) = cli.momentum {
        preset.momentum = v;
    }
    if let Some(v) = cli.max_gap {
        preset.max_gap = v;
    }
    if let Some(v) = cli.gap_angle_degrees {
        preset.gap_angle = v.to_radians();
    }
    if let Some(v) = cli.max_points {
        preset.max_points = v;
    }
    if let Some(v) = cli.max_steps {
        preset.max_steps = v;
    }
    if let Some(v) = cli.simplify_epsilon {
        preset.simplify_epsilon = v;
    }

    Ok(preset)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let preset = match preset_from_cli(&cli) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let image = match plotwand_engine::PixelImage::decode(&image_bytes) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let seed = Point::new(cli.seed_x, cli.seed_y);

    eprintln!(
        "Image: {} ({}x{}, {} bytes)",
        cli.image_path.display(),
        image.width(),
        image.height(),
        image_bytes.len(),
    );
    eprintln!("Seed: ({}, {})", seed.x, seed.y);
    eprintln!();

    if cli.variations {
        return run_variations(&image, seed);
    }

    eprintln!("Preset: {preset:#?}");
    eprintln!();

    let (staged, diagnostics) = plotwand_engine::trace_with_diagnostics(&image, seed, &preset);

    if cli.json {
        match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", diagnostics.report());
    }

    if let Some(ref dir) = cli.dump_stages {
        if let Err(e) = dump_stages(&staged, dir) {
            eprintln!("Error dumping stage previews: {e}");
            return ExitCode::FAILURE;
        }
    }

    if let Some(ref path_json) = cli.path_json {
        let json = match serde_json::to_string_pretty(&staged.path) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error serializing path: {e}");
                return ExitCode::FAILURE;
            }
        };
        match std::fs::write(path_json, &json) {
            Ok(()) => {
                eprintln!(
                    "Path written to {} ({} points, {} bytes)",
                    path_json.display(),
                    staged.path.len(),
                    json.len(),
                );
            }
            Err(e) => {
                eprintln!("Error writing path to {}: {e}", path_json.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Write per-stage preview PNGs into `dir`, creating it if needed.
fn dump_stages(staged: &plotwand_engine::StagedTrace, dir: &std::path::Path) -> Result<(), String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("creating {}: {e}", dir.display()))?;

    let previews: [(&str, image::GrayImage); 4] = [
        ("luminance.png", staged.luminance.clone()),
        ("mask.png", staged.mask.to_gray_image()),
        ("filtered.png", staged.filtered.to_gray_image()),
        ("distance.png", staged.distance.to_gray_image()),
    ];

    for (name, preview) in previews {
        let path = dir.join(name);
        preview
            .save(&path)
            .map_err(|e| format!("writing {}: {e}", path.display()))?;
        eprintln!("Stage preview written to {}", path.display());
    }
    Ok(())
}

/// Trace the full catalog and print a per-preset comparison table.
fn run_variations(image: &plotwand_engine::PixelImage, seed: Point) -> ExitCode {
    let presets = plotwand_engine::catalog();
    let variations = plotwand_engine::trace_variations(image, seed, &presets);

    println!(
        "{:<14} {:>8} {:>12} {:>12}",
        "Preset", "Points", "Arc length", "Degenerate",
    );
    println!("{}", "-".repeat(50));

    for variation in &variations {
        println!(
            "{:<14} {:>8} {:>10.1}px {:>12}",
            variation.preset.name,
            variation.path.len(),
            variation.path.arc_length(),
            if variation.path.is_degenerate() {
                "yes"
            } else {
                "no"
            },
        );
    }

    ExitCode::SUCCESS
}
