//! plotwand-engine: interactive line-tracing engine (sans-IO).
//!
//! Given a raster snapshot of a plotted chart and a single seed pixel
//! clicked on a curve, the engine recovers an ordered polyline following
//! that curve's centerline through noise, anti-aliasing, dashed segments,
//! and crossings with other curves, with no prior knowledge of the
//! curve's color or shape:
//!
//! luminance -> adaptive binarize -> despeckle -> distance transform ->
//! ridge walk -> simplification.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! pixel buffers and returns structured data. Axis calibration, curve
//! fitting, and all presentation live in the surrounding application.
//!
//! Every stage is a pure function over immutable inputs: the same
//! `(image, seed, preset)` always produces a byte-identical path, and
//! one snapshot may back any number of concurrent preset evaluations.
//!
//! ```
//! use plotwand_engine::{PixelImage, Point, WandPreset};
//!
//! // A blank snapshot yields an empty path: "no stroke found at seed".
//! let image = PixelImage::from_rgba(4, 4, vec![255; 64])?;
//! let path = plotwand_engine::trace(&image, Point::new(2.0, 2.0), &WandPreset::balanced());
//! assert!(path.is_empty());
//! # Ok::<(), plotwand_engine::WandError>(())
//! ```

use std::time::Instant;

use image::GrayImage;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

pub mod binarize;
pub mod despeckle;
pub mod diagnostics;
pub mod distance;
pub mod luminance;
pub mod preset;
pub mod simplify;
pub mod types;
pub mod walker;

pub use diagnostics::{StageDiagnostics, StageMetrics, TraceDiagnostics, TraceSummary};
pub use distance::DistanceField;
pub use preset::{WandPreset, catalog};
pub use simplify::resample_even;
pub use types::{
    BinaryMask, Dimensions, Path, PixelImage, Point, StagedTrace, Variation, WandError,
};

/// Trace the curve passing through `seed` with a single preset.
///
/// Returns the simplified centerline path. An empty or single-point path
/// signals "no stroke detected at seed"; see [`Path::is_degenerate`].
#[must_use = "returns the traced path"]
pub fn trace(image: &PixelImage, seed: Point, preset: &WandPreset) -> Path {
    let gray = luminance::luminance(image);
    trace_field(&gray, seed, preset)
}

/// Stages 2-6 over an already-sampled luminance field.
///
/// Shared by [`trace`] and [`trace_variations`] so the luminance pass
/// runs once per snapshot, not once per preset.
fn trace_field(gray: &GrayImage, seed: Point, preset: &WandPreset) -> Path {
    let mask = binarize::binarize(gray, preset.threshold_window, preset.threshold_bias);
    let filtered = despeckle::filter_components(&mask, preset.min_component_size);
    let field = DistanceField::build(&filtered);
    let raw = walker::walk_ridge(&field, seed, preset);
    simplify::simplify(&raw, preset.simplify_epsilon)
}

/// Trace with every intermediate stage output preserved.
///
/// Used by tooling that inspects or renders the mask, despeckled mask,
/// distance field, and raw walk alongside the final path.
#[must_use = "returns the staged trace"]
pub fn trace_staged(image: &PixelImage, seed: Point, preset: &WandPreset) -> StagedTrace {
    let gray = luminance::luminance(image);
    let mask = binarize::binarize(&gray, preset.threshold_window, preset.threshold_bias);
    let filtered = despeckle::filter_components(&mask, preset.min_component_size);
    let field = DistanceField::build(&filtered);
    let raw = walker::walk_ridge(&field, seed, preset);
    let path = simplify::simplify(&raw, preset.simplify_epsilon);

    StagedTrace {
        luminance: gray,
        mask,
        filtered,
        distance: field,
        raw_path: raw,
        path,
        dimensions: image.dimensions(),
    }
}

/// Trace with intermediates preserved and per-stage diagnostics collected.
#[must_use = "returns the staged trace and its diagnostics"]
pub fn trace_with_diagnostics(
    image: &PixelImage,
    seed: Point,
    preset: &WandPreset,
) -> (StagedTrace, TraceDiagnostics) {
    let total_start = Instant::now();

    let stage_start = Instant::now();
    let gray = luminance::luminance(image);
    let luminance_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Luminance {
            width: image.width(),
            height: image.height(),
        },
    };

    let stage_start = Instant::now();
    let mask = binarize::binarize(&gray, preset.threshold_window, preset.threshold_bias);
    let ink_before = mask.ink_count();
    let binarize_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Binarize {
            window: preset.threshold_window.max(1) | 1,
            bias: preset.threshold_bias,
            ink_pixel_count: ink_before,
            total_pixel_count: image.width() as usize * image.height() as usize,
        },
    };

    let stage_start = Instant::now();
    let filtered = despeckle::filter_components(&mask, preset.min_component_size);
    let despeckle_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Despeckle {
            min_component_size: preset.min_component_size,
            ink_before,
            ink_after: filtered.ink_count(),
        },
    };

    let stage_start = Instant::now();
    let field = DistanceField::build(&filtered);
    let distance_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Distance {
            max_value: f64::from(field.max_value()),
        },
    };

    let stage_start = Instant::now();
    let raw = walker::walk_ridge(&field, seed, preset);
    let walk_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Walk {
            seed,
            raw_point_count: raw.len(),
        },
    };

    let stage_start = Instant::now();
    let path = simplify::simplify(&raw, preset.simplify_epsilon);
    #[allow(clippy::cast_precision_loss)]
    let reduction_ratio = if raw.is_empty() {
        0.0
    } else {
        1.0 - path.len() as f64 / raw.len() as f64
    };
    let simplify_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Simplify {
            epsilon: preset.simplify_epsilon,
            points_before: raw.len(),
            points_after: path.len(),
            reduction_ratio,
        },
    };

    let diagnostics = TraceDiagnostics {
        luminance: luminance_diag,
        binarize: binarize_diag,
        despeckle: despeckle_diag,
        distance: distance_diag,
        walk: walk_diag,
        simplify: simplify_diag,
        total_duration: total_start.elapsed(),
        summary: TraceSummary {
            image_width: image.width(),
            image_height: image.height(),
            preset_name: preset.name.clone(),
            final_point_count: path.len(),
            degenerate: path.is_degenerate(),
        },
    };

    let staged = StagedTrace {
        luminance: gray,
        mask,
        filtered,
        distance: field,
        raw_path: raw,
        path,
        dimensions: image.dimensions(),
    };

    (staged, diagnostics)
}

/// Run the full pipeline once per preset and return every candidate.
///
/// The luminance field is sampled once and shared read-only across the
/// per-preset runs, which are evaluated in parallel; no run observes
/// another's intermediate state, and results arrive in preset order.
#[must_use = "returns one variation per preset"]
pub fn trace_variations(image: &PixelImage, seed: Point, presets: &[WandPreset]) -> Vec<Variation> {
    let gray = luminance::luminance(image);
    presets
        .par_iter()
        .map(|preset| Variation {
            preset: preset.clone(),
            path: trace_field(&gray, seed, preset),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// White RGBA canvas of the given dimensions.
    fn blank_canvas(width: u32, height: u32) -> image::RgbaImage {
        image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]))
    }

    fn snapshot(canvas: image::RgbaImage) -> PixelImage {
        let (width, height) = canvas.dimensions();
        PixelImage::from_rgba(width, height, canvas.into_raw()).unwrap()
    }

    /// Horizontal black bar, three pixels thick, centered on `row`.
    fn draw_bar(canvas: &mut image::RgbaImage, cols: std::ops::RangeInclusive<u32>, row: u32) {
        for y in row - 1..=row + 1 {
            for x in cols.clone() {
                canvas.put_pixel(x, y, image::Rgba([0, 0, 0, 255]));
            }
        }
    }

    fn span_x(path: &Path) -> (f64, f64) {
        let min = path.points().iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max = path
            .points()
            .iter()
            .map(|p| p.x)
            .fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }

    #[test]
    fn solid_line_traces_end_to_end() {
        let mut canvas = blank_canvas(100, 40);
        draw_bar(&mut canvas, 10..=90, 20);
        let image = snapshot(canvas);

        // The click is slightly off the centerline; re-centering absorbs it.
        let path = trace(&image, Point::new(50.2, 19.4), &WandPreset::balanced());
        assert!(!path.is_degenerate());

        let (min_x, max_x) = span_x(&path);
        assert!(min_x <= 13.0, "left end not reached: {min_x}");
        assert!(max_x >= 87.0, "right end not reached: {max_x}");
        for p in path.points() {
            assert!((p.y - 20.0).abs() <= 1.5, "strayed off centerline: {p:?}");
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn dashed_line_bridges_with_default_gap() {
        let mut canvas = blank_canvas(120, 40);
        for dash in [10..=25u32, 34..=49, 58..=73, 82..=97] {
            draw_bar(&mut canvas, dash, 20);
        }
        let image = snapshot(canvas);

        let path = trace(&image, Point::new(40.0, 20.0), &WandPreset::balanced());
        let (min_x, max_x) = span_x(&path);
        assert!(min_x <= 13.0 && max_x >= 94.0, "gaps not bridged: {min_x}..{max_x}");
    }

    #[test]
    fn dashed_line_stops_when_gap_exceeds_limit() {
        let mut canvas = blank_canvas(120, 40);
        for dash in [10..=25u32, 34..=49, 58..=73, 82..=97] {
            draw_bar(&mut canvas, dash, 20);
        }
        let image = snapshot(canvas);

        let preset = WandPreset {
            max_gap: 5.0,
            ..WandPreset::balanced()
        };
        let path = trace(&image, Point::new(40.0, 20.0), &preset);
        let (min_x, max_x) = span_x(&path);
        assert!(
            min_x >= 32.0 && max_x <= 51.0,
            "walk escaped the seeded dash: {min_x}..{max_x}",
        );
    }

    #[test]
    fn crossing_lines_stay_on_the_seeded_arm() {
        // Two 3-pixel-thick strokes crossing in an X, drawn with the
        // same primitive the application rasterizes test fixtures with.
        let mut canvas = blank_canvas(61, 61);
        let black = image::Rgba([0, 0, 0, 255]);
        for dy in [-1.0f32, 0.0, 1.0] {
            imageproc::drawing::draw_line_segment_mut(
                &mut canvas,
                (2.0, 2.0 + dy),
                (58.0, 58.0 + dy),
                black,
            );
            imageproc::drawing::draw_line_segment_mut(
                &mut canvas,
                (2.0, 58.0 + dy),
                (58.0, 2.0 + dy),
                black,
            );
        }
        let image = snapshot(canvas);

        let staged = trace_staged(&image, Point::new(15.0, 15.0), &WandPreset::balanced());
        assert!(!staged.path.is_degenerate());
        for p in staged.raw_path.points() {
            assert!(
                (p.y - p.x).abs() <= 5.0,
                "turned onto the crossing stroke at {p:?}",
            );
        }
        let (min_x, max_x) = span_x(&staged.raw_path);
        assert!(min_x <= 10.0, "did not reach arm start: {min_x}");
        assert!(max_x >= 50.0, "did not continue past crossing: {max_x}");
    }

    #[test]
    fn blank_image_returns_empty_path() {
        let image = snapshot(blank_canvas(40, 40));
        let path = trace(&image, Point::new(20.0, 20.0), &WandPreset::balanced());
        assert!(path.is_empty());
    }

    #[test]
    fn corner_seeds_are_bounds_safe() {
        let mut canvas = blank_canvas(30, 30);
        draw_bar(&mut canvas, 1..=28, 2);
        let image = snapshot(canvas);

        for seed in [Point::new(0.0, 0.0), Point::new(29.0, 29.0)] {
            let path = trace(&image, seed, &WandPreset::balanced());
            for p in path.points() {
                assert!((0.0..=29.0).contains(&p.x), "x out of bounds: {p:?}");
                assert!((0.0..=29.0).contains(&p.y), "y out of bounds: {p:?}");
                assert!(p.x.is_finite() && p.y.is_finite());
            }
        }
    }

    #[test]
    fn tracing_is_deterministic() {
        let mut canvas = blank_canvas(100, 40);
        draw_bar(&mut canvas, 10..=90, 20);
        let image = snapshot(canvas);
        let seed = Point::new(50.0, 20.0);

        let a = trace(&image, seed, &WandPreset::balanced());
        let b = trace(&image, seed, &WandPreset::balanced());
        assert_eq!(a, b);

        let va = trace_variations(&image, seed, &catalog());
        let vb = trace_variations(&image, seed, &catalog());
        assert_eq!(va, vb);
    }

    #[test]
    fn staged_trace_matches_plain_trace() {
        let mut canvas = blank_canvas(100, 40);
        draw_bar(&mut canvas, 10..=90, 20);
        let image = snapshot(canvas);
        let seed = Point::new(50.0, 20.0);
        let preset = WandPreset::balanced();

        let staged = trace_staged(&image, seed, &preset);
        assert_eq!(staged.path, trace(&image, seed, &preset));
        assert!(staged.mask.ink_count() >= staged.filtered.ink_count());
        assert!(staged.raw_path.len() >= staged.path.len());
        assert_eq!(
            staged.dimensions,
            Dimensions {
                width: 100,
                height: 40,
            }
        );
    }

    #[test]
    fn diagnostics_describe_the_run() {
        let mut canvas = blank_canvas(100, 40);
        draw_bar(&mut canvas, 10..=90, 20);
        let image = snapshot(canvas);

        let (staged, diag) =
            trace_with_diagnostics(&image, Point::new(50.0, 20.0), &WandPreset::balanced());
        assert_eq!(diag.summary.final_point_count, staged.path.len());
        assert!(!diag.summary.degenerate);
        assert_eq!(diag.summary.preset_name, "Balanced");
        assert!(diag.report().contains("Walk"));
        assert!(matches!(
            diag.walk.metrics,
            StageMetrics::Walk { raw_point_count, .. } if raw_point_count == staged.raw_path.len(),
        ));
    }

    #[test]
    fn variations_cover_the_catalog_in_order() {
        let mut canvas = blank_canvas(120, 40);
        for dash in [10..=25u32, 34..=49, 58..=73, 82..=97] {
            draw_bar(&mut canvas, dash, 20);
        }
        let image = snapshot(canvas);
        let seed = Point::new(40.0, 20.0);

        let presets = catalog();
        let variations = trace_variations(&image, seed, &presets);
        assert_eq!(variations.len(), presets.len());
        for (variation, preset) in variations.iter().zip(&presets) {
            assert_eq!(variation.preset, *preset);
            // Each run is independent of the others: it matches a solo trace.
            assert_eq!(variation.path, trace(&image, seed, preset));
        }

        // The presets genuinely diverge on a dashed curve: Strict stays
        // on the seeded dash while Balanced bridges every gap.
        let balanced = &variations[0].path;
        let strict = &variations[2].path;
        let (b_min, b_max) = span_x(balanced);
        let (s_min, s_max) = span_x(strict);
        assert!(b_max - b_min > 70.0, "balanced span too small");
        assert!(s_max - s_min < 25.0, "strict should not bridge gaps");
    }

    #[test]
    fn resampling_a_trace_yields_fixed_point_count() {
        let mut canvas = blank_canvas(100, 40);
        draw_bar(&mut canvas, 10..=90, 20);
        let image = snapshot(canvas);

        let path = trace(&image, Point::new(50.0, 20.0), &WandPreset::balanced());
        let resampled = resample_even(&path, 10);
        assert_eq!(resampled.len(), 10);
        assert_eq!(resampled.first(), path.first());
        assert_eq!(resampled.last(), path.last());
    }

    #[test]
    fn empty_preset_list_yields_no_variations() {
        let image = snapshot(blank_canvas(10, 10));
        assert!(trace_variations(&image, Point::new(5.0, 5.0), &[]).is_empty());
    }
}
