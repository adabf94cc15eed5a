//! Trace diagnostics: timing and counts for each pipeline stage.
//!
//! Permanent instrumentation intended for parameter tuning and the
//! `plotwand-bench` CLI. Every call to
//! [`trace_with_diagnostics`](crate::trace_with_diagnostics) collects
//! diagnostics alongside the staged trace results.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single trace run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDiagnostics {
    /// Stage 1: luminance sampling.
    pub luminance: StageDiagnostics,
    /// Stage 2: adaptive binarization.
    pub binarize: StageDiagnostics,
    /// Stage 3: component filtering.
    pub despeckle: StageDiagnostics,
    /// Stage 4: distance transform.
    pub distance: StageDiagnostics,
    /// Stage 5: bidirectional ridge walk.
    pub walk: StageDiagnostics,
    /// Stage 6: RDP simplification.
    pub simplify: StageDiagnostics,
    /// Total wall-clock duration of the entire trace (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: TraceSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Luminance sampling metrics.
    Luminance {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
    /// Adaptive binarization metrics.
    Binarize {
        /// Threshold window side length (after forcing odd).
        window: u32,
        /// Threshold bias.
        bias: f64,
        /// Ink pixels in the resulting mask.
        ink_pixel_count: usize,
        /// Total pixel count for computing ink density.
        total_pixel_count: usize,
    },
    /// Component filtering metrics.
    Despeckle {
        /// Minimum component size in pixels.
        min_component_size: usize,
        /// Ink pixels before filtering.
        ink_before: usize,
        /// Ink pixels after filtering.
        ink_after: usize,
    },
    /// Distance transform metrics.
    Distance {
        /// Maximum field value (deepest stroke half-thickness).
        max_value: f64,
    },
    /// Ridge walk metrics.
    Walk {
        /// Seed supplied by the caller.
        seed: Point,
        /// Points in the raw merged walk.
        raw_point_count: usize,
    },
    /// Simplification metrics.
    Simplify {
        /// RDP tolerance in pixels.
        epsilon: f64,
        /// Points before simplification.
        points_before: usize,
        /// Points after simplification.
        points_after: usize,
        /// Reduction ratio: `1.0 - (after / before)`.
        reduction_ratio: f64,
    },
}

/// High-level summary counts for the entire trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Name of the preset that was traced.
    pub preset_name: String,
    /// Points in the final simplified path.
    pub final_point_count: usize,
    /// Whether the trace is degenerate (no stroke found at seed).
    pub degenerate: bool,
}

impl TraceDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Trace Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}  |  Preset: {}",
            self.summary.image_width, self.summary.image_height, self.summary.preset_name,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Luminance", &self.luminance),
            ("Binarize", &self.binarize),
            ("Despeckle", &self.despeckle),
            ("Distance", &self.distance),
            ("Walk", &self.walk),
            ("Simplify", &self.simplify),
        ];

        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        if self.summary.degenerate {
            lines.push("No stroke found at seed.".to_owned());
        } else {
            lines.push(format!(
                "Final path points: {}",
                self.summary.final_point_count,
            ));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Luminance { width, height } => format!("{width}x{height}"),
        StageMetrics::Binarize {
            window,
            bias,
            ink_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *ink_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!("window={window} bias={bias:.2} ink={ink_pixel_count} ({density:.1}%)")
        }
        StageMetrics::Despeckle {
            min_component_size,
            ink_before,
            ink_after,
        } => {
            format!("min_size={min_component_size} ink={ink_before}->{ink_after}")
        }
        StageMetrics::Distance { max_value } => format!("max={max_value:.2}px"),
        StageMetrics::Walk {
            seed,
            raw_point_count,
        } => {
            format!("seed=({:.1}, {:.1}) raw_pts={raw_point_count}", seed.x, seed.y)
        }
        StageMetrics::Simplify {
            epsilon,
            points_before,
            points_after,
            reduction_ratio,
        } => {
            format!(
                "eps={epsilon:.2} {points_before}->{points_after} pts ({:.1}% reduction)",
                reduction_ratio * 100.0,
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_diagnostics() -> TraceDiagnostics {
        TraceDiagnostics {
            luminance: StageDiagnostics {
                duration: Duration::from_millis(3),
                metrics: StageMetrics::Luminance {
                    width: 100,
                    height: 80,
                },
            },
            binarize: StageDiagnostics {
                duration: Duration::from_millis(7),
                metrics: StageMetrics::Binarize {
                    window: 15,
                    bias: 0.85,
                    ink_pixel_count: 420,
                    total_pixel_count: 8000,
                },
            },
            despeckle: StageDiagnostics {
                duration: Duration::from_millis(2),
                metrics: StageMetrics::Despeckle {
                    min_component_size: 6,
                    ink_before: 420,
                    ink_after: 400,
                },
            },
            distance: StageDiagnostics {
                duration: Duration::from_millis(4),
                metrics: StageMetrics::Distance { max_value: 2.0 },
            },
            walk: StageDiagnostics {
                duration: Duration::from_millis(5),
                metrics: StageMetrics::Walk {
                    seed: Point::new(50.0, 40.0),
                    raw_point_count: 90,
                },
            },
            simplify: StageDiagnostics {
                duration: Duration::from_millis(1),
                metrics: StageMetrics::Simplify {
                    epsilon: 0.75,
                    points_before: 90,
                    points_after: 9,
                    reduction_ratio: 0.9,
                },
            },
            total_duration: Duration::from_millis(22),
            summary: TraceSummary {
                image_width: 100,
                image_height: 80,
                preset_name: "Balanced".to_owned(),
                final_point_count: 9,
                degenerate: false,
            },
        }
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let ms = duration_ms(Duration::from_millis(1234));
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn report_lists_all_stages() {
        let report = sample_diagnostics().report();
        for stage in ["Luminance", "Binarize", "Despeckle", "Distance", "Walk", "Simplify"] {
            assert!(report.contains(stage), "missing stage {stage}");
        }
        assert!(report.contains("Balanced"));
        assert!(report.contains("Final path points: 9"));
    }

    #[test]
    fn degenerate_trace_is_reported() {
        let mut diag = sample_diagnostics();
        diag.summary.degenerate = true;
        assert!(diag.report().contains("No stroke found at seed."));
    }

    #[test]
    fn diagnostics_serde_round_trip() {
        let diag = sample_diagnostics();
        let json = serde_json::to_string(&diag).unwrap();
        let back: TraceDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary.final_point_count, 9);
        assert_eq!(back.total_duration, diag.total_duration);
        assert!(matches!(
            back.walk.metrics,
            StageMetrics::Walk {
                raw_point_count: 90,
                ..
            }
        ));
    }
}
