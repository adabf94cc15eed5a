//! Wand presets: named, immutable bundles of tracing parameters.
//!
//! Every threshold the walker applies is scaled by the stroke thickness
//! measured at the seed, so presets are stroke-width-relative rather than
//! absolute-pixel-relative. Presets share no state; any number of them
//! may be evaluated against the same snapshot concurrently.

use serde::{Deserialize, Serialize};

/// A named bundle of tunable tracing parameters.
///
/// The catalog exposed by [`catalog`] is the fixed list offered for user
/// selection; callers may also construct ad-hoc presets for overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WandPreset {
    /// Display name of the preset.
    pub name: String,

    /// Side length of the adaptive threshold window in pixels
    /// (forced odd, minimum 1).
    pub threshold_window: u32,

    /// Fraction of the local window mean a pixel must fall strictly
    /// below to classify as ink. Must be in `(0, 1]`.
    pub threshold_bias: f64,

    /// Minimum connected-component size in pixels; smaller ink regions
    /// are despeckled away.
    pub min_component_size: usize,

    /// Fraction of the seed thickness a candidate position must retain
    /// for the walk to continue. Lower values follow thinner or worn
    /// strokes; higher values refuse to leave the clicked stroke.
    pub thickness_keep_frac: f64,

    /// Walk advance per step, in pixels.
    pub step_size: f64,

    /// Directional momentum blend weight in `[0, 1]`. Higher is
    /// smoother and less reactive to local noise.
    pub momentum: f64,

    /// Maximum gap-bridging search radius in pixels. Zero disables gap
    /// bridging entirely.
    pub max_gap: f64,

    /// Half-angle of the gap search cone, in radians.
    pub gap_angle: f64,

    /// Hard cap on points collected per directional walk.
    pub max_points: usize,

    /// Hard cap on loop iterations per directional walk.
    pub max_steps: usize,

    /// Ramer-Douglas-Peucker simplification tolerance in pixels.
    pub simplify_epsilon: f64,
}

impl WandPreset {
    /// Default adaptive threshold window side, in pixels.
    pub const DEFAULT_THRESHOLD_WINDOW: u32 = 15;
    /// Default threshold bias.
    pub const DEFAULT_THRESHOLD_BIAS: f64 = 0.85;
    /// Default minimum component size.
    pub const DEFAULT_MIN_COMPONENT_SIZE: usize = 6;
    /// Default thickness-keep fraction.
    pub const DEFAULT_THICKNESS_KEEP_FRAC: f64 = 0.5;
    /// Default step size in pixels.
    pub const DEFAULT_STEP_SIZE: f64 = 2.0;
    /// Default momentum blend weight.
    pub const DEFAULT_MOMENTUM: f64 = 0.7;
    /// Default maximum gap-bridging radius in pixels.
    pub const DEFAULT_MAX_GAP: f64 = 15.0;
    /// Default gap search cone half-angle in radians (60 degrees).
    pub const DEFAULT_GAP_ANGLE: f64 = std::f64::consts::FRAC_PI_3;
    /// Default per-direction point cap.
    pub const DEFAULT_MAX_POINTS: usize = 4000;
    /// Default per-direction step cap.
    pub const DEFAULT_MAX_STEPS: usize = 10_000;
    /// Default simplification tolerance in pixels.
    pub const DEFAULT_SIMPLIFY_EPSILON: f64 = 0.75;

    /// The balanced default preset.
    #[must_use]
    pub fn balanced() -> Self {
        Self {
            name: "Balanced".to_owned(),
            threshold_window: Self::DEFAULT_THRESHOLD_WINDOW,
            threshold_bias: Self::DEFAULT_THRESHOLD_BIAS,
            min_component_size: Self::DEFAULT_MIN_COMPONENT_SIZE,
            thickness_keep_frac: Self::DEFAULT_THICKNESS_KEEP_FRAC,
            step_size: Self::DEFAULT_STEP_SIZE,
            momentum: Self::DEFAULT_MOMENTUM,
            max_gap: Self::DEFAULT_MAX_GAP,
            gap_angle: Self::DEFAULT_GAP_ANGLE,
            max_points: Self::DEFAULT_MAX_POINTS,
            max_steps: Self::DEFAULT_MAX_STEPS,
            simplify_epsilon: Self::DEFAULT_SIMPLIFY_EPSILON,
        }
    }

    /// Lenient preset: follows thinner, worn, or lightly printed lines by
    /// lowering the thickness-keep fraction and the threshold bias demand.
    #[must_use]
    pub fn tolerant() -> Self {
        Self {
            name: "Tolerant".to_owned(),
            threshold_bias: 0.92,
            thickness_keep_frac: 0.3,
            ..Self::balanced()
        }
    }

    /// Conservative preset: no gap bridging, high thickness demand.
    /// Stops at the first break rather than guessing across it.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            name: "Strict".to_owned(),
            thickness_keep_frac: 0.65,
            max_gap: 0.0,
            ..Self::balanced()
        }
    }

    /// Wide gap bridging for dashed or heavily occluded curves.
    #[must_use]
    pub fn gap_jumper() -> Self {
        Self {
            name: "Gap Jumper".to_owned(),
            max_gap: 40.0,
            gap_angle: std::f64::consts::FRAC_PI_2 * 0.9,
            ..Self::balanced()
        }
    }

    /// Small steps and tight simplification for wiggly, dense curves.
    #[must_use]
    pub fn fine_detail() -> Self {
        Self {
            name: "Fine Detail".to_owned(),
            step_size: 1.0,
            momentum: 0.5,
            simplify_epsilon: 0.3,
            ..Self::balanced()
        }
    }
}

impl Default for WandPreset {
    fn default() -> Self {
        Self::balanced()
    }
}

/// The fixed preset catalog offered for user selection.
///
/// Order matches the selection UI: the balanced default first, then the
/// specialized alternatives.
#[must_use]
pub fn catalog() -> Vec<WandPreset> {
    vec![
        WandPreset::balanced(),
        WandPreset::tolerant(),
        WandPreset::strict(),
        WandPreset::gap_jumper(),
        WandPreset::fine_detail(),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_is_balanced() {
        assert_eq!(WandPreset::default(), WandPreset::balanced());
    }

    #[test]
    fn defaults_match_constants() {
        let preset = WandPreset::balanced();
        assert_eq!(preset.threshold_window, WandPreset::DEFAULT_THRESHOLD_WINDOW);
        assert!((preset.threshold_bias - WandPreset::DEFAULT_THRESHOLD_BIAS).abs() < f64::EPSILON);
        assert!((preset.momentum - WandPreset::DEFAULT_MOMENTUM).abs() < f64::EPSILON);
        assert_eq!(preset.max_steps, WandPreset::DEFAULT_MAX_STEPS);
    }

    #[test]
    fn catalog_names_are_unique() {
        let presets = catalog();
        assert!(presets.len() >= 4);
        for (i, a) in presets.iter().enumerate() {
            for b in &presets[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn strict_disables_gap_bridging() {
        assert!((WandPreset::strict().max_gap - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tolerant_lowers_thickness_demand() {
        assert!(WandPreset::tolerant().thickness_keep_frac < WandPreset::balanced().thickness_keep_frac);
    }

    #[test]
    fn gap_jumper_widens_search() {
        let jumper = WandPreset::gap_jumper();
        let balanced = WandPreset::balanced();
        assert!(jumper.max_gap > balanced.max_gap);
        assert!(jumper.gap_angle > balanced.gap_angle);
    }

    #[test]
    fn preset_serde_round_trip() {
        let preset = WandPreset::gap_jumper();
        let json = serde_json::to_string(&preset).unwrap();
        let back: WandPreset = serde_json::from_str(&json).unwrap();
        assert_eq!(preset, back);
    }
}
