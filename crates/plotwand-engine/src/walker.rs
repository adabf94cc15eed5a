//! Ridge walking: recover a curve's centerline from the distance field.
//!
//! The locus of local maxima of the distance field approximates the
//! stroke's medial axis, so following that ridge recovers the centerline
//! rather than either edge of the stroke. Starting from a re-centered
//! seed, two independent walks run in opposite directions and are merged
//! into one open polyline.
//!
//! Each walk advances by `step_size` along its momentum direction, then
//! searches perpendicular to that direction for the sub-pixel offset that
//! maximizes the (bilinearly interpolated) field value, lightly biased
//! toward zero offset so a parallel neighboring stroke cannot pull the
//! walk sideways. When no perpendicular candidate clears the thickness
//! threshold, a cone search across increasing radii bridges dashes and
//! brief occlusions up to `max_gap`. All loops are bounded by
//! `max_steps`/`max_points`, so termination is guaranteed even on
//! pathological inputs.
//!
//! This is step 5 in the pipeline, between the distance transform and
//! path simplification.

use crate::distance::DistanceField;
use crate::preset::WandPreset;
use crate::types::{Path, Point};

/// Displacement below which a step counts as a numerical stall.
const STALL_EPSILON: f64 = 1e-3;

/// Score penalty per pixel of perpendicular offset, discouraging drift
/// onto a parallel neighboring stroke.
const CENTER_BIAS: f64 = 0.1;

/// Lattice radius searched when re-centering the seed onto the ridge.
const RECENTER_RADIUS: i64 = 3;

/// Half-width of the window used for the seed thickness median (5x5).
const THICKNESS_RADIUS: i64 = 2;

/// Number of candidate angles scanned for the initial direction.
const RING_DIRECTIONS: usize = 32;

/// Sub-pixel increment of the perpendicular ridge search.
const PERP_STEP: f64 = 0.5;

/// Angle subdivisions on each side of straight ahead in the gap cone.
const GAP_ANGLE_STEPS: usize = 4;

/// Floor for the thickness threshold, keeping background (value 0)
/// from ever qualifying as a candidate.
const MIN_KEEP_FLOOR: f64 = 0.05;

/// A unit direction vector; the walker's momentum.
#[derive(Debug, Clone, Copy)]
struct Heading {
    x: f64,
    y: f64,
}

impl Heading {
    fn from_angle(theta: f64) -> Self {
        Self {
            x: theta.cos(),
            y: theta.sin(),
        }
    }

    /// Unit vector from `from` toward `to`; `None` if the points
    /// (nearly) coincide.
    fn between(from: Point, to: Point) -> Option<Self> {
        Self { x: to.x - from.x, y: to.y - from.y }.normalized()
    }

    fn normalized(self) -> Option<Self> {
        let len = self.x.hypot(self.y);
        if len < STALL_EPSILON {
            return None;
        }
        Some(Self {
            x: self.x / len,
            y: self.y / len,
        })
    }

    const fn reversed(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }

    /// Perpendicular direction (rotated 90 degrees counter-clockwise in
    /// image coordinates).
    const fn perpendicular(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x.mul_add(cos, -(self.y * sin)),
            y: self.x.mul_add(sin, self.y * cos),
        }
    }

    /// Blend this direction with the direction actually taken.
    ///
    /// `momentum` is the weight of the old direction; `None` when the
    /// two cancel out (a reversal the walk treats as termination).
    fn blend(self, taken: Self, momentum: f64) -> Option<Self> {
        Self {
            x: self.x.mul_add(momentum, (1.0 - momentum) * taken.x),
            y: self.y.mul_add(momentum, (1.0 - momentum) * taken.y),
        }
        .normalized()
    }
}

/// `origin` displaced by `distance` along `direction`.
fn advance(origin: Point, direction: Heading, distance: f64) -> Point {
    Point::new(
        direction.x.mul_add(distance, origin.x),
        direction.y.mul_add(distance, origin.y),
    )
}

/// Trace the distance-field ridge passing through `seed`.
///
/// Returns the merged bidirectional walk as a raw (unsimplified) path.
/// An empty path means the seed is not on any detectable ink; a
/// single-point path means the seed sits on ink too thin or too isolated
/// to establish a walking direction. Callers treat both as "no trace
/// found".
#[must_use = "returns the raw traced path"]
pub fn walk_ridge(field: &DistanceField, seed: Point, preset: &WandPreset) -> Path {
    let Some(start) = recenter_seed(field, seed) else {
        return Path::new(Vec::new());
    };

    let thickness = seed_thickness(field, start);
    let min_keep = (thickness * preset.thickness_keep_frac).max(MIN_KEEP_FLOOR);

    let Some(direction) = initial_direction(field, start, preset.step_size.max(1.0), min_keep)
    else {
        return Path::new(vec![start]);
    };

    let forward = walk_direction(field, start, direction, min_keep, preset);
    let backward = walk_direction(field, start, direction.reversed(), min_keep, preset);

    let mut points = Vec::with_capacity(backward.len() + forward.len() + 1);
    points.extend(backward.into_iter().rev());
    points.push(start);
    points.extend(forward);
    Path::new(points)
}

/// Move the seed onto the nearest local maximum of the distance field
/// within a small lattice window, tolerating slightly-off clicks.
///
/// `None` when no pixel in the window carries any ink.
fn recenter_seed(field: &DistanceField, seed: Point) -> Option<Point> {
    let max_x = i64::from(field.width()) - 1;
    let max_y = i64::from(field.height()) - 1;
    #[allow(clippy::cast_possible_truncation)]
    let cx = (seed.x.round() as i64).clamp(0, max_x);
    #[allow(clippy::cast_possible_truncation)]
    let cy = (seed.y.round() as i64).clamp(0, max_y);

    let mut best_value = 0.0f32;
    let mut best: Option<Point> = None;
    for y in (cy - RECENTER_RADIUS).max(0)..=(cy + RECENTER_RADIUS).min(max_y) {
        for x in (cx - RECENTER_RADIUS).max(0)..=(cx + RECENTER_RADIUS).min(max_x) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let value = field.value(x as u32, y as u32);
            if value > best_value {
                best_value = value;
                #[allow(clippy::cast_precision_loss)]
                {
                    best = Some(Point::new(x as f64, y as f64));
                }
            }
        }
    }
    best
}

/// Median distance value in a small window around the re-centered seed:
/// the local stroke half-thickness estimate that scales every other
/// threshold.
fn seed_thickness(field: &DistanceField, start: Point) -> f64 {
    let max_x = i64::from(field.width()) - 1;
    let max_y = i64::from(field.height()) - 1;
    #[allow(clippy::cast_possible_truncation)]
    let cx = (start.x.round() as i64).clamp(0, max_x);
    #[allow(clippy::cast_possible_truncation)]
    let cy = (start.y.round() as i64).clamp(0, max_y);

    let mut values: Vec<f32> = Vec::new();
    for y in (cy - THICKNESS_RADIUS).max(0)..=(cy + THICKNESS_RADIUS).min(max_y) {
        for x in (cx - THICKNESS_RADIUS).max(0)..=(cx + THICKNESS_RADIUS).min(max_x) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let value = field.value(x as u32, y as u32);
            if value > 0.0 {
                values.push(value);
            }
        }
    }

    if values.is_empty() {
        return field.sample(start.x, start.y);
    }
    values.sort_by(f32::total_cmp);
    f64::from(values[values.len() / 2])
}

/// Scan a ring of candidate angles around the start point and pick the
/// direction with the highest field value that clears the thickness
/// threshold. `None` when no direction qualifies (seed on an isolated
/// speck or sub-pixel stroke).
fn initial_direction(
    field: &DistanceField,
    start: Point,
    radius: f64,
    min_keep: f64,
) -> Option<Heading> {
    let mut best: Option<(f64, Heading)> = None;
    for i in 0..RING_DIRECTIONS {
        #[allow(clippy::cast_precision_loss)]
        let theta = std::f64::consts::TAU * i as f64 / RING_DIRECTIONS as f64;
        let direction = Heading::from_angle(theta);
        let probe = advance(start, direction, radius);
        let value = field.sample(probe.x, probe.y);
        if value >= min_keep && best.is_none_or(|(v, _)| value > v) {
            best = Some((value, direction));
        }
    }
    best.map(|(_, direction)| direction)
}

/// One directional walk from `start`. Returns the collected points,
/// excluding the start itself (the caller owns the merge).
fn walk_direction(
    field: &DistanceField,
    start: Point,
    mut direction: Heading,
    min_keep: f64,
    preset: &WandPreset,
) -> Vec<Point> {
    let momentum = preset.momentum.clamp(0.0, 1.0);
    let mut points: Vec<Point> = Vec::with_capacity(preset.max_points.min(1024));
    let mut position = start;
    let mut steps = 0usize;

    while steps < preset.max_steps && points.len() < preset.max_points {
        steps += 1;
        let center = advance(position, direction, preset.step_size);

        if let Some(next) = best_perpendicular(field, position, center, direction, min_keep) {
            if next.distance(position) < STALL_EPSILON {
                break; // numerical stall
            }
            let Some(taken) = Heading::between(position, next) else {
                break;
            };
            let Some(blended) = direction.blend(taken, momentum) else {
                break; // direction reversal cancelled the momentum blend
            };
            direction = blended;
            position = next;
            points.push(position);
        } else if let Some(next) = gap_search(field, position, direction, min_keep, preset) {
            // Bridged a dash or occlusion: momentum resets to the jump.
            let Some(jump) = Heading::between(position, next) else {
                break;
            };
            direction = jump;
            position = next;
            points.push(position);
        } else {
            break; // gap search exhausted
        }
    }

    points
}

/// Search perpendicular to the travel direction, within a window sized to
/// the local stroke thickness, for the offset maximizing the field value.
///
/// Candidates below the thickness threshold are ignored; the score of each
/// survivor is its field value minus a small penalty per pixel of offset.
fn best_perpendicular(
    field: &DistanceField,
    position: Point,
    center: Point,
    direction: Heading,
    min_keep: f64,
) -> Option<Point> {
    let local_thickness = field
        .sample(center.x, center.y)
        .max(field.sample(position.x, position.y))
        .max(1.0);
    let half_width = local_thickness + 1.0;
    let perpendicular = direction.perpendicular();

    #[allow(clippy::cast_possible_truncation)]
    let half_steps = (half_width / PERP_STEP).ceil() as i64;
    let mut best: Option<(f64, Point)> = None;

    for k in -half_steps..=half_steps {
        #[allow(clippy::cast_precision_loss)]
        let offset = k as f64 * PERP_STEP;
        let candidate = advance(center, perpendicular, offset);
        let value = field.sample(candidate.x, candidate.y);
        if value < min_keep {
            continue;
        }
        let score = CENTER_BIAS.mul_add(-offset.abs(), value);
        if best.is_none_or(|(s, _)| score > s) {
            best = Some((score, candidate));
        }
    }

    best.map(|(_, candidate)| candidate)
}

/// Cone search for a point where the stroke resumes: angles sweep outward
/// from straight ahead (0, then +/- delta, +/- 2*delta, ...) at each
/// radius, radii inner to outer, so the nearest, straightest continuation
/// wins. `None` when `max_gap` is exhausted (or bridging is disabled).
fn gap_search(
    field: &DistanceField,
    position: Point,
    direction: Heading,
    min_keep: f64,
    preset: &WandPreset,
) -> Option<Point> {
    if preset.max_gap <= 0.0 {
        return None;
    }

    let radius_step = preset.step_size.max(1.0);
    let mut radius = radius_step;
    while radius <= preset.max_gap {
        for k in 0..=GAP_ANGLE_STEPS {
            #[allow(clippy::cast_precision_loss)]
            let delta = preset.gap_angle * k as f64 / GAP_ANGLE_STEPS as f64;
            for sign in [1.0, -1.0] {
                if k == 0 && sign < 0.0 {
                    continue;
                }
                let candidate = advance(position, direction.rotated(delta * sign), radius);
                if field.sample(candidate.x, candidate.y) >= min_keep {
                    return Some(candidate);
                }
            }
        }
        radius += radius_step;
    }
    None
}
