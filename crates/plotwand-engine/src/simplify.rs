//! Path simplification (Ramer-Douglas-Peucker) and resampling helpers.
//!
//! RDP reduces the raw walked polyline to a minimal point set whose
//! deviation from the original never exceeds the given epsilon. The
//! endpoints are always preserved. Implemented iteratively with an
//! explicit segment stack so deep zig-zag paths cannot overflow the call
//! stack.
//!
//! [`resample_even`] re-spaces a path to a caller-specified number of
//! points at even arc-length intervals; downstream point capture uses it
//! to turn a trace into a fixed-size sample.
//!
//! This is step 6 in the pipeline, after the ridge walk.

use crate::types::{Path, Point};

/// Simplify a path with the Ramer-Douglas-Peucker algorithm.
///
/// Every removed point lies within `epsilon` pixels of the simplified
/// polyline; the first and last points are never moved. Paths with fewer
/// than three points are returned unchanged.
#[must_use = "returns the simplified path"]
pub fn simplify(path: &Path, epsilon: f64) -> Path {
    let points = path.points();
    if points.len() < 3 {
        return path.clone();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    // Segment stack of (start, end) index pairs still to be examined.
    let mut pending = vec![(0usize, points.len() - 1)];
    while let Some((start, end)) = pending.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut farthest = start;
        let mut max_distance = 0.0;
        for i in (start + 1)..end {
            let d = deviation(points[i], points[start], points[end]);
            if d > max_distance {
                max_distance = d;
                farthest = i;
            }
        }

        if max_distance > epsilon {
            keep[farthest] = true;
            pending.push((start, farthest));
            pending.push((farthest, end));
        }
    }

    Path::new(
        points
            .iter()
            .zip(&keep)
            .filter(|&(_, k)| *k)
            .map(|(&p, _)| p)
            .collect(),
    )
}

/// Perpendicular distance from `p` to the infinite line through `a` and
/// `b`; point-to-point distance when the endpoints coincide.
fn deviation(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_squared = dx.mul_add(dx, dy * dy);
    if length_squared == 0.0 {
        return p.distance(a);
    }
    let cross = dx.mul_add(p.y - a.y, -(dy * (p.x - a.x)));
    cross.abs() / length_squared.sqrt()
}

/// Resample a path to exactly `count` points spaced evenly by arc length.
///
/// The first and last points of the input are preserved exactly.
/// Degenerate inputs (fewer than two points, `count < 2`, or zero total
/// length) are returned unchanged.
#[must_use = "returns the resampled path"]
pub fn resample_even(path: &Path, count: usize) -> Path {
    let points = path.points();
    if points.len() < 2 || count < 2 {
        return path.clone();
    }

    let total = path.arc_length();
    if total <= f64::EPSILON {
        return path.clone();
    }

    let mut resampled = Vec::with_capacity(count);
    resampled.push(points[0]);

    let mut segment = 0usize; // index of the segment's start point
    let mut consumed = 0.0; // arc length before the current segment
    #[allow(clippy::cast_precision_loss)]
    let spacing = total / (count - 1) as f64;

    for i in 1..count - 1 {
        #[allow(clippy::cast_precision_loss)]
        let target = spacing * i as f64;
        while segment + 2 < points.len()
            && consumed + points[segment].distance(points[segment + 1]) < target
        {
            consumed += points[segment].distance(points[segment + 1]);
            segment += 1;
        }
        let a = points[segment];
        let b = points[segment + 1];
        let length = a.distance(b);
        let t = if length > f64::EPSILON {
            ((target - consumed) / length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        resampled.push(Point::new(
            (b.x - a.x).mul_add(t, a.x),
            (b.y - a.y).mul_add(t, a.y),
        ));
    }

    resampled.push(points[points.len() - 1]);
    Path::new(resampled)
}
