//! Component filtering: remove ink regions too small to be strokes.
//!
//! Antialiasing fringes and scan noise leave isolated specks in the
//! binarized mask. Left in place they become spurious high-distance
//! islands that the ridge walker can latch onto, so connected components
//! below a minimum pixel count are cleared before the distance field is
//! built. Runs once globally, not per walk.
//!
//! This is step 3 in the pipeline, between binarization and the distance
//! transform.

use crate::types::BinaryMask;

/// 8-connected neighbor offsets.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Remove 8-connected ink components smaller than `min_size` pixels.
///
/// A `min_size` of 0 or 1 keeps everything. The input mask is not
/// mutated; a filtered copy is returned.
#[must_use = "returns the despeckled mask"]
pub fn filter_components(mask: &BinaryMask, min_size: usize) -> BinaryMask {
    let mut filtered = mask.clone();
    if min_size <= 1 {
        return filtered;
    }

    let width = i64::from(mask.width());
    let height = i64::from(mask.height());
    let mut visited = BinaryMask::new(mask.width(), mask.height());
    // Reused across components; flood fill uses an explicit stack so
    // pathological masks cannot overflow the call stack.
    let mut stack: Vec<(u32, u32)> = Vec::new();
    let mut component: Vec<(u32, u32)> = Vec::new();

    for start_y in 0..mask.height() {
        for start_x in 0..mask.width() {
            if !mask.is_ink(start_x, start_y) || visited.is_ink(start_x, start_y) {
                continue;
            }

            component.clear();
            stack.push((start_x, start_y));
            visited.set_ink(start_x, start_y, true);

            while let Some((x, y)) = stack.pop() {
                component.push((x, y));
                for (dx, dy) in NEIGHBORS {
                    let nx = i64::from(x) + dx;
                    let ny = i64::from(y) + dy;
                    if nx < 0 || ny < 0 || nx >= width || ny >= height {
                        continue;
                    }
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let (nx, ny) = (nx as u32, ny as u32);
                    if mask.is_ink(nx, ny) && !visited.is_ink(nx, ny) {
                        visited.set_ink(nx, ny, true);
                        stack.push((nx, ny));
                    }
                }
            }

            if component.len() < min_size {
                for &(x, y) in &component {
                    filtered.set_ink(x, y, false);
                }
            }
        }
    }

    filtered
}
