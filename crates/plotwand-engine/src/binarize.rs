//! Adaptive binarization: luminance field to ink/background mask.
//!
//! Each pixel is compared against the mean luminance of a square window
//! centered on it, computed in O(1) from a 2D prefix sum ("integral
//! image"). A pixel is ink when it is strictly darker than
//! `bias * window_mean`. The local threshold makes detection robust to
//! large-scale background gradients (faint grid lines, scan shading)
//! that defeat any single global threshold.
//!
//! This is step 2 in the pipeline, between luminance sampling and
//! component filtering.

use image::GrayImage;

use crate::types::BinaryMask;

/// 2D prefix sum of a luminance field.
///
/// Entry `(x + 1, y + 1)` holds the sum of all pixels in the rectangle
/// `[0, x] x [0, y]`; row 0 and column 0 are zero so window sums need no
/// boundary branches. `u64` cannot overflow: the worst case is
/// `255 * 2^32 < 2^40`.
struct IntegralImage {
    width: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(gray: &GrayImage) -> Self {
        let width = gray.width() as usize;
        let height = gray.height() as usize;
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];

        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += u64::from(gray.get_pixel(x as u32, y as u32).0[0]);
                sums[(y + 1) * stride + (x + 1)] = sums[y * stride + (x + 1)] + row_sum;
            }
        }

        Self { width, sums }
    }

    /// Sum of pixels in the inclusive rectangle `[x0, x1] x [y0, y1]`.
    fn window_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let stride = self.width + 1;
        self.sums[(y1 + 1) * stride + (x1 + 1)] + self.sums[y0 * stride + x0]
            - self.sums[y0 * stride + (x1 + 1)]
            - self.sums[(y1 + 1) * stride + x0]
    }
}

/// Classify every pixel as ink or background using a locally adaptive
/// threshold.
///
/// `window_size` is the side length of the averaging window (forced odd,
/// minimum 1); `bias` scales the local mean, so values below 1.0 demand
/// that ink be distinctly darker than its surroundings. Windows at the
/// image edge are clipped to bounds with the pixel count adjusted, so the
/// mean never divides by zero.
///
/// Always produces a full mask: an entirely light image degenerates to an
/// empty mask, which downstream stages treat as "no stroke found".
#[must_use = "returns the ink classification mask"]
pub fn binarize(gray: &GrayImage, window_size: u32, bias: f64) -> BinaryMask {
    let width = gray.width();
    let height = gray.height();
    let mut mask = BinaryMask::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }

    let window = window_size.max(1) | 1; // force odd
    let half = (window / 2) as usize;
    let integral = IntegralImage::new(gray);

    for y in 0..height as usize {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half).min(height as usize - 1);
        for x in 0..width as usize {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half).min(width as usize - 1);

            let count = (x1 - x0 + 1) * (y1 - y0 + 1);
            #[allow(clippy::cast_precision_loss)]
            let mean = integral.window_sum(x0, y0, x1, y1) as f64 / count as f64;

            let value = f64::from(gray.get_pixel(x as u32, y as u32).0[0]);
            if value < bias * mean {
                mask.set_ink(x as u32, y as u32, true);
            }
        }
    }

    mask
}
