//! Chamfer distance transform: per-pixel distance to the nearest
//! background pixel.
//!
//! Two raster passes (forward top-left to bottom-right, backward in
//! reverse) propagate minimum accumulated distance through axial
//! neighbors (weight 1) and diagonal neighbors (weight sqrt(2)). The
//! result approximates the Euclidean distance transform, which is enough
//! here: the ridge walker only compares *relative* maxima, and the locus
//! of local maxima approximates the stroke's medial axis.
//!
//! Pixels outside the image count as background, so strokes touching the
//! border get small finite distances and even a fully-ink mask produces a
//! finite field.
//!
//! This is step 4 in the pipeline, between component filtering and the
//! ridge walk.

use crate::types::BinaryMask;

const DIAGONAL: f32 = std::f32::consts::SQRT_2;

/// Per-pixel approximate distance to the nearest background pixel.
///
/// Zero everywhere the mask is background; read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DistanceField {
    /// Build the field from a (despeckled) binary mask.
    #[must_use = "returns the distance field"]
    pub fn build(mask: &BinaryMask) -> Self {
        let width = mask.width() as usize;
        let height = mask.height() as usize;
        let mut values = vec![0.0f32; width * height];
        for y in 0..height {
            for x in 0..width {
                if mask.is_ink(x as u32, y as u32) {
                    values[y * width + x] = f32::INFINITY;
                }
            }
        }

        let mut field = Self {
            width: mask.width(),
            height: mask.height(),
            values,
        };

        // Forward pass: left, upper-left, up, upper-right.
        for y in 0..height {
            for x in 0..width {
                let mut d = field.values[y * width + x];
                d = d.min(field.neighbor(x, y, -1, 0) + 1.0);
                d = d.min(field.neighbor(x, y, -1, -1) + DIAGONAL);
                d = d.min(field.neighbor(x, y, 0, -1) + 1.0);
                d = d.min(field.neighbor(x, y, 1, -1) + DIAGONAL);
                field.values[y * width + x] = d;
            }
        }

        // Backward pass: right, lower-right, down, lower-left.
        for y in (0..height).rev() {
            for x in (0..width).rev() {
                let mut d = field.values[y * width + x];
                d = d.min(field.neighbor(x, y, 1, 0) + 1.0);
                d = d.min(field.neighbor(x, y, 1, 1) + DIAGONAL);
                d = d.min(field.neighbor(x, y, 0, 1) + 1.0);
                d = d.min(field.neighbor(x, y, -1, 1) + DIAGONAL);
                field.values[y * width + x] = d;
            }
        }

        field
    }

    /// Neighbor value with out-of-image cells reading as background (0).
    fn neighbor(&self, x: usize, y: usize, dx: i64, dy: i64) -> f32 {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= i64::from(self.width) || ny >= i64::from(self.height) {
            return 0.0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            self.values[ny as usize * self.width as usize + nx as usize]
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Field value at an integer lattice position.
    #[must_use]
    pub fn value(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    /// Whether a sub-pixel position lies inside the field.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x <= f64::from(self.width - 1) && y <= f64::from(self.height - 1)
    }

    /// Bilinearly interpolated field value at a sub-pixel position.
    ///
    /// Positions outside the field sample as 0 (background), so walkers
    /// that step off the image fail their thickness threshold naturally.
    /// Never returns NaN or infinity.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        if !self.contains(x, y) {
            return 0.0;
        }

        let max_x = f64::from(self.width - 1);
        let max_y = f64::from(self.height - 1);
        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (x0, y0) = (x.floor() as u32, y.floor() as u32);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - f64::from(x0);
        let fy = y - f64::from(y0);

        let top = f64::from(self.value(x0, y0)).mul_add(1.0 - fx, f64::from(self.value(x1, y0)) * fx);
        let bottom =
            f64::from(self.value(x0, y1)).mul_add(1.0 - fx, f64::from(self.value(x1, y1)) * fx);
        top.mul_add(1.0 - fy, bottom * fy)
    }

    /// Largest value in the field: the deepest stroke half-thickness.
    #[must_use]
    pub fn max_value(&self) -> f32 {
        self.values.iter().copied().fold(0.0f32, f32::max)
    }

    /// Render the field as a grayscale preview, normalized so the global
    /// maximum maps to 255. Used by stage dumps; not part of tracing.
    #[must_use]
    pub fn to_gray_image(&self) -> image::GrayImage {
        let max = self.max_value();
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            let v = if max > 0.0 { self.value(x, y) / max } else { 0.0 };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            image::Luma([(v * 255.0).round() as u8])
        })
    }
}
