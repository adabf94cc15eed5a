//! Luminance sampling: RGBA snapshot to single-channel intensity field.
//!
//! This is step 1 in the pipeline: the immutable [`PixelImage`] is reduced
//! to a grayscale field that the adaptive binarizer thresholds. The
//! standard Rec. 601 weights are used: `0.299*R + 0.587*G + 0.114*B`.
//!
//! Alpha is composited over white before weighting, so transparent
//! regions (e.g. padding around an exported chart) read as background
//! rather than as ink.

use image::GrayImage;

use crate::types::PixelImage;

/// Sample the luminance of every pixel in the snapshot.
///
/// Returns a grayscale image of the same dimensions, 0 (dark) to 255
/// (light).
#[must_use = "returns the sampled luminance field"]
pub fn luminance(image: &PixelImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.rgba(x, y);
        image::Luma([pixel_luminance(r, g, b, a)])
    })
}

/// Weighted luminance of one RGBA pixel, alpha-composited over white.
fn pixel_luminance(r: u8, g: u8, b: u8, a: u8) -> u8 {
    let alpha = f64::from(a) / 255.0;
    let over_white = |c: u8| alpha.mul_add(f64::from(c), (1.0 - alpha) * 255.0);
    let luma = 0.299f64.mul_add(
        over_white(r),
        0.587f64.mul_add(over_white(g), 0.114 * over_white(b)),
    );
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        luma.round().clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::PixelImage;

    fn single_pixel(rgba: [u8; 4]) -> PixelImage {
        PixelImage::from_rgba(1, 1, rgba.to_vec()).unwrap()
    }

    #[test]
    fn black_maps_to_zero_and_white_to_full() {
        let black = luminance(&single_pixel([0, 0, 0, 255]));
        let white = luminance(&single_pixel([255, 255, 255, 255]));
        assert_eq!(black.get_pixel(0, 0).0[0], 0);
        assert_eq!(white.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn weights_favor_green_over_red_over_blue() {
        let r = luminance(&single_pixel([255, 0, 0, 255])).get_pixel(0, 0).0[0];
        let g = luminance(&single_pixel([0, 255, 0, 255])).get_pixel(0, 0).0[0];
        let b = luminance(&single_pixel([0, 0, 255, 255])).get_pixel(0, 0).0[0];
        assert!(
            g > r && r > b,
            "expected green > red > blue luminance, got R={r} G={g} B={b}",
        );
    }

    #[test]
    fn transparent_pixels_read_as_background() {
        // Fully transparent black composites to white.
        let transparent = luminance(&single_pixel([0, 0, 0, 0]));
        assert_eq!(transparent.get_pixel(0, 0).0[0], 255);

        // Half-transparent black lands mid-gray.
        let half = luminance(&single_pixel([0, 0, 0, 128])).get_pixel(0, 0).0[0];
        assert!((120..=135).contains(&half), "got {half}");
    }

    #[test]
    fn dimensions_match_input() {
        let img = PixelImage::from_rgba(5, 3, vec![200u8; 5 * 3 * 4]).unwrap();
        let gray = luminance(&img);
        assert_eq!(gray.width(), 5);
        assert_eq!(gray.height(), 3);
    }
}
