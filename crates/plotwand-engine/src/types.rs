//! Shared types for the plotwand tracing engine.

use serde::{Deserialize, Serialize};

use crate::distance::DistanceField;
use crate::preset::WandPreset;

/// Re-export `GrayImage` so downstream crates can reference the
/// luminance field without depending on `image` directly.
pub use image::GrayImage;

/// A 2D point in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// An ordered, open polyline of sub-pixel points: the output of a trace.
///
/// The first and last points are the two walk termination points, not the
/// seed; the seed lies somewhere in the interior of a bidirectional walk.
/// An empty or single-point path signals "no stroke detected at seed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path(Vec<Point>);

impl Path {
    /// Create a new path from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the path has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the path.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the path carries no usable trace (< 2 points).
    ///
    /// Callers treat a degenerate path as "no stroke found at seed".
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.0.len() < 2
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the path and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Total arc length along the path, in pixels.
    #[must_use]
    pub fn arc_length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Immutable RGBA pixel snapshot taken at trace time.
///
/// The engine never mutates the snapshot; one `PixelImage` may back any
/// number of concurrent preset evaluations.
#[derive(Debug, Clone)]
pub struct PixelImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelImage {
    /// Wrap a raw RGBA buffer (4 bytes per pixel, row-major).
    ///
    /// # Errors
    ///
    /// Returns [`WandError::ZeroDimensions`] if either dimension is zero.
    /// Returns [`WandError::BufferSize`] if the buffer length is not
    /// `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, WandError> {
        if width == 0 || height == 0 {
            return Err(WandError::ZeroDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(WandError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode encoded image bytes (PNG, JPEG, BMP, WebP) into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`WandError::EmptyInput`] if `bytes` is empty.
    /// Returns [`WandError::ImageDecode`] if the format is unrecognized
    /// or the data is corrupt.
    pub fn decode(bytes: &[u8]) -> Result<Self, WandError> {
        if bytes.is_empty() {
            return Err(WandError::EmptyInput);
        }
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
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

    /// Dimensions of the snapshot.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// RGBA channels of the pixel at `(x, y)`.
    ///
    /// Coordinates must be in bounds; all engine loops iterate within
    /// the snapshot's own dimensions.
    #[must_use]
    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// The raw RGBA buffer (row-major, 4 bytes per pixel).
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }
}

/// Per-pixel "ink" classification, derived from the luminance field and
/// never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BinaryMask {
    /// Create an all-background mask of the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
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

    /// Whether the pixel at `(x, y)` is classified as ink.
    #[must_use]
    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Set the classification of the pixel at `(x, y)`.
    pub fn set_ink(&mut self, x: u32, y: u32, ink: bool) {
        self.bits[y as usize * self.width as usize + x as usize] = ink;
    }

    /// Number of ink pixels in the mask.
    #[must_use]
    pub fn ink_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Render the mask as a grayscale image (ink = 255, background = 0)
    /// for previews and stage dumps.
    #[must_use]
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([if self.is_ink(x, y) { 255 } else { 0 }])
        })
    }
}

/// One candidate trace: the preset that produced it and the resulting path.
///
/// Ephemeral output of a single pipeline run; the point-capture layer
/// consumes it immediately and discards it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    /// The parameter bundle this path was traced with.
    pub preset: WandPreset,
    /// The simplified traced path (possibly empty or single-point).
    pub path: Path,
}

/// Result of running the tracing pipeline with all intermediate stage
/// outputs preserved.
///
/// Each field captures the output of one logical pipeline stage, enabling
/// tooling to inspect the mask, despeckled mask, distance field, raw walk,
/// and final simplified path.
#[derive(Debug, Clone)]
pub struct StagedTrace {
    /// Stage 1: luminance field sampled from the RGBA snapshot.
    pub luminance: GrayImage,
    /// Stage 2: adaptive binarization output.
    pub mask: BinaryMask,
    /// Stage 3: mask after small-component removal.
    pub filtered: BinaryMask,
    /// Stage 4: chamfer distance field over the filtered mask.
    pub distance: DistanceField,
    /// Stage 5: raw bidirectional walk, before simplification.
    pub raw_path: Path,
    /// Stage 6: RDP-simplified path, the final output.
    pub path: Path,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Errors that can occur while constructing an input snapshot.
///
/// Degenerate trace outcomes (seed off-stroke, blank image) are not
/// errors: they surface as empty or single-point [`Path`]s.
#[derive(Debug, thiserror::Error)]
pub enum WandError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The RGBA buffer length does not match the stated dimensions.
    #[error("RGBA buffer length mismatch: expected {expected} bytes, got {actual}")]
    BufferSize {
        /// Expected length (`width * height * 4`).
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// One or both image dimensions were zero.
    #[error("image dimensions must be non-zero (got {width}x{height})")]
    ZeroDimensions {
        /// Supplied width.
        width: u32,
        /// Supplied height.
        height: u32,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_distance_to_self_is_zero() {
        let p = Point::new(7.0, 11.0);
        assert!(p.distance(p).abs() < f64::EPSILON);
    }

    // --- Path tests ---

    #[test]
    fn path_empty_and_singleton_are_degenerate() {
        assert!(Path::new(vec![]).is_degenerate());
        assert!(Path::new(vec![Point::new(1.0, 1.0)]).is_degenerate());
        assert!(!Path::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]).is_degenerate());
    }

    #[test]
    fn path_first_and_last() {
        let path = Path::new(vec![
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            Point::new(5.0, 6.0),
        ]);
        assert_eq!(path.first(), Some(&Point::new(1.0, 2.0)));
        assert_eq!(path.last(), Some(&Point::new(5.0, 6.0)));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn path_arc_length_of_right_angle() {
        let path = Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 4.0),
        ]);
        assert!((path.arc_length() - 7.0).abs() < 1e-12);
    }

    // --- PixelImage tests ---

    #[test]
    fn pixel_image_rejects_zero_dimensions() {
        let result = PixelImage::from_rgba(0, 10, vec![]);
        assert!(matches!(result, Err(WandError::ZeroDimensions { .. })));
    }

    #[test]
    fn pixel_image_rejects_short_buffer() {
        let result = PixelImage::from_rgba(2, 2, vec![0; 15]);
        assert!(matches!(
            result,
            Err(WandError::BufferSize {
                expected: 16,
                actual: 15,
            })
        ));
    }

    #[test]
    fn pixel_image_accessors() {
        let mut data = vec![255u8; 2 * 2 * 4];
        // Pixel (1, 0) is opaque red.
        data[4..8].copy_from_slice(&[200, 10, 20, 255]);
        let img = PixelImage::from_rgba(2, 2, data).unwrap();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 2);
        assert_eq!(img.rgba(1, 0), [200, 10, 20, 255]);
        assert_eq!(
            img.dimensions(),
            Dimensions {
                width: 2,
                height: 2,
            }
        );
    }

    #[test]
    fn pixel_image_decode_empty_input() {
        assert!(matches!(PixelImage::decode(&[]), Err(WandError::EmptyInput)));
    }

    #[test]
    fn pixel_image_decode_corrupt_input() {
        let result = PixelImage::decode(&[0xFF, 0x00, 0x12]);
        assert!(matches!(result, Err(WandError::ImageDecode(_))));
    }

    #[test]
    fn pixel_image_decode_round_trips_png() {
        let img = image::RgbaImage::from_fn(3, 2, |x, y| image::Rgba([x as u8, y as u8, 7, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();

        let decoded = PixelImage::decode(&buf).unwrap();
        assert_eq!(decoded.width(), 3);
        assert_eq!(decoded.height(), 2);
        assert_eq!(decoded.rgba(2, 1), [2, 1, 7, 255]);
    }

    // --- BinaryMask tests ---

    #[test]
    fn mask_starts_empty() {
        let mask = BinaryMask::new(4, 3);
        assert_eq!(mask.ink_count(), 0);
        assert!(!mask.is_ink(0, 0));
    }

    #[test]
    fn mask_set_and_get() {
        let mut mask = BinaryMask::new(4, 3);
        mask.set_ink(2, 1, true);
        assert!(mask.is_ink(2, 1));
        assert!(!mask.is_ink(1, 2));
        assert_eq!(mask.ink_count(), 1);
    }

    #[test]
    fn mask_to_gray_image_marks_ink_white() {
        let mut mask = BinaryMask::new(2, 2);
        mask.set_ink(0, 1, true);
        let gray = mask.to_gray_image();
        assert_eq!(gray.get_pixel(0, 1).0[0], 255);
        assert_eq!(gray.get_pixel(1, 1).0[0], 0);
    }

    // --- Error display tests ---

    #[test]
    fn error_display_strings() {
        assert_eq!(
            WandError::EmptyInput.to_string(),
            "input image data is empty"
        );
        assert_eq!(
            WandError::BufferSize {
                expected: 16,
                actual: 4,
            }
            .to_string(),
            "RGBA buffer length mismatch: expected 16 bytes, got 4",
        );
    }

    // --- Serde round-trip tests ---

    #[test]
    fn point_serde_round_trip() {
        let p = Point::new(3.25, -2.5);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn path_serde_round_trip() {
        let path = Path::new(vec![Point::new(0.0, 0.0), Point::new(1.5, 2.5)]);
        let json = serde_json::to_string(&path).unwrap();
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(path, back);
    }
}
