//! Pupil localization.
//!
//! An eye region is smoothed, eroded and binarized so the iris becomes a
//! dark blob on a white background. The blob is found by contour tracing and
//! its centroid computed from the contour's geometric moments.

#![allow(clippy::cast_possible_truncation)]

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::filter::median_filter;
use imageproc::morphology::{grayscale_erode, Mask};
use imageproc::point::Point as ContourPoint;
use tracing::trace;

/// Median window radius of the noise-reduction pass.
const SMOOTHING_RADIUS: u32 = 1;

/// Number of 3x3 erosion passes. Grows dark regions to close eyelash gaps.
const ERODE_PASSES: usize = 3;

/// Smooths an eye region and binarizes it at `threshold`.
///
/// Pixels darker than `threshold` become black (iris), every other pixel
/// white. The pass is deterministic: the same input always yields the same
/// binary image.
#[must_use]
pub fn image_processing(eye_frame: &GrayImage, threshold: u8) -> GrayImage {
    if eye_frame.width() == 0 || eye_frame.height() == 0 {
        return eye_frame.clone();
    }

    let mut processed = median_filter(eye_frame, SMOOTHING_RADIUS, SMOOTHING_RADIUS);
    let square = Mask::square(1);
    for _ in 0..ERODE_PASSES {
        processed = grayscale_erode(&processed, &square);
    }

    for pixel in processed.pixels_mut() {
        pixel.0[0] = if pixel.0[0] < threshold { 0 } else { u8::MAX };
    }
    processed
}

/// A located pupil, in eye-region coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pupil {
    pub x: i32,
    pub y: i32,
    /// Area enclosed by the iris contour, in pixels.
    pub area: f64,
}

/// Finds the iris blob in a binarized eye region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PupilLocalizer {
    /// Smallest accepted blob area as a fraction of the eye region.
    pub min_area_ratio: f64,
    /// Largest accepted blob area as a fraction of the eye region.
    pub max_area_ratio: f64,
}

impl Default for PupilLocalizer {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.01,
            max_area_ratio: 0.85,
        }
    }
}

impl PupilLocalizer {
    /// Creates a localizer accepting blobs within the given area fractions.
    #[must_use]
    pub const fn new(min_area_ratio: f64, max_area_ratio: f64) -> Self {
        Self {
            min_area_ratio,
            max_area_ratio,
        }
    }

    /// Locates the pupil in a binary eye image produced by [`image_processing`].
    ///
    /// Among the outer contours of dark blobs whose area falls inside the
    /// accepted range, the largest wins. Returns `None` when no blob qualifies.
    #[must_use]
    pub fn detect(&self, binary: &GrayImage) -> Option<Pupil> {
        let region_area = f64::from(binary.width()) * f64::from(binary.height());
        if region_area == 0.0 {
            return None;
        }

        // Contours are traced around non-zero pixels, so dark must become foreground.
        let mut dark = binary.clone();
        image::imageops::invert(&mut dark);

        let best = find_contours::<i32>(&dark)
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer)
            .filter_map(|contour| ContourMoments::of(&contour.points))
            .filter(|moments| {
                let ratio = moments.area() / region_area;
                trace!(area = moments.area(), ratio, "iris candidate");
                (self.min_area_ratio..=self.max_area_ratio).contains(&ratio)
            })
            .max_by(|a, b| a.area().total_cmp(&b.area()))?;

        let (x, y) = best.centroid();
        Some(Pupil {
            x: x as i32,
            y: y as i32,
            area: best.area(),
        })
    }
}

/// Raw polygon moment sums of a closed contour (Green's theorem).
///
/// `cross` is twice the signed area; `x` and `y` are six times the first
/// order moments. Kept unscaled so the centroid is a single division.
#[derive(Debug, Clone, Copy)]
struct ContourMoments {
    cross: f64,
    x: f64,
    y: f64,
}

impl ContourMoments {
    fn of(points: &[ContourPoint<i32>]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }

        let mut moments = Self {
            cross: 0.0,
            x: 0.0,
            y: 0.0,
        };
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            let (x0, y0) = (f64::from(p.x), f64::from(p.y));
            let (x1, y1) = (f64::from(q.x), f64::from(q.y));
            let cross = x0.mul_add(y1, -(x1 * y0));
            moments.cross += cross;
            moments.x += (x0 + x1) * cross;
            moments.y += (y0 + y1) * cross;
        }

        // Degenerate (single pixel or one pixel wide) contours enclose nothing.
        (moments.cross != 0.0).then_some(moments)
    }

    fn area(&self) -> f64 {
        self.cross.abs() / 2.0
    }

    fn centroid(&self) -> (f64, f64) {
        let denom = 3.0 * self.cross;
        (self.x / denom, self.y / denom)
    }
}
