//! Eye region isolation.

#![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use image::{imageops, GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as PolygonPoint;
use tracing::debug;

use super::calibration::{Calibration, IRIS_TRIM};
use super::pupil::{image_processing, Pupil, PupilLocalizer};
use crate::domain::{EyeSide, LandmarkSet, Point};

/// Pixels added around the eye contour's bounding box.
pub const EYE_MARGIN: i32 = 5;

/// An eye cropped out of a frame.
///
/// Pixels outside the eye contour are painted white so eyelids, brows and
/// skin never take part in binarization.
#[derive(Debug, Clone)]
pub struct EyeFrame {
    pub image: GrayImage,
    /// Top-left corner of the crop in frame coordinates.
    pub origin: Point,
}

impl EyeFrame {
    /// Crops the margin-expanded bounding box of `contour` out of `frame`,
    /// clamped to the frame, and masks everything outside the contour.
    #[must_use]
    pub fn isolate(frame: &GrayImage, contour: &[Point; 6]) -> Self {
        let (width, height) = frame.dimensions();
        let min_x = contour.iter().map(|p| p.x).min().unwrap_or(0);
        let max_x = contour.iter().map(|p| p.x).max().unwrap_or(0);
        let min_y = contour.iter().map(|p| p.y).min().unwrap_or(0);
        let max_y = contour.iter().map(|p| p.y).max().unwrap_or(0);

        let x0 = clamp_to(min_x.saturating_sub(EYE_MARGIN), width);
        let x1 = clamp_to(max_x.saturating_add(EYE_MARGIN), width);
        let y0 = clamp_to(min_y.saturating_sub(EYE_MARGIN), height);
        let y1 = clamp_to(max_y.saturating_add(EYE_MARGIN), height);
        let origin = Point::new(x0 as i32, y0 as i32);

        let mut image =
            imageops::crop_imm(frame, x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
                .to_image();

        if image.width() == 0 || image.height() == 0 {
            return Self { image, origin };
        }

        let mut inside = GrayImage::new(image.width(), image.height());
        let polygon = polygon_in_crop(contour, origin);
        if polygon.len() >= 3 {
            draw_polygon_mut(&mut inside, &polygon, Luma([u8::MAX]));
        }
        for (pixel, mask) in image.pixels_mut().zip(inside.pixels()) {
            if mask.0[0] == 0 {
                pixel.0[0] = u8::MAX;
            }
        }

        Self { image, origin }
    }
}

fn clamp_to(value: i32, limit: u32) -> u32 {
    let limit = i32::try_from(limit).unwrap_or(i32::MAX);
    value.clamp(0, limit).unsigned_abs()
}

/// Bound on crop-local polygon coordinates. Keeps the rasterizer's own
/// edge arithmetic far from `i32` overflow; only vertices lying tens of
/// thousands of pixels off the crop are moved.
const POLYGON_LIMIT: i64 = 1 << 16;

#[allow(clippy::cast_possible_truncation)]
fn to_crop(value: i32, origin: i32) -> i32 {
    (i64::from(value) - i64::from(origin)).clamp(-POLYGON_LIMIT, POLYGON_LIMIT) as i32
}

/// Contour relative to the crop, with repeated vertices removed so the
/// polygon rasterizer sees a simple open ring.
fn polygon_in_crop(contour: &[Point; 6], origin: Point) -> Vec<PolygonPoint<i32>> {
    let mut polygon: Vec<PolygonPoint<i32>> = Vec::with_capacity(contour.len());
    for p in contour {
        let local = PolygonPoint::new(to_crop(p.x, origin.x), to_crop(p.y, origin.y));
        if polygon.last() != Some(&local) {
            polygon.push(local);
        }
    }
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    polygon
}

/// Width over height of the eye contour. Grows as the eyelid closes.
///
/// A contour with no vertical extent yields infinity.
fn blinking_ratio(contour: &[Point; 6]) -> f64 {
    let left = contour[0];
    let right = contour[3];
    let top = contour[1].midpoint(contour[2]);
    let bottom = contour[5].midpoint(contour[4]);

    let width = left.distance(right);
    let height = top.distance(bottom);
    if height < 1.0 {
        return f64::INFINITY;
    }
    width / height
}

/// One eye, as seen in a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Eye {
    pub side: EyeSide,
    /// Top-left corner of the eye region in frame coordinates.
    pub origin: Point,
    /// Half the eye region's width and height.
    pub center: (f64, f64),
    /// Contour width over height.
    pub blinking: f64,
    /// Threshold the region was binarized with, if one could be found.
    pub threshold: Option<u8>,
    /// Pupil in eye-region coordinates.
    pub pupil: Option<Pupil>,
}

impl Eye {
    /// Isolates one eye and locates its pupil.
    ///
    /// Until `calibration` is complete the best threshold for this very region
    /// is computed and recorded as a calibration sample. Afterwards the
    /// calibrated mean for `side` is used.
    pub fn build(
        frame: &GrayImage,
        landmarks: &LandmarkSet,
        side: EyeSide,
        calibration: &mut Calibration,
        localizer: &PupilLocalizer,
    ) -> Self {
        let contour = landmarks.eye_points(side);
        let eye_frame = EyeFrame::isolate(frame, &contour);
        let (width, height) = eye_frame.image.dimensions();

        let threshold = if calibration.is_complete() {
            calibration.threshold(side)
        } else {
            calibration.evaluate(&eye_frame.image, side)
        };
        let threshold = match threshold {
            Ok(threshold) => Some(threshold),
            Err(err) => {
                debug!(%side, error = %err, "no usable threshold");
                None
            }
        };

        let pupil = threshold
            .and_then(|threshold| localizer.detect(&image_processing(&eye_frame.image, threshold)));
        if pupil.is_none() {
            debug!(%side, width, height, "pupil not found");
        }

        Self {
            side,
            origin: eye_frame.origin,
            center: (f64::from(width) / 2.0, f64::from(height) / 2.0),
            blinking: blinking_ratio(&contour),
            threshold,
            pupil,
        }
    }

    /// Pupil position in frame coordinates.
    #[must_use]
    pub fn pupil_coords(&self) -> Option<Point> {
        self.pupil
            .map(|pupil| self.origin + Point::new(pupil.x, pupil.y))
    }

    /// Pupil x over the trimmed region width; 0.0 right, 1.0 left.
    #[must_use]
    pub fn horizontal_ratio(&self) -> Option<f64> {
        let pupil = self.pupil?;
        ratio(pupil.x, self.center.0)
    }

    /// Pupil y over the trimmed region height; 0.0 top, 1.0 bottom.
    #[must_use]
    pub fn vertical_ratio(&self) -> Option<f64> {
        let pupil = self.pupil?;
        ratio(pupil.y, self.center.1)
    }
}

fn ratio(position: i32, half_extent: f64) -> Option<f64> {
    let span = 2.0f64.mul_add(half_extent, -2.0 * f64::from(IRIS_TRIM));
    (span > 0.0).then(|| f64::from(position) / span)
}
