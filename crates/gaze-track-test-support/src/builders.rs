//! Synthetic face builders for testing.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point as PolygonPoint;

use gaze_track_core::domain::{EyeSide, FaceRegion, Frame, LandmarkSet, Point};

const FRAME_WIDTH: u32 = 160;
const FRAME_HEIGHT: u32 = 80;
const SKIN: u8 = 180;
const SCLERA: u8 = 230;
const IRIS: u8 = 20;
const EYE_HALF_WIDTH: i32 = 25;
const EYELID_INSET: i32 = 12;

/// A rendered face together with the landmarks and region describing it.
#[derive(Debug, Clone)]
pub struct SyntheticFace {
    pub frame: Frame,
    pub landmarks: LandmarkSet,
    pub region: FaceRegion,
    /// Iris centers in frame coordinates, left then right.
    pub irises: [Point; 2],
}

impl SyntheticFace {
    /// The frame as a decodable image, for writing to disk.
    #[must_use]
    pub fn to_image(&self) -> DynamicImage {
        DynamicImage::ImageLuma8(self.frame.image.clone())
    }
}

/// Builder for a minimal cartoon face: flat skin, two almond-shaped eyes
/// with a bright sclera and a dark round iris.
///
/// Only the twelve eye contour landmarks are meaningful; the remaining
/// points of the 68-point set sit at the middle of the face.
#[derive(Debug, Clone)]
pub struct SyntheticFaceBuilder {
    path: String,
    eye_centers: [Point; 2],
    half_height: i32,
    iris_radius: i32,
    gaze: (i32, i32),
}

impl Default for SyntheticFaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticFaceBuilder {
    /// An open eyed face looking straight ahead.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: "synthetic://face".into(),
            eye_centers: [Point::new(50, 40), Point::new(110, 40)],
            half_height: 12,
            iris_radius: 6,
            gaze: (0, 0),
        }
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Moves both irises by `(dx, dy)` pixels from the eye centers.
    ///
    /// Negative `dx` looks towards the subject's right.
    #[must_use]
    pub const fn looking(mut self, dx: i32, dy: i32) -> Self {
        self.gaze = (dx, dy);
        self
    }

    /// Distance from the eye's horizontal axis to each eyelid.
    #[must_use]
    pub const fn eye_opening(mut self, half_height: i32) -> Self {
        self.half_height = half_height;
        self
    }

    /// Nearly shut eyelids.
    #[must_use]
    pub const fn closed(self) -> Self {
        self.eye_opening(2)
    }

    #[must_use]
    pub const fn iris_radius(mut self, radius: i32) -> Self {
        self.iris_radius = radius;
        self
    }

    /// Renders the face.
    #[must_use]
    #[allow(clippy::missing_panics_doc, clippy::expect_used)]
    pub fn build(self) -> SyntheticFace {
        let mut image = GrayImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Luma([SKIN]));
        let irises = self
            .eye_centers
            .map(|c| Point::new(c.x + self.gaze.0, c.y + self.gaze.1));

        let mut points = vec![Point::new(80, 50); LandmarkSet::LEN];
        for side in EyeSide::BOTH {
            let contour = self.contour(self.eye_centers[side.index()]);
            self.paint_eye(&mut image, &contour, irises[side.index()]);
            let start = 36 + 6 * side.index();
            points[start..start + 6].copy_from_slice(&contour);
        }

        SyntheticFace {
            frame: Frame::from_gray(self.path, image),
            landmarks: LandmarkSet::new(points).expect("68 points"),
            region: FaceRegion::new(10, 5, FRAME_WIDTH - 20, FRAME_HEIGHT - 10),
            irises,
        }
    }

    /// Creates a frame with no face in it.
    #[must_use]
    pub fn blank(path: impl Into<String>) -> Frame {
        Frame::from_gray(
            path,
            GrayImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Luma([SKIN])),
        )
    }

    /// Eye contour in iBUG order: outer corner, upper lid, inner corner, lower lid.
    const fn contour(&self, center: Point) -> [Point; 6] {
        let (x, y, h) = (center.x, center.y, self.half_height);
        [
            Point::new(x - EYE_HALF_WIDTH, y),
            Point::new(x - EYELID_INSET, y - h),
            Point::new(x + EYELID_INSET, y - h),
            Point::new(x + EYE_HALF_WIDTH, y),
            Point::new(x + EYELID_INSET, y + h),
            Point::new(x - EYELID_INSET, y + h),
        ]
    }

    /// Paints sclera inside the contour and the iris clipped to it.
    fn paint_eye(&self, image: &mut GrayImage, contour: &[Point; 6], iris: Point) {
        let (width, height) = image.dimensions();
        let polygon: Vec<_> = contour
            .iter()
            .map(|p| PolygonPoint::new(p.x, p.y))
            .collect();

        let mut opening = GrayImage::new(width, height);
        draw_polygon_mut(&mut opening, &polygon, Luma([u8::MAX]));
        let mut disc = GrayImage::new(width, height);
        draw_filled_circle_mut(&mut disc, (iris.x, iris.y), self.iris_radius, Luma([u8::MAX]));

        for ((pixel, inside), in_iris) in image
            .pixels_mut()
            .zip(opening.pixels())
            .zip(disc.pixels())
        {
            if inside.0[0] == 0 {
                continue;
            }
            pixel.0[0] = if in_iris.0[0] == 0 { SCLERA } else { IRIS };
        }
    }
}
