//! Facial landmark types (68-point iBUG scheme).

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{GazeError, Result};

/// An integer pixel coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Integer midpoint of two points (truncating).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn midpoint(self, other: Self) -> Self {
        // The mean of two i32 always fits back into an i32.
        Self::new(
            ((self.x as i64 + other.x as i64) / 2) as i32,
            ((self.y as i64 + other.y as i64) / 2) as i32,
        )
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (f64::from(self.x) - f64::from(other.x)).hypot(f64::from(self.y) - f64::from(other.y))
    }
}

/// Saturating at the `i32` range.
impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

/// A face bounding region reported by a face detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest region enclosing all the given points, `None` when empty.
    #[must_use]
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let min_x = points.iter().map(|p| p.x).min()?;
        let min_y = points.iter().map(|p| p.y).min()?;
        let max_x = points.iter().map(|p| p.x).max()?;
        let max_y = points.iter().map(|p| p.y).max()?;
        Some(Self::new(
            min_x,
            min_y,
            max_x.abs_diff(min_x),
            max_y.abs_diff(min_y),
        ))
    }
}

/// Which eye. The left eye is the subject's left (landmarks 36-41).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeSide {
    Left = 0,
    Right = 1,
}

impl EyeSide {
    /// Both sides, in index order.
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];

    /// Numeric side index (0 left, 1 right).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn landmark_range(self) -> Range<usize> {
        match self {
            Self::Left => 36..42,
            Self::Right => 42..48,
        }
    }
}

impl TryFrom<usize> for EyeSide {
    type Error = GazeError;

    fn try_from(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Self::Left),
            1 => Ok(Self::Right),
            other => Err(GazeError::InvalidSide(other)),
        }
    }
}

impl fmt::Display for EyeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// The 68 ordered facial landmarks of one face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    /// Number of points in the iBUG scheme.
    pub const LEN: usize = 68;

    /// Creates a landmark set.
    ///
    /// # Errors
    ///
    /// Returns [`GazeError::InvalidLandmarkCount`] unless exactly 68 points are given.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() != Self::LEN {
            return Err(GazeError::InvalidLandmarkCount {
                expected: Self::LEN,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// All points in scheme order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The six contour points of one eye, starting at the outer corner.
    #[must_use]
    pub fn eye_points(&self, side: EyeSide) -> [Point; 6] {
        let range = side.landmark_range();
        let mut out = [Point::default(); 6];
        out.copy_from_slice(&self.points[range]);
        out
    }
}

impl TryFrom<Vec<Point>> for LandmarkSet {
    type Error = GazeError;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<LandmarkSet> for Vec<Point> {
    fn from(set: LandmarkSet) -> Self {
        set.points
    }
}
