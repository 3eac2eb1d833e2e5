//! Frame types.

use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

/// A grayscale video frame, immutable for the duration of one processing cycle.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Path or identifier of the frame.
    pub path: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Grayscale intensities.
    pub image: GrayImage,
}

impl Frame {
    /// Creates a frame from any decoded image, converting it to grayscale.
    #[must_use]
    pub fn new(path: impl Into<String>, image: &DynamicImage) -> Self {
        Self::from_gray(path, image.to_luma8())
    }

    /// Creates a frame from an image that is already grayscale.
    #[must_use]
    pub fn from_gray(path: impl Into<String>, image: GrayImage) -> Self {
        Self {
            path: path.into(),
            width: image.width(),
            height: image.height(),
            image,
        }
    }

    /// Returns the frame dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> FrameDimensions {
        FrameDimensions::new(self.width, self.height)
    }
}

/// Frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameDimensions {
    /// Creates new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_color_frame_is_converted_to_gray() {
        let rgb = RgbImage::from_pixel(4, 3, Rgb([255, 255, 255]));
        let frame = Frame::new("frame.png", &DynamicImage::ImageRgb8(rgb));

        assert_eq!(frame.dimensions(), FrameDimensions::new(4, 3));
        assert!(frame.image.pixels().all(|p| p.0[0] == 255));
        assert_eq!(frame.path, "frame.png");
    }
}
