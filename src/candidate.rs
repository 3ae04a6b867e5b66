//! A detected point-light source in a sky image.
//!
//! Candidates are the output of star extraction and the input to Polaris
//! selection. They are immutable once created.

use crate::PixelVec;

/// A single star candidate.
///
/// Coordinates are in image space: `x` along columns, `y` along rows with 0 at
/// the top row and y increasing downward. Brightness is the mean raw intensity
/// of the source pixel region (not the peak), in `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StarCandidate {
    /// Bounding-box center of the detected region, in pixels.
    pub position: PixelVec,
    /// Mean raw intensity over the region's bounding box, 0-255.
    pub brightness: f32,
}

impl StarCandidate {
    pub fn new(x: f32, y: f32, brightness: f32) -> Self {
        Self {
            position: PixelVec::new(x, y),
            brightness,
        }
    }

    /// Column coordinate in pixels.
    #[inline]
    pub fn x(&self) -> f32 {
        self.position.x
    }

    /// Row coordinate in pixels (0 = top row).
    #[inline]
    pub fn y(&self) -> f32 {
        self.position.y
    }

    /// Euclidean distance to another candidate, in pixels.
    pub fn distance_to(&self, other: &StarCandidate) -> f32 {
        (self.position - other.position).norm()
    }
}
